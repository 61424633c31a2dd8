use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, data::Data};

/// Shared by every handler. `Data` and `Arc<Config>` can also be extracted
/// on their own through `FromRef`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub data: Data,
    pub config: Arc<Config>,
}
