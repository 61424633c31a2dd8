use axum::{
    Json,
    extract::{self, State},
    response::IntoResponse,
};
use http::StatusCode;
use serde::Deserialize;
use serde_with::{NoneAsEmptyString, serde_as};
use utoipa::ToSchema;

use crate::{
    auth_middleware::User, data::Tx, error::ApiError, services, state::AppState,
};

#[serde_as]
#[derive(Deserialize, ToSchema)]
pub struct TransactionInput {
    pub amount: f64,
    pub date: String,
    /// `income` or `expense`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub category: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub shop: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/v1/transactions",
    operation_id = "v1/transactions/create",
    tag = "transactions",
    request_body(
        content = TransactionInput,
        content_type = "application/json",
    ),
    responses(
        (status = 201, body = Tx)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    user: User,
    extract::Json(payload): extract::Json<TransactionInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = services::transactions::validate(&payload)?;

    let tx = state.data.transactions.insert(&user.id, &draft).await?;

    return Ok((StatusCode::CREATED, Json(tx)));
}
