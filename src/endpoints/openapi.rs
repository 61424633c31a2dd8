use crate::endpoints;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(
    endpoints::auth::init,
    endpoints::auth::callback,
    endpoints::auth::logout,
    endpoints::me::get_me,
    endpoints::transactions::query::query,
    endpoints::transactions::create::create,
    endpoints::transactions::update::update,
    endpoints::transactions::delete::delete,
    endpoints::transactions::get_stats::get_stats,
    endpoints::transactions::import::import,
))]
struct ApiDoc;

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
