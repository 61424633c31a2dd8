use axum::{
    Json,
    extract::{self, Path, State},
    response::IntoResponse,
};

use super::create::TransactionInput;
use crate::{
    auth_middleware::User, data::Tx, error::ApiError, services, state::AppState,
};

#[utoipa::path(
    patch,
    path = "/v1/transactions/{id}",
    operation_id = "v1/transactions/update",
    tag = "transactions",
    params(
        ("id" = String, description = "Transaction ID"),
    ),
    request_body(
        content = TransactionInput,
        content_type = "application/json",
    ),
    responses(
        (status = 200, body = Tx),
        (status = 404)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<String>,
    extract::Json(payload): extract::Json<TransactionInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = services::transactions::validate(&payload)?;

    let tx = state
        .data
        .transactions
        .update(&user.id, &id, &draft)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("transaction {id}")))?;

    return Ok(Json(tx));
}
