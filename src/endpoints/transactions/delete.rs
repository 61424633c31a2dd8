use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use http::StatusCode;

use crate::{auth_middleware::User, error::ApiError, state::AppState};

#[utoipa::path(
    delete,
    path = "/v1/transactions/{id}",
    operation_id = "v1/transactions/delete",
    tag = "transactions",
    params(
        ("id" = String, description = "Transaction ID"),
    ),
    responses(
        (status = 204, body = ()),
        (status = 404)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.data.transactions.delete(&user.id, &id).await?;

    if !deleted {
        return Err(ApiError::NotFound(format!("transaction {id}")));
    }

    return Ok(StatusCode::NO_CONTENT);
}
