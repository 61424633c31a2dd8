use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    auth_middleware::User,
    data::User as StoredUser,
    error::ApiError,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/@me",
    tag = "auth",
    responses(
        (status = 200, body = StoredUser),
        (status = 401)
    )
)]
pub async fn get_me(
    State(state): State<AppState>,
    user: User,
) -> Result<impl IntoResponse, ApiError> {
    let me = state
        .data
        .users
        .get_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NoAuth("user no longer exists".to_owned()))?;

    return Ok(Json(me));
}
