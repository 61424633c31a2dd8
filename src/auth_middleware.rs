use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum_extra::headers::{self, HeaderMapExt};
use http::{HeaderMap, request::Parts};

use crate::{error::ApiError, services::auth::verify_token, state::AppState};

pub const AUTH_COOKIE: &str = "auth";

/// Logged in user, resolved from the signed `auth` cookie and a live session.
#[derive(Debug)]
pub struct User {
    pub id: String,
    pub session_id: String,
}

impl User {
    async fn from_headers(state: &AppState, headers: &HeaderMap) -> Result<Self, ApiError> {
        let cookies = headers
            .typed_get::<headers::Cookie>()
            .ok_or_else(|| ApiError::NoAuth("no cookies".to_owned()))?;

        let raw_token = cookies
            .get(AUTH_COOKIE)
            .ok_or_else(|| ApiError::NoAuth("no auth cookie".to_owned()))?;

        // signature is checked before the database is touched
        let token = verify_token(&state.config.secret, raw_token)
            .map_err(|err| ApiError::NoAuth(format!("invalid token: {err}")))?;

        let session = state
            .data
            .sessions
            .get_one(&token.user_id, &token.session_id)
            .await?
            .ok_or_else(|| ApiError::NoAuth("no session".to_owned()))?;

        return Ok(User {
            id: session.user_id,
            session_id: session.id,
        });
    }
}

impl<S> FromRequestParts<S> for User
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        return User::from_headers(&state, &parts.headers).await;
    }
}

impl<S> OptionalFromRequestParts<S> for User
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let state = AppState::from_ref(state);

        return Ok(User::from_headers(&state, &parts.headers).await.ok());
    }
}
