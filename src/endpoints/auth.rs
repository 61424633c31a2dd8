use anyhow::Context;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::{TypedHeader, headers};
use cookie::{
    CookieBuilder,
    time::{Duration, OffsetDateTime},
};
use hyper::{HeaderMap, header};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth_middleware::{AUTH_COOKIE, User},
    data::Data,
    error::ApiError,
    services,
    state::AppState,
};

const AUTH_STATE: &str = "auth_state";

#[utoipa::path(
    get,
    path = "/v1/auth/init",
    tag = "auth",
    responses(
        (status = 307)
    )
)]
pub async fn init(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (url, state_str) = services::auth::init(&state.config)?;

    let state_cookie = build_cookie(
        AUTH_STATE,
        &state_str,
        state.config.use_secure_cookies,
        OffsetDateTime::now_utc().saturating_add(Duration::minutes(5)),
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        state_cookie.parse().context("error parsing cookie")?,
    );

    return Ok((headers, Redirect::temporary(&url)));
}

#[derive(IntoParams, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: String,
    pub state: String,
}

#[utoipa::path(
    get,
    path = "/v1/auth/callback",
    tag = "auth",
    params(
        AuthCallbackQuery
    ),
    responses(
        (status = 307)
    )
)]
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<AuthCallbackQuery>,
    TypedHeader(cookies): TypedHeader<headers::Cookie>,
    State(data): State<Data>,
) -> Result<impl IntoResponse, ApiError> {
    let stored_state = cookies
        .get(AUTH_STATE)
        .ok_or(ApiError::BadRequest("no state".to_owned()))?;

    let auth_token = services::auth::callback(
        &state.config,
        &data,
        &query.code,
        &query.state,
        stored_state,
    )
    .await?;

    let headers = login_headers(state.config.use_secure_cookies, &auth_token)?;

    return Ok((headers, Redirect::temporary(&state.config.front_base_url)));
}

#[utoipa::path(
    get,
    path = "/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 307)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    user: Option<User>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(user) = user {
        services::auth::logout(&state.data, &user.id, &user.session_id).await?;
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        expired_cookie(AUTH_COOKIE, state.config.use_secure_cookies)
            .parse()
            .context("error parsing auth cookie")?,
    );

    return Ok((headers, Redirect::temporary(&state.config.front_base_url)));
}

#[cfg(debug_assertions)]
#[utoipa::path(
    post,
    path = "/v1/auth/___dev_login___",
    tag = "auth",
    responses(
        (status = 307)
    )
)]
pub async fn ___dev_login___(
    State(state): State<AppState>,
    State(data): State<Data>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_token = services::auth::___dev_login___(&state.config, &data).await?;

    let headers = login_headers(state.config.use_secure_cookies, &auth_token)?;

    return Ok((headers, Redirect::temporary(&state.config.front_base_url)));
}

fn login_headers(is_secure: bool, auth_token: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        expired_cookie(AUTH_STATE, is_secure)
            .parse()
            .context("error parsing state cookie")?,
    );
    headers.append(
        header::SET_COOKIE,
        create_auth_cookie(is_secure, auth_token)
            .parse()
            .context("error parsing auth cookie")?,
    );

    return Ok(headers);
}

fn create_auth_cookie(is_secure: bool, auth_token: &str) -> String {
    build_cookie(
        AUTH_COOKIE,
        auth_token,
        is_secure,
        OffsetDateTime::now_utc().saturating_add(Duration::days(7)),
    )
}

fn expired_cookie(name: &'static str, is_secure: bool) -> String {
    build_cookie(name, "", is_secure, OffsetDateTime::UNIX_EPOCH)
}

fn build_cookie(name: &'static str, value: &str, is_secure: bool, expires: OffsetDateTime) -> String {
    CookieBuilder::new(name, value.to_owned())
        .secure(is_secure)
        .same_site(cookie::SameSite::Lax)
        .http_only(true)
        .path("/")
        .expires(cookie::Expiration::from(expires))
        .build()
        .to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn login_sets_both_cookies() {
        let headers = login_headers(true, "user.session:sig").expect("headers");

        let cookies = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().expect("ascii").to_owned())
            .collect::<Vec<_>>();

        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("auth_state=;"));
        assert!(cookies[0].contains("1970"));
        assert!(cookies[1].starts_with("auth=user.session:sig;"));
        assert!(cookies[1].contains("HttpOnly"));
        assert!(cookies[1].contains("Secure"));
    }
}
