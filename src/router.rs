use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{DefaultBodyLimit, MatchedPath},
    response::Response,
    routing::{get, patch, post},
};
use http::{HeaderValue, Method, header};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{config::Config, endpoints::*, state::AppState};

pub fn app(state: AppState) -> Result<Router> {
    let config = state.config.clone();

    let v1_transactions = Router::new()
        .route("/", get(transactions::query).post(transactions::create))
        .route("/stats", get(transactions::get_stats))
        .route("/import", post(transactions::import))
        .route(
            "/{id}",
            patch(transactions::update).delete(transactions::delete),
        );

    let v1_auth_base = Router::new()
        .route("/init", get(auth::init))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout));

    // dev login in debug mode
    #[cfg(debug_assertions)]
    let v1_auth = v1_auth_base.route("/___dev_login___", post(auth::___dev_login___));
    #[cfg(not(debug_assertions))]
    let v1_auth = v1_auth_base;

    let v1 = Router::new()
        .nest("/transactions", v1_transactions)
        .nest("/auth", v1_auth)
        .route("/@me", get(me::get_me))
        .route("/openapi.json", get(openapi));

    let routes = Router::new()
        .nest("/v1", v1)
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_import_bytes))
        .layer(cors(&config)?)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or("{unknown}");

                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        route = matched_path,
                        status = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &tracing::Span| {
                    span.record("status", response.status().as_u16());
                    tracing::debug!(?latency, "response");
                }),
        );

    return Ok(Router::new().nest("/api", routes));
}

fn cors(config: &Config) -> Result<CorsLayer> {
    let origin = config
        .front_base_url
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid FRONT_BASE_URL {:?}", config.front_base_url))?;

    let layer = CorsLayer::new()
        .allow_methods([
            Method::OPTIONS,
            Method::HEAD,
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ACCEPT_ENCODING,
            header::ACCEPT_LANGUAGE,
        ])
        .allow_origin(origin)
        .allow_credentials(true);

    return Ok(layer);
}

async fn health_check() -> &'static str {
    "OK"
}
