use std::collections::HashMap;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use hyper::StatusCode;
use serde::Serialize;
use serde_json::json;

use crate::{services::import::ImportError, statement_parsing::statement::ImportRejection};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),

    #[error("no auth: {0}")]
    NoAuth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("bad request (details): {0}")]
    BadRequestDetails(String, ErrorDetails),

    #[error("import failed: {0}")]
    ImportFailed(String, Vec<ImportRejection>),
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails(pub HashMap<String, String>);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::UnexpectedError(_) => tracing::error!("{:#?}", self),
            _ => tracing::debug!("{}", self),
        }

        let (status_code, body) = match self {
            ApiError::UnexpectedError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "unexpected error" }),
            ),
            ApiError::NoAuth(_) => (StatusCode::UNAUTHORIZED, json!({ "error": null })),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": null })),
            ApiError::BadRequest(err) => (StatusCode::BAD_REQUEST, json!({ "error": err })),
            ApiError::BadRequestDetails(err, details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": err, "details": details }),
            ),
            ApiError::ImportFailed(err, errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": err, "errors": errors }),
            ),
        };

        return (status_code, Json(body)).into_response();
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        return ApiError::UnexpectedError(anyhow::anyhow!(err));
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Statement(err) => ApiError::BadRequest(err.to_string()),
            ImportError::NothingImported(rejections) => {
                ApiError::ImportFailed(nothing_imported_message(rejections.is_empty()), rejections)
            }
            ImportError::Storage(err) => {
                ApiError::UnexpectedError(err.context("error saving imported transactions"))
            }
        }
    }
}

fn nothing_imported_message(no_rows: bool) -> String {
    if no_rows {
        "the file has no transactions".to_owned()
    } else {
        "no valid transactions found".to_owned()
    }
}

#[cfg(test)]
mod test {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;
    use crate::statement_parsing::statement::StatementError;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn nothing_imported_lists_every_rejection() {
        let err = ApiError::from(ImportError::NothingImported(vec![ImportRejection {
            line: 2,
            reason: "invalid date".to_owned(),
        }]));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "no valid transactions found");
        assert_eq!(body["errors"][0]["line"], 2);
        assert_eq!(body["errors"][0]["reason"], "invalid date");
    }

    #[tokio::test]
    async fn header_error_names_expected_header() {
        let err = ApiError::from(ImportError::Statement(StatementError::InvalidHeader {
            expected: "Data;Importo".to_owned(),
        }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid header, expected: Data;Importo");
    }

    #[tokio::test]
    async fn storage_error_hides_details() {
        let err = ApiError::from(ImportError::Storage(anyhow::anyhow!("pool timed out")));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "unexpected error");
    }
}
