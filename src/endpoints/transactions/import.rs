use axum::{
    Json,
    extract::{self, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    auth_middleware::User,
    error::ApiError,
    services::import::{ImportSummary, import_statement},
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct ImportInput {
    /// Whole file, `;` separated, first line is
    /// `Data;Importo;Categoria;Negozio;Descrizione`
    #[serde(alias = "csvContent")]
    pub csv_content: String,
}

#[utoipa::path(
    post,
    path = "/v1/transactions/import",
    operation_id = "v1/transactions/import",
    tag = "transactions",
    request_body(
        content = ImportInput,
        content_type = "application/json",
    ),
    responses(
        (status = 200, body = ImportSummary),
        (status = 400, description = "bad header, or no row could be imported")
    )
)]
pub async fn import(
    State(state): State<AppState>,
    user: User,
    extract::Json(input): extract::Json<ImportInput>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = import_statement(&state.data.transactions, &user.id, &input.csv_content).await?;

    return Ok(Json(summary));
}
