use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth_middleware::User,
    data::{Tx, TxFilters, TxKind},
    error::ApiError,
    state::AppState,
    utils::empty_as_none,
};

#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct Input {
    /// `income` or `expense`
    #[serde(rename = "type", default, deserialize_with = "empty_as_none")]
    pub kind: Option<String>,
    /// Case-insensitive substring match
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    /// Inclusive, YYYY-MM-DD
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_date: Option<String>,
    /// Inclusive, YYYY-MM-DD
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<String>,
}

impl TryFrom<Input> for TxFilters {
    type Error = ApiError;

    fn try_from(input: Input) -> Result<Self, Self::Error> {
        let kind = input
            .kind
            .map(|kind| kind.parse::<TxKind>())
            .transpose()
            .map_err(|_| ApiError::BadRequest("type must be income or expense".to_owned()))?;

        Ok(TxFilters {
            kind,
            category: input.category,
            start_date: input.start_date,
            end_date: input.end_date,
        })
    }
}

#[utoipa::path(
    get,
    path = "/v1/transactions",
    operation_id = "v1/transactions/query",
    tag = "transactions",
    params(
        Input
    ),
    responses(
        (status = 200, body = Vec<Tx>),
    )
)]
pub async fn query(
    State(state): State<AppState>,
    user: User,
    Query(input): Query<Input>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(user_id = %user.id, ?input, "querying transactions");

    let filters = TxFilters::try_from(input)?;

    let res = state.data.transactions.query(&user.id, &filters).await?;

    Ok(Json(res))
}
