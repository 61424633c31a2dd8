use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth_middleware::User, error::ApiError, services, state::AppState, utils::empty_as_none,
};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Input {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, ToSchema, Serialize)]
pub struct Output {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub income_categories: Vec<CategoryTotal>,
    pub expense_categories: Vec<CategoryTotal>,
}

#[derive(Debug, ToSchema, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub value: f64,
}

#[utoipa::path(
    get,
    path = "/v1/transactions/stats",
    operation_id = "v1/transactions/stats",
    tag = "transactions",
    params(
        Input
    ),
    responses(
        (status = 200, body = Output)
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
    user: User,
    Query(input): Query<Input>,
) -> Result<impl IntoResponse, ApiError> {
    let result =
        services::transactions::stats(&state.data, &user.id, input.start_date, input.end_date)
            .await?;

    return Ok(Json(result));
}
