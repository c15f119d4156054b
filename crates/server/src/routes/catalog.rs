//! Read-only catalog endpoints backing the booking UI's vehicle pickers.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::vehicle_application::VehicleApplication;
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ApplicationQuery {
    pub make: String,
    pub model: String,
    pub year: Option<i64>,
}

/// GET /api/catalog/applications?make=..&model=..[&year=..]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ApplicationQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<VehicleApplication>>>, ApiError> {
    let applications =
        VehicleApplication::find_for_model(&state.db().pool, &query.make, &query.model, query.year)
            .await?;
    Ok(ResponseJson(ApiResponse::success(applications)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/catalog/applications", get(list_applications))
}
