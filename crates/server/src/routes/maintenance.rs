//! Maintenance lookup endpoints: the direct lookup and the per-vehicle
//! maintenance-due companion route. Both share one pipeline: database lookup
//! first, generative-AI fallback on a miss (a database failure counts as a
//! miss here, not a hard error).

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::vehicle::Vehicle;
use services::services::maintenance_lookup::{LookupParams, LookupResult, MaintenanceLookup};
use tracing::warn;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// POST /api/maintenance/lookup
pub async fn lookup_maintenance(
    State(state): State<AppState>,
    axum::Json(params): axum::Json<LookupParams>,
) -> Result<ResponseJson<ApiResponse<LookupResult>>, ApiError> {
    validate(&params)?;
    let result = run_lookup(&state, &params).await;
    Ok(ResponseJson(ApiResponse::success(result)))
}

/// GET /api/vehicles/{vehicle_id}/maintenance-due
pub async fn maintenance_due(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<LookupResult>>, ApiError> {
    let vehicle = Vehicle::find_by_id(&state.db().pool, vehicle_id)
        .await?
        .ok_or(ApiError::NotFound("vehicle"))?;
    let params = lookup_params_for(&vehicle);
    let result = run_lookup(&state, &params).await;
    Ok(ResponseJson(ApiResponse::success(result)))
}

async fn run_lookup(state: &AppState, params: &LookupParams) -> LookupResult {
    let db_result = match MaintenanceLookup::lookup(&state.db().pool, params).await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "database lookup failed, treating as no-match");
            LookupResult::no_match()
        }
    };
    if db_result.success {
        return db_result;
    }
    let Some(ai) = state.ai() else {
        return db_result;
    };
    match ai.lookup(params).await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "ai fallback failed");
            db_result
        }
    }
}

fn validate(params: &LookupParams) -> Result<(), ApiError> {
    if !(1900..=2100).contains(&params.year) {
        return Err(ApiError::BadRequest(format!(
            "implausible model year: {}",
            params.year
        )));
    }
    if params.make.trim().is_empty() || params.model.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "make and model are required".to_string(),
        ));
    }
    if params.mileage < 0 {
        return Err(ApiError::BadRequest("mileage cannot be negative".to_string()));
    }
    Ok(())
}

fn lookup_params_for(vehicle: &Vehicle) -> LookupParams {
    LookupParams {
        year: vehicle.year,
        make: vehicle.make.clone(),
        model: vehicle.model.clone(),
        mileage: vehicle.mileage,
        vin: vehicle.vin.clone(),
        trim: vehicle.trim.clone(),
        displacement_liters: vehicle.displacement_liters,
        cylinder_count: None,
        engine_code: vehicle.engine_code.clone(),
        fuel_type: vehicle.fuel_type.clone(),
        drive_type: vehicle.drive_type.clone(),
        transmission_type: vehicle.transmission_type.clone(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/maintenance/lookup", post(lookup_maintenance))
        .route("/vehicles/{vehicle_id}/maintenance-due", get(maintenance_due))
}
