//! Customer vehicle records.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, patch, post},
};
use db::models::vehicle::{CreateVehicle, Vehicle};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct UpdateMileage {
    pub mileage: i64,
}

/// POST /api/vehicles
pub async fn create_vehicle(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateVehicle>,
) -> Result<ResponseJson<ApiResponse<Vehicle>>, ApiError> {
    if !(1900..=2100).contains(&payload.year) {
        return Err(ApiError::BadRequest(format!(
            "implausible model year: {}",
            payload.year
        )));
    }
    if payload.make.trim().is_empty() || payload.model.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "make and model are required".to_string(),
        ));
    }
    let vehicle = Vehicle::create(&state.db().pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(vehicle)))
}

/// GET /api/vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Vehicle>>>, ApiError> {
    let vehicles = Vehicle::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(vehicles)))
}

/// GET /api/vehicles/{vehicle_id}
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vehicle>>, ApiError> {
    let vehicle = Vehicle::find_by_id(&state.db().pool, vehicle_id)
        .await?
        .ok_or(ApiError::NotFound("vehicle"))?;
    Ok(ResponseJson(ApiResponse::success(vehicle)))
}

/// PATCH /api/vehicles/{vehicle_id}/mileage
pub async fn update_mileage(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateMileage>,
) -> Result<ResponseJson<ApiResponse<Vehicle>>, ApiError> {
    if payload.mileage < 0 {
        return Err(ApiError::BadRequest("mileage cannot be negative".to_string()));
    }
    let vehicle = Vehicle::update_mileage(&state.db().pool, vehicle_id, payload.mileage)
        .await?
        .ok_or(ApiError::NotFound("vehicle"))?;
    Ok(ResponseJson(ApiResponse::success(vehicle)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", post(create_vehicle).get(list_vehicles))
        .route("/vehicles/{vehicle_id}", get(get_vehicle))
        .route("/vehicles/{vehicle_id}/mileage", patch(update_mileage))
}
