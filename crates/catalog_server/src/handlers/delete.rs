//! `POST /delete`: remove one vehicle by id.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use catalog_core::VehicleId;
use log::info;
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    #[serde(default)]
    pub car_id: VehicleId,
}

pub async fn delete_vehicle(
    State(state): State<AppState>,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = body?;
    let id = require_car_id(request.car_id)?;

    let changed = state
        .with_catalog("handlers.delete", move |service| service.delete_vehicle(id))
        .await?;

    info!("event=vehicle_deleted module=server status=ok car_id={id} changed={changed}");
    Ok(StatusCode::OK)
}

/// Store ids start at 1; zero is what an absent `carId` decodes to.
pub(crate) fn require_car_id(id: VehicleId) -> Result<VehicleId, ApiError> {
    if id <= 0 {
        return Err(ApiError::InvalidRequest("carId is required".to_string()));
    }
    Ok(id)
}
