//! `POST /new`: add a vehicle from its archive record.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use catalog_core::Vehicle;
use log::{info, warn};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    #[serde(default)]
    pub reg_num: String,
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<Vehicle>, ApiError> {
    let Json(request) = body?;
    let reg_num = request.reg_num.trim();
    if reg_num.is_empty() {
        return Err(ApiError::InvalidRequest("regNum is required".to_string()));
    }

    let vehicle = state.archive().fetch_vehicle(reg_num).await.map_err(|err| {
        warn!("event=archive_lookup module=server status=error error={err}");
        ApiError::from(err)
    })?;

    let created = state
        .with_catalog("handlers.create", move |service| service.create_vehicle(&vehicle))
        .await?;

    info!(
        "event=vehicle_created module=server status=ok car_id={} owner_id={}",
        created.id, created.owner.id
    );
    Ok(Json(created))
}
