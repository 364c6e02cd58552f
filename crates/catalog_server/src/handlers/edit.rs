//! `POST /edit`: partial update of one vehicle.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use catalog_core::{FieldUpdate, OwnerIdentity, VehicleId, VehiclePatch};
use log::info;
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;
use crate::handlers::delete::require_car_id;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    #[serde(default)]
    pub car_id: VehicleId,
    #[serde(default)]
    pub reg_num: Option<String>,
    #[serde(default)]
    pub mark: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Absent keeps the year, `null` clears it.
    #[serde(default, deserialize_with = "field_update")]
    pub year: FieldUpdate<i32>,
    #[serde(default)]
    pub owner: Option<OwnerIdentity>,
}

fn field_update<'de, D, T>(deserializer: D) -> Result<FieldUpdate<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(FieldUpdate::from)
}

impl EditRequest {
    pub fn into_patch(self) -> Result<(VehicleId, VehiclePatch), ApiError> {
        let id = require_car_id(self.car_id)?;
        let patch = VehiclePatch {
            reg_num: self.reg_num,
            mark: self.mark,
            model: self.model,
            year: self.year,
            // `"owner": {}` carries nothing to write.
            owner: self.owner.filter(|owner| !owner.is_blank()),
        };
        Ok((id, patch))
    }
}

pub async fn edit_vehicle(
    State(state): State<AppState>,
    body: Result<Json<EditRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = body?;
    let (id, patch) = request.into_patch()?;

    let changed = state
        .with_catalog("handlers.edit", move |service| service.edit_vehicle(id, &patch))
        .await?;

    info!("event=vehicle_edited module=server status=ok car_id={id} changed={changed}");
    Ok(StatusCode::OK)
}
