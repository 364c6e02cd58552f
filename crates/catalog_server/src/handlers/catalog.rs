//! `GET /catalog`: filtered, paginated listing.

use std::str::FromStr;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use catalog_core::{CatalogPage, OwnerIdentity, VehicleFilter};
use log::info;
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

/// Raw query string. Empty values mean "not filtering".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub car_id: Option<String>,
    pub reg_num: Option<String>,
    pub mark: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
    pub page: Option<String>,
}

impl CatalogQuery {
    /// Splits the query into a filter and a page number (0 when absent).
    pub fn into_filter(self) -> Result<(VehicleFilter, i64), ApiError> {
        let name = non_empty(self.name);
        let surname = non_empty(self.surname);
        let patronymic = non_empty(self.patronymic);
        let owner = if name.is_some() || surname.is_some() || patronymic.is_some() {
            Some(OwnerIdentity::new(
                name.unwrap_or_default(),
                surname.unwrap_or_default(),
                patronymic,
            ))
        } else {
            None
        };

        let filter = VehicleFilter {
            id: parse_number("carId", self.car_id)?,
            reg_num: non_empty(self.reg_num),
            mark: non_empty(self.mark),
            model: non_empty(self.model),
            year: parse_number("year", self.year)?,
            owner,
        };
        let page = parse_number("page", self.page)?.unwrap_or(0);
        Ok((filter, page))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn parse_number<T: FromStr>(field: &str, value: Option<String>) -> Result<Option<T>, ApiError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| {
                ApiError::InvalidRequest(format!("{field} must be an integer, got `{raw}`"))
            }),
    }
}

pub async fn get_catalog(
    State(state): State<AppState>,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> Result<Json<CatalogPage>, ApiError> {
    let Query(query) = query?;
    let (filter, page) = query.into_filter()?;

    let catalog_page = state
        .with_catalog("handlers.catalog", move |service| service.list_page(&filter, page))
        .await?;

    info!(
        "event=catalog_response module=server status=ok page={} total_page={} rows={}",
        catalog_page.pagination.current_page,
        catalog_page.pagination.total_page,
        catalog_page.vehicles.len()
    );
    Ok(Json(catalog_page))
}
