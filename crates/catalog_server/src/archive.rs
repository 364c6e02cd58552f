//! Client for the external vehicle archive.
//!
//! The archive is looked up by registration number when a vehicle is added;
//! its answer becomes the new catalog row.

use std::time::Duration;

use catalog_core::{NewVehicle, OwnerIdentity, VehicleValidationError};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive request failed: {0}")]
    RequestFailed(String),

    #[error("archive has no record for {0}")]
    NotFound(String),

    #[error("archive returned unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("archive response could not be decoded: {0}")]
    InvalidResponse(String),

    #[error("archive record is incomplete: {0}")]
    Validation(#[from] VehicleValidationError),
}

/// Vehicle record as the archive reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    #[serde(default)]
    pub reg_num: String,
    #[serde(default)]
    pub mark: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub owner: OwnerIdentity,
}

impl TryFrom<ArchiveRecord> for NewVehicle {
    type Error = ArchiveError;

    fn try_from(record: ArchiveRecord) -> Result<Self, Self::Error> {
        let vehicle = NewVehicle {
            reg_num: record.reg_num,
            mark: record.mark,
            model: record.model,
            year: record.year,
            owner: record.owner,
        };
        vehicle.validate()?;
        Ok(vehicle)
    }
}

pub struct ArchiveClient {
    http_client: HttpClient,
    base_url: String,
}

impl ArchiveClient {
    /// Creates a client for the archive at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, ArchiveError> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ArchiveError::RequestFailed(e.to_string()))?;

        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the record for `reg_num` and checks its required fields.
    ///
    /// # Errors
    ///
    /// - `Validation` when the record lacks a required field.
    /// - Any other variant when the archive cannot give a usable answer.
    pub async fn fetch_vehicle(&self, reg_num: &str) -> Result<NewVehicle, ArchiveError> {
        let url = format!("{}/car_information", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("regNum", reg_num)])
            .send()
            .await
            .map_err(|e| ArchiveError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let record = response
                    .json::<ArchiveRecord>()
                    .await
                    .map_err(|e| ArchiveError::InvalidResponse(e.to_string()))?;
                NewVehicle::try_from(record)
            },
            StatusCode::NOT_FOUND => Err(ArchiveError::NotFound(reg_num.to_string())),
            status => Err(ArchiveError::UnexpectedStatus(status.as_u16())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_without_year_or_patronymic_is_complete() {
        let record: ArchiveRecord = serde_json::from_str(
            r#"{"regNum":"X123XX150","mark":"Lada","model":"Vesta","owner":{"name":"Ivan","surname":"Petrov"}}"#,
        )
        .unwrap();

        let vehicle = NewVehicle::try_from(record).unwrap();
        assert_eq!(vehicle.year, None);
        assert_eq!(vehicle.owner.patronymic, None);
    }

    #[test]
    fn record_without_owner_surname_is_rejected() {
        let record: ArchiveRecord = serde_json::from_str(
            r#"{"regNum":"X123XX150","mark":"Lada","model":"Vesta","year":2002,"owner":{"name":"Ivan"}}"#,
        )
        .unwrap();

        let err = NewVehicle::try_from(record).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::Validation(VehicleValidationError::MissingField("owner.surname"))
        ));
    }

    #[test]
    fn base_url_is_normalized() {
        let client = ArchiveClient::new(" http://archive:8080/ ", 1_000).unwrap();
        assert_eq!(client.base_url(), "http://archive:8080");
    }
}
