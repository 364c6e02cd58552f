use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::CatalogError;
use thiserror::Error;

use crate::archive::ArchiveError;

/// Body sent with an out-of-range page.
pub const PAGE_OUT_OF_RANGE_MESSAGE: &str = "Error: selected page in out of range";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Page {page} is out of range (total pages: {total_page})")]
    PageOutOfRange { page: u64, total_page: u64 },

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable code used in failure log lines.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::PageOutOfRange { .. } => "page_out_of_range",
            ApiError::Archive(ArchiveError::Validation(_)) => "archive_record_incomplete",
            ApiError::Archive(_) => "archive_unavailable",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::PageOutOfRange { .. } => {
                StatusCode::BAD_REQUEST
            },
            ApiError::Archive(ArchiveError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Archive(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(_) | CatalogError::InvalidPage(_) => {
                ApiError::InvalidRequest(err.to_string())
            },
            CatalogError::PageOutOfRange { page, total_page } => {
                ApiError::PageOutOfRange { page, total_page }
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::PageOutOfRange { .. } => {
                (status, Json(PAGE_OUT_OF_RANGE_MESSAGE)).into_response()
            },
            _ => status.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::VehicleValidationError;

    #[test]
    fn catalog_errors_map_to_statuses() {
        let validation: ApiError =
            CatalogError::Validation(VehicleValidationError::MissingField("mark")).into();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let negative: ApiError = CatalogError::InvalidPage(-1).into();
        assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

        let out_of_range: ApiError = CatalogError::PageOutOfRange {
            page: 4,
            total_page: 3,
        }
        .into();
        assert_eq!(out_of_range.code(), "page_out_of_range");

        let broken: ApiError = CatalogError::InconsistentState("read-back").into();
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn archive_errors_are_server_side_unless_record_is_incomplete() {
        let incomplete = ApiError::from(ArchiveError::Validation(
            VehicleValidationError::MissingField("owner.surname"),
        ));
        assert_eq!(incomplete.status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::from(ArchiveError::NotFound("X123XX150".to_string()));
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::from(ArchiveError::UnexpectedStatus(502)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
