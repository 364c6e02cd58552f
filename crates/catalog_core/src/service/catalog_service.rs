//! Catalog use-case service.
//!
//! # Responsibility
//! - Orchestrate the filtered, paginated catalog listing.
//! - Wrap create/edit/delete with validation and read-back.
//! - Tag every persistence failure with the operation that hit it.
//!
//! # Invariants
//! - Pagination is computed from the filtered count before any page fetch;
//!   an out-of-range page never reaches the page query.
//! - Validation failures are reported before any store access.

use crate::model::vehicle::{
    NewVehicle, Vehicle, VehicleFilter, VehicleId, VehiclePatch, VehicleValidationError,
};
use crate::query::pagination::{compute_pagination, Pagination, PaginationError, DEFAULT_PAGE_SIZE};
use crate::repo::vehicle_repo::{SqliteVehicleRepository, VehicleRepository};
use crate::repo::RepoError;
use log::debug;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Tunables passed to the catalog service by its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Rows per catalog page.
    pub page_size: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    /// Newest first.
    #[serde(rename = "Cars")]
    pub vehicles: Vec<Vehicle>,
    #[serde(rename = "Pagination")]
    pub pagination: Pagination,
}

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogError {
    /// Required field missing or blank.
    Validation(VehicleValidationError),
    /// Page number is negative.
    InvalidPage(i64),
    /// Page number is past the last page of the filtered result.
    PageOutOfRange { page: u64, total_page: u64 },
    /// Settings cannot serve any request.
    InvalidSettings(&'static str),
    /// Persistence-layer failure, tagged with the failing operation.
    Repo {
        op: &'static str,
        source: RepoError,
    },
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl CatalogError {
    /// Maps a repository error raised while running `op`.
    pub fn repo(op: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| match source {
            RepoError::Validation(err) => Self::Validation(err),
            source => Self::Repo { op, source },
        }
    }

    /// Returns whether the failure is a deadline/cancellation interrupt.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Repo { source, .. } if source.is_interrupted())
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidPage(page) => write!(f, "page number {page} is negative"),
            Self::PageOutOfRange { page, total_page } => {
                write!(f, "page {page} is out of range (total pages: {total_page})")
            }
            Self::InvalidSettings(details) => write!(f, "invalid catalog settings: {details}"),
            Self::Repo { op, source } => write!(f, "{op}: {source}"),
            Self::InconsistentState(details) => write!(f, "inconsistent catalog state: {details}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<VehicleValidationError> for CatalogError {
    fn from(value: VehicleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PaginationError> for CatalogError {
    fn from(value: PaginationError) -> Self {
        match value {
            PaginationError::ZeroLimit => Self::InvalidSettings("page size must be positive"),
            PaginationError::NegativePage(page) => Self::InvalidPage(page),
            PaginationError::OutOfRange { page, total_page } => {
                Self::PageOutOfRange { page, total_page }
            }
        }
    }
}

/// Catalog service facade over a vehicle repository.
pub struct CatalogService<R: VehicleRepository> {
    repo: R,
    settings: CatalogSettings,
}

impl<'conn> CatalogService<SqliteVehicleRepository<'conn>> {
    /// Creates a service over a migrated SQLite connection.
    pub fn open(conn: &'conn Connection, settings: CatalogSettings) -> Result<Self, CatalogError> {
        let repo =
            SqliteVehicleRepository::try_new(conn).map_err(CatalogError::repo("catalog.open"))?;
        Ok(Self::new(repo, settings))
    }
}

impl<R: VehicleRepository> CatalogService<R> {
    pub fn new(repo: R, settings: CatalogSettings) -> Self {
        Self { repo, settings }
    }

    pub fn settings(&self) -> CatalogSettings {
        self.settings
    }

    /// Returns one page of vehicles matching `filter`.
    ///
    /// `page == 0` means the first page.
    ///
    /// # Errors
    /// - `InvalidPage` for a negative page.
    /// - `PageOutOfRange` when the page is past the end, including every page
    ///   of an empty result.
    pub fn list_page(
        &self,
        filter: &VehicleFilter,
        page: i64,
    ) -> Result<CatalogPage, CatalogError> {
        const OP: &str = "catalog.list_page";

        if page < 0 {
            return Err(CatalogError::InvalidPage(page));
        }

        let predicate = self
            .repo
            .filter_predicate(filter)
            .map_err(CatalogError::repo(OP))?;
        let records_count = match &predicate {
            Some(predicate) => self
                .repo
                .count_vehicles(predicate)
                .map_err(CatalogError::repo(OP))?,
            None => 0,
        };

        let pagination = compute_pagination(records_count, self.settings.page_size, page)?;
        let vehicles = match &predicate {
            Some(predicate) => self
                .repo
                .list_vehicles(predicate, pagination.record_per_page, pagination.offset())
                .map_err(CatalogError::repo(OP))?,
            None => Vec::new(),
        };

        debug!(
            "event=catalog_list module=service status=ok filtered={} records={} page={} total_page={} rows={}",
            !filter.is_empty(),
            records_count,
            pagination.current_page,
            pagination.total_page,
            vehicles.len()
        );

        Ok(CatalogPage {
            vehicles,
            pagination,
        })
    }

    /// Creates one vehicle and returns it as persisted.
    pub fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, CatalogError> {
        const OP: &str = "catalog.create_vehicle";

        vehicle.validate()?;
        let id = self
            .repo
            .create_vehicle(vehicle)
            .map_err(CatalogError::repo(OP))?;
        debug!("event=catalog_create module=service status=ok car_id={id}");

        self.repo
            .get_vehicle(id)
            .map_err(CatalogError::repo(OP))?
            .ok_or(CatalogError::InconsistentState(
                "created vehicle not found in read-back",
            ))
    }

    /// Applies a partial edit; returns affected rows (0 for a missing id).
    pub fn edit_vehicle(&self, id: VehicleId, patch: &VehiclePatch) -> Result<usize, CatalogError> {
        patch.validate()?;
        let changed = self
            .repo
            .edit_vehicle(id, patch)
            .map_err(CatalogError::repo("catalog.edit_vehicle"))?;
        debug!("event=catalog_edit module=service status=ok car_id={id} changed={changed}");
        Ok(changed)
    }

    /// Deletes one vehicle; returns affected rows (0 for a missing id).
    pub fn delete_vehicle(&self, id: VehicleId) -> Result<usize, CatalogError> {
        let changed = self
            .repo
            .delete_vehicle(id)
            .map_err(CatalogError::repo("catalog.delete_vehicle"))?;
        debug!("event=catalog_delete module=service status=ok car_id={id} changed={changed}");
        Ok(changed)
    }

    /// Gets one vehicle by id.
    pub fn get_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, CatalogError> {
        self.repo
            .get_vehicle(id)
            .map_err(CatalogError::repo("catalog.get_vehicle"))
    }
}
