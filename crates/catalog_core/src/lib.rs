//! Core domain logic for the vehicle catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use db::{
    connect_db, connect_db_with_deadline, open_db, open_db_in_memory, CancelGuard, DbError,
    Deadline,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::vehicle::{
    FieldUpdate, NewVehicle, OwnerIdentity, Person, PersonId, Vehicle, VehicleFilter, VehicleId,
    VehiclePatch, VehicleValidationError,
};
pub use query::pagination::{compute_pagination, Pagination, PaginationError, DEFAULT_PAGE_SIZE};
pub use query::predicate::{Assignments, CarColumn, OwnerMatch, Predicate};
pub use repo::owner_repo::{OwnerRepository, SqliteOwnerRepository};
pub use repo::vehicle_repo::{SqliteVehicleRepository, VehicleRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::{CatalogError, CatalogPage, CatalogService, CatalogSettings};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
