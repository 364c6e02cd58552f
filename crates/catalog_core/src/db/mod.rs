//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the catalog.
//! - Apply schema migrations in deterministic order.
//! - Bound every store call by a per-request deadline.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Request connections never migrate; they refuse a schema that is not
//!   exactly the latest version.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod deadline;
pub mod migrations;
mod open;

pub use deadline::{CancelGuard, Deadline};
pub use open::{connect_db, connect_db_with_deadline, open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Database exists but migrations have not been applied yet.
    SchemaNotReady {
        db_version: u32,
        expected_version: u32,
    },
}

impl DbError {
    /// Returns whether the failure comes from an interrupted statement
    /// (deadline passed or request cancelled).
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::OperationInterrupted
        )
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaNotReady {
                db_version,
                expected_version,
            } => write!(
                f,
                "database schema version {db_version} is not migrated (expected {expected_version})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
