//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations (startup) or verify them (per request).
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - `open_db*` return connections with migrations fully applied.
//! - `connect_db` never writes schema; it fails on any version mismatch.

use super::migrations::{apply_migrations, current_user_version, latest_version};
use super::deadline::Deadline;
use super::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Upper bound on lock waits; a request deadline may shorten it.
pub(crate) const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// Used once at process startup.
///
/// # Side effects
/// - Creates the file when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_and_migrate("file", || Connection::open(path.as_ref()))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_and_migrate("memory", Connection::open_in_memory)
}

/// Opens a request-scoped connection to an already migrated database file.
///
/// # Errors
/// - `DbError::SchemaNotReady` when the file has an older schema version.
/// - `DbError::UnsupportedSchemaVersion` when the file is newer than this binary.
pub fn connect_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    connect_db_with_deadline(path, &Deadline::unbounded())
}

/// Like [`connect_db`], with `deadline` installed before the schema check,
/// so waiting on a locked file is bounded by the request budget too.
pub fn connect_db_with_deadline(
    path: impl AsRef<Path>,
    deadline: &Deadline,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mut conn = Connection::open(path.as_ref())?;
    configure_connection(&conn)?;
    deadline.install(&mut conn)?;

    let db_version = current_user_version(&conn)?;
    let expected_version = latest_version();
    if db_version > expected_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: expected_version,
        });
    }
    if db_version < expected_version {
        return Err(DbError::SchemaNotReady {
            db_version,
            expected_version,
        });
    }

    debug!(
        "event=db_connect module=db status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn open_and_migrate(
    mode: &'static str,
    opener: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match opener() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={} schema_version={}",
                started_at.elapsed().as_millis(),
                latest_version()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    configure_connection(conn)?;
    apply_migrations(conn)?;
    Ok(())
}

fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}
