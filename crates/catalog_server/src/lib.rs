//! HTTP surface of the vehicle catalog.
//!
//! Every request that touches the store runs on its own blocking worker
//! with its own connection, under a deadline that also trips when the
//! request future is dropped.

pub mod archive;
pub mod config;
pub mod error;
pub mod handlers;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::{get, post};
use axum::Router;
use catalog_core::{
    connect_db_with_deadline, CatalogError, CatalogService, CatalogSettings, Deadline,
    SqliteVehicleRepository,
};
use log::{info, warn};

use crate::archive::ArchiveClient;
use crate::config::ServerConfig;
use crate::error::ApiError;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    archive: Arc<ArchiveClient>,
    settings: CatalogSettings,
    request_timeout: Duration,
}

impl AppState {
    /// `db_path` must point at an already migrated database.
    pub fn new(
        db_path: impl Into<PathBuf>,
        archive: ArchiveClient,
        settings: CatalogSettings,
        request_timeout: Duration,
    ) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
            archive: Arc::new(archive),
            settings,
            request_timeout,
        }
    }

    pub fn archive(&self) -> &ArchiveClient {
        &self.archive
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Runs `work` against a fresh catalog service on a blocking worker.
    pub async fn with_catalog<T, F>(&self, op: &'static str, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&CatalogService<SqliteVehicleRepository<'_>>) -> Result<T, CatalogError>
            + Send
            + 'static,
    {
        let started = Instant::now();
        let deadline = Deadline::after(self.request_timeout);
        let cancel_guard = deadline.cancel_on_drop();
        let db_path = Arc::clone(&self.db_path);
        let settings = self.settings;

        let joined = tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let conn = connect_db_with_deadline(db_path.as_path(), &deadline)
                .map_err(|err| ApiError::Internal(format!("{op}: {err}")))?;
            let service = CatalogService::open(&conn, settings)
                .map_err(|err| log_catalog_error(op, err))?;
            work(&service).map_err(|err| log_catalog_error(op, err))
        })
        .await;
        cancel_guard.disarm();

        let result =
            joined.map_err(|err| ApiError::Internal(format!("{op}: worker failed: {err}")))?;
        let duration_ms = started.elapsed().as_millis();
        match &result {
            Ok(_) => info!(
                "event=store_call module=server status=ok op={op} duration_ms={duration_ms}"
            ),
            Err(err) => warn!(
                "event=store_call module=server status=error op={op} duration_ms={duration_ms} error_code={}",
                err.code()
            ),
        }
        result
    }
}

fn log_catalog_error(op: &'static str, err: CatalogError) -> ApiError {
    if err.is_interrupted() {
        warn!("event=store_interrupted module=server status=error op={op} error_code=deadline");
    }
    ApiError::from(err)
}

/// Builds the catalog router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/catalog", get(handlers::catalog::get_catalog))
        .route("/new", post(handlers::create::create_vehicle))
        .route("/delete", post(handlers::delete::delete_vehicle))
        .route("/edit", post(handlers::edit::edit_vehicle))
        .with_state(state)
}

/// Serves the catalog until SIGINT or SIGTERM.
pub async fn serve(server: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("event=server_start module=server status=ok addr={addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("event=signal_install module=server status=error signal=sigint error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(err) => {
                warn!("event=signal_install module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("event=shutdown module=server status=ok signal=sigint");
        }
        _ = terminate => {
            info!("event=shutdown module=server status=ok signal=sigterm");
        }
    }
}
