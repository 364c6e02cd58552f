//! # Catalog Server Binary
//!
//! Main entrypoint for the vehicle catalog service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use catalog_core::{init_logging, open_db};
use catalog_server::archive::ArchiveClient;
use catalog_server::config::load;
use catalog_server::AppState;
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "catalog_server")]
#[command(about = "Vehicle catalog HTTP service", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "CATALOG_CONFIG", default_value = "catalog.toml")]
    config: String,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config))?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    init_logging(&config.logging.level, config.logging.dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    // Migrations run once here; request connections only verify the version.
    let db_path = PathBuf::from(&config.storage.path);
    drop(open_db(&db_path).with_context(|| format!("failed to open {}", db_path.display()))?);
    info!(
        "event=db_ready module=server status=ok path={}",
        db_path.display()
    );

    let archive = ArchiveClient::new(&config.archive.base_url, config.archive.timeout_ms)
        .context("failed to build archive client")?;
    let state = AppState::new(
        db_path,
        archive,
        config.catalog_settings(),
        config.request_timeout(),
    );

    catalog_server::serve(&config.server, state).await
}
