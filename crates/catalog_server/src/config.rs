//! Server configuration.
//!
//! Layers, lowest precedence first: serde defaults, optional config file,
//! `CATALOG__*` environment variables. CLI overrides are applied by `main`.

use std::path::Path;
use std::time::Duration;

use catalog_core::CatalogSettings;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "CATALOG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Budget for the store work of one request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_archive_base_url")]
    pub base_url: String,
    #[serde(default = "default_archive_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_archive_base_url(),
            timeout_ms: default_archive_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Absolute directory for rotated log files; stderr when unset.
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_storage_path() -> String {
    "catalog.db".to_string()
}

fn default_page_size() -> u32 {
    catalog_core::DEFAULT_PAGE_SIZE
}

fn default_archive_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_archive_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Checks settings that would make every request fail.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.page_size == 0 {
            anyhow::bail!("catalog.page_size must be greater than 0");
        }
        if self.storage.path.trim().is_empty() {
            anyhow::bail!("storage.path cannot be empty");
        }
        if self.server.request_timeout_ms == 0 {
            anyhow::bail!("server.request_timeout_ms must be greater than 0");
        }

        let base_url = self.archive.base_url.trim();
        if base_url.is_empty() {
            anyhow::bail!("archive.base_url cannot be empty");
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            anyhow::bail!(
                "archive.base_url must start with http:// or https://, got: {}",
                self.archive.base_url
            );
        }
        if self.archive.timeout_ms == 0 {
            anyhow::bail!("archive.timeout_ms must be greater than 0");
        }

        Ok(())
    }

    pub fn catalog_settings(&self) -> CatalogSettings {
        CatalogSettings {
            page_size: self.catalog.page_size,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }
}

/// Loads configuration from `path` (optional) and the environment.
pub fn load<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let builder = ConfigBuilder::builder().add_source(File::from(path.as_ref()).required(false));
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
