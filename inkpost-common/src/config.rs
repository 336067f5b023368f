//! Configuration loading and resolution
//!
//! Each value resolves through the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_DATABASE: &str = "INKPOST_DATABASE";
pub const ENV_BIND: &str = "INKPOST_BIND";
pub const ENV_OWNER_OPEN_ID: &str = "INKPOST_OWNER_OPEN_ID";
pub const ENV_STORAGE_ENDPOINT: &str = "INKPOST_STORAGE_ENDPOINT";
pub const ENV_STORAGE_PUBLIC_URL: &str = "INKPOST_STORAGE_PUBLIC_URL";

const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Object storage collaborator location
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Base URL uploads are PUT to
    pub endpoint: String,
    /// Base URL returned to clients; defaults to `endpoint`
    pub public_base_url: Option<String>,
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub bind_addr: String,
    /// Identity token of the platform owner. A user signing in with this
    /// token is granted the admin role on upsert.
    pub owner_open_id: Option<String>,
    pub storage: Option<StorageConfig>,
}

/// Values taken from the command line; every field optional
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
}

/// Raw shape of the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
struct TomlConfig {
    database_path: Option<PathBuf>,
    bind_addr: Option<String>,
    owner_open_id: Option<String>,
    storage: Option<StorageConfig>,
}

/// Resolve the full server configuration
pub fn load_config(overrides: &ConfigOverrides) -> Result<ServerConfig> {
    let toml_config = match config_file_path(overrides) {
        Some(path) => read_toml_config(&path)?,
        None => TomlConfig::default(),
    };

    let database_path = overrides
        .database_path
        .clone()
        .or_else(|| std::env::var(ENV_DATABASE).ok().map(PathBuf::from))
        .or(toml_config.database_path)
        .unwrap_or_else(default_database_path);

    let bind_addr = overrides
        .bind_addr
        .clone()
        .or_else(|| std::env::var(ENV_BIND).ok())
        .or(toml_config.bind_addr)
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    let owner_open_id = std::env::var(ENV_OWNER_OPEN_ID)
        .ok()
        .or(toml_config.owner_open_id)
        .filter(|token| !token.trim().is_empty());

    let storage = match std::env::var(ENV_STORAGE_ENDPOINT).ok() {
        Some(endpoint) => Some(StorageConfig {
            endpoint,
            public_base_url: std::env::var(ENV_STORAGE_PUBLIC_URL).ok(),
        }),
        None => toml_config.storage,
    };

    Ok(ServerConfig {
        database_path,
        bind_addr,
        owner_open_id,
        storage,
    })
}

/// Locate the config file: explicit path first, then the platform config dir.
/// Returns None when no file exists (all values fall through to defaults).
fn config_file_path(overrides: &ConfigOverrides) -> Option<PathBuf> {
    if let Some(path) = &overrides.config_file {
        return Some(path.clone());
    }

    let candidate = dirs::config_dir().map(|d| d.join("inkpost").join("config.toml"))?;
    if candidate.exists() {
        Some(candidate)
    } else {
        None
    }
}

fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("parse {} failed: {}", path.display(), e)))
}

/// Default database location: the platform data dir, falling back to the
/// working directory.
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("inkpost").join("inkpost.db"))
        .unwrap_or_else(|| PathBuf::from("inkpost.db"))
}
