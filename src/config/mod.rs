mod file_config;

pub use file_config::FileConfig;

use crate::kv_store::{KvStore, MemoryKvStore, SqliteKvStore};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use crate::user::IdentitySettings;
use anyhow::{anyhow, bail, Context, Result};
use byte_unit::Byte;
use clap::ValueEnum;
use std::{path::PathBuf, sync::Arc};

pub const DEFAULT_MAX_UPLOAD_SIZE: &str = "512 MiB";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub ephemeral: bool,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub bootstrap_admin: Option<String>,
    pub credentials_export_dir: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub max_upload_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    Sqlite(PathBuf),
    /// Nothing is written to disk.
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageLocation,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub identity: IdentitySettings,
    pub assets_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let ephemeral = file.ephemeral.unwrap_or(cli.ephemeral);
        let storage = if ephemeral {
            StorageLocation::Memory
        } else {
            let db_path = file
                .db_path
                .map(PathBuf::from)
                .or_else(|| cli.db_path.clone())
                .ok_or_else(|| {
                    anyhow!("db_path must be given on the command line or in the config file, or pass --ephemeral")
                })?;
            if db_path.is_dir() {
                bail!("db_path is a directory: {:?}", db_path);
            }
            StorageLocation::Sqlite(db_path)
        };

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let bootstrap_admin = file
            .bootstrap_admin
            .or_else(|| cli.bootstrap_admin.clone())
            .filter(|name| !name.trim().is_empty());

        let credentials_export_dir = file
            .credentials_export_dir
            .map(PathBuf::from)
            .or_else(|| cli.credentials_export_dir.clone());
        if let Some(dir) = &credentials_export_dir {
            if !dir.is_dir() {
                bail!("credentials_export_dir is not a directory: {:?}", dir);
            }
        }

        let assets_dir = file
            .assets_dir
            .map(PathBuf::from)
            .or_else(|| cli.assets_dir.clone());
        if let Some(dir) = &assets_dir {
            if !dir.is_dir() {
                bail!("assets_dir is not a directory: {:?}", dir);
            }
        }

        let max_upload_size = file
            .max_upload_size
            .or_else(|| cli.max_upload_size.clone())
            .unwrap_or_else(|| DEFAULT_MAX_UPLOAD_SIZE.to_string());
        let max_upload_bytes = parse_upload_size(&max_upload_size)?;

        Ok(AppConfig {
            storage,
            port,
            logging_level,
            identity: IdentitySettings {
                bootstrap_admin,
                credentials_export_dir,
            },
            assets_dir,
            max_upload_bytes,
        })
    }

    pub fn open_store(&self) -> Result<Arc<dyn KvStore>> {
        let store: Arc<dyn KvStore> = match &self.storage {
            StorageLocation::Sqlite(path) => Arc::new(SqliteKvStore::new(path)?),
            StorageLocation::Memory => Arc::new(MemoryKvStore::default()),
        };
        Ok(store)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            assets_dir: self.assets_dir.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

pub fn parse_upload_size(s: &str) -> Result<usize> {
    let bytes = Byte::parse_str(s, true)
        .map_err(|err| anyhow!("{}", err))
        .with_context(|| format!("Invalid max_upload_size {:?}", s))?;
    usize::try_from(bytes.as_u64()).with_context(|| format!("max_upload_size {:?} is too big", s))
}
