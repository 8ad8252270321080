use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub ephemeral: Option<bool>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    /// An empty name disables the bootstrap admin.
    pub bootstrap_admin: Option<String>,
    pub credentials_export_dir: Option<String>,
    pub assets_dir: Option<String>,
    /// Human readable, e.g. "512 MiB".
    pub max_upload_size: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
