use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidshare::config::{AppConfig, CliConfig, FileConfig, DEFAULT_MAX_UPLOAD_SIZE};
use vidshare::server::config::DEFAULT_PORT;
use vidshare::user::DEFAULT_BOOTSTRAP_ADMIN;
use vidshare::{run_server, AppState, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database holding users, videos and the session.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Keep everything in memory, nothing survives a restart.
    #[clap(long)]
    pub ephemeral: bool,

    /// Path to a TOML config file, its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on, loopback only.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Registering with exactly this username grants the Admin role.
    #[clap(long, default_value = DEFAULT_BOOTSTRAP_ADMIN)]
    pub bootstrap_admin: String,

    /// Directory where a credentials text file is written for every new account.
    #[clap(long, value_parser = parse_path)]
    pub credentials_export_dir: Option<PathBuf>,

    /// Directory with the logo and background images, served under /assets.
    #[clap(long, value_parser = parse_path)]
    pub assets_dir: Option<PathBuf>,

    /// Largest accepted upload, e.g. "512 MiB".
    #[clap(long, default_value = DEFAULT_MAX_UPLOAD_SIZE)]
    pub max_upload_size: String,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            ephemeral: self.ephemeral,
            port: self.port,
            logging_level: self.logging_level.clone(),
            bootstrap_admin: Some(self.bootstrap_admin.clone()),
            credentials_export_dir: self.credentials_export_dir.clone(),
            assets_dir: self.assets_dir.clone(),
            max_upload_size: Some(self.max_upload_size.clone()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;
    info!("Storage: {:?}", config.storage);

    let store = config.open_store()?;
    let app_state = AppState::load(store, config.identity.clone());

    run_server(config.server_config(), app_state.into_guarded()).await
}
