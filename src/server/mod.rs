mod account_routes;
pub mod config;
mod http_layers;
#[allow(clippy::module_inception)]
pub mod server;
pub(self) mod session;
pub mod state;
mod video_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
