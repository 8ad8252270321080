//! VidShare library
//!
//! A single-device video sharing site: accounts, uploads, a feed, reactions
//! and subscriptions, persisted in a local key-value store.

pub mod app_state;
pub mod config;
pub mod error;
pub mod importer;
pub mod kv_store;
pub mod render;
pub mod server;
pub mod sqlite_persistence;
pub mod user;
pub mod video;

// Re-export commonly used types for convenience
pub use app_state::{AppState, GuardedAppState};
pub use error::{ServiceError, ServiceResult};
pub use server::{run_server, RequestsLoggingLevel};
pub use user::{User, UserRole};
pub use video::Video;
