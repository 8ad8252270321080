pub mod auth;
mod credential_export;
mod identity_service;
mod permissions;
mod user_models;

pub use auth::PasswordCredentials;
pub use credential_export::{export_contents, export_credentials, export_file_name};
pub use identity_service::{IdentityService, IdentitySettings, DEFAULT_BOOTSTRAP_ADMIN};
pub use permissions::{Permission, UserRole};
pub use user_models::User;
