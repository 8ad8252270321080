use super::{
    auth::PasswordCredentials, credential_export::export_credentials, User, UserRole,
};
use crate::app_state::AppState;
use crate::error::{ServiceError, ServiceResult};
use chrono::Utc;
use std::path::PathBuf;
use tracing::{error, info};

pub const DEFAULT_BOOTSTRAP_ADMIN: &str = "Dregot";

#[derive(Debug, Clone)]
pub struct IdentitySettings {
    /// Registering with exactly this name yields an Admin.
    pub bootstrap_admin: Option<String>,
    /// When set, every registration drops a credentials text file here.
    pub credentials_export_dir: Option<PathBuf>,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        IdentitySettings {
            bootstrap_admin: Some(DEFAULT_BOOTSTRAP_ADMIN.to_string()),
            credentials_export_dir: None,
        }
    }
}

pub struct IdentityService<'a> {
    state: &'a mut AppState,
}

impl<'a> IdentityService<'a> {
    pub(crate) fn new(state: &'a mut AppState) -> Self {
        IdentityService { state }
    }

    pub fn register(&mut self, username: &str, password: &str) -> ServiceResult<User> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(ServiceError::EmptyField);
        }
        if self.state.find_user_by_username(username).is_some() {
            return Err(ServiceError::DuplicateUsername(username.to_owned()));
        }

        let credentials = PasswordCredentials::create(password)
            .map_err(|err| ServiceError::Hashing(err.to_string()))?;
        let role = match &self.state.settings.bootstrap_admin {
            Some(admin_name) if admin_name == username => UserRole::Admin,
            _ => UserRole::Regular,
        };
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_owned(),
            credentials,
            role,
            subscriptions: vec![],
            liked_videos: vec![],
            disliked_videos: vec![],
            registered: Utc::now(),
        };

        self.state.users.push(user.clone());
        self.state.persist_users()?;
        info!("Registered user {} as {}", user.username, role.as_str());

        if let Some(dir) = &self.state.settings.credentials_export_dir {
            match export_credentials(dir, &user, password) {
                Ok(path) => info!("Exported credentials of {} to {:?}", user.username, path),
                Err(err) => error!(
                    "Could not export credentials of {}: {}",
                    user.username, err
                ),
            }
        }

        Ok(user)
    }

    pub fn login(&mut self, username: &str, password: &str) -> ServiceResult<User> {
        let user = self
            .state
            .users
            .iter_mut()
            .find(|u| u.matches_username(username))
            .ok_or(ServiceError::InvalidCredentials)?;
        if !user.credentials.verify(password) {
            return Err(ServiceError::InvalidCredentials);
        }
        user.credentials.last_used = Some(Utc::now());
        let user = user.clone();

        self.state.current_user_id = Some(user.id.clone());
        self.state.persist_users()?;
        self.state.persist_session()?;
        info!("User {} logged in", user.username);
        Ok(user)
    }

    pub fn logout(&mut self) -> ServiceResult<()> {
        if let Some(user) = self.state.current_user() {
            info!("User {} logged out", user.username);
        }
        self.state.current_user_id = None;
        self.state.persist_session()?;
        Ok(())
    }

    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.state.find_user_by_username(username)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.current_user()
    }

    pub fn set_role(&mut self, username: &str, role: UserRole) -> ServiceResult<User> {
        let user = self
            .state
            .users
            .iter_mut()
            .find(|u| u.matches_username(username))
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", username)))?;
        user.role = role;
        let user = user.clone();

        self.state.persist_users()?;
        self.state.refresh_session_of(&user.id)?;
        info!("User {} is now {}", user.username, role.as_str());
        Ok(user)
    }
}
