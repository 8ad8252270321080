use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{auth::PasswordCredentials, Permission, UserRole};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub credentials: PasswordCredentials,
    pub role: UserRole,
    /// Author ids, no duplicates.
    #[serde(default)]
    pub subscriptions: Vec<String>,
    #[serde(default)]
    pub liked_videos: Vec<String>,
    #[serde(default)]
    pub disliked_videos: Vec<String>,
    pub registered: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.permissions().contains(&permission)
    }

    pub fn is_subscribed_to(&self, author_id: &str) -> bool {
        self.subscriptions.iter().any(|id| id == author_id)
    }

    pub fn matches_username(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.to_lowercase()
    }
}
