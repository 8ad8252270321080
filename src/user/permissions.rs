use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    UploadVideos,
    React,
    Subscribe,
    ManageOwnVideos,
    ManageAnyVideo,
    ManageRoles,
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::UploadVideos,
    Permission::React,
    Permission::Subscribe,
    Permission::ManageOwnVideos,
    Permission::ManageAnyVideo,
    Permission::ManageRoles,
];
const REGULAR_PERMISSIONS: &[Permission] = &[
    Permission::UploadVideos,
    Permission::React,
    Permission::Subscribe,
    Permission::ManageOwnVideos,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Regular,
}

impl UserRole {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            UserRole::Admin => ADMIN_PERMISSIONS,
            UserRole::Regular => REGULAR_PERMISSIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Regular => "Regular",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "regular" => Some(UserRole::Regular),
            _ => None,
        }
    }
}
