use crate::user::{Permission, User};
use crate::video::Video;

/// Admins manage every video, everyone else only their own.
pub fn can_manage(user: Option<&User>, video: &Video) -> bool {
    match user {
        Some(user) => {
            user.has_permission(Permission::ManageAnyVideo)
                || (user.id == video.author_id && user.has_permission(Permission::ManageOwnVideos))
        }
        None => false,
    }
}

pub fn can_react(user: Option<&User>) -> bool {
    user.map(|u| u.has_permission(Permission::React))
        .unwrap_or(false)
}

/// Nobody subscribes to themselves.
pub fn can_subscribe(user: Option<&User>, video: &Video) -> bool {
    match user {
        Some(user) => user.has_permission(Permission::Subscribe) && user.id != video.author_id,
        None => false,
    }
}
