use super::EmbeddedBlob;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const GUEST_VIEWER_PREFIX: &str = "guest_";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub author_name: String,
    pub video_data: EmbeddedBlob,
    pub thumbnail_data: EmbeddedBlob,
    /// User ids, never overlapping with `dislikes`.
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    /// User ids, plus one `guest_` marker per anonymous view.
    #[serde(default)]
    pub views: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Video {
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn dislike_count(&self) -> usize {
        self.dislikes.len()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    pub fn is_disliked_by(&self, user_id: &str) -> bool {
        self.dislikes.iter().any(|id| id == user_id)
    }
}

pub fn guest_viewer_marker() -> String {
    format!("{}{}", GUEST_VIEWER_PREFIX, uuid::Uuid::new_v4().simple())
}
