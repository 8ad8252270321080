//! The single owner of users, videos and the session.
//!
//! Every mutation goes through [`IdentityService`] or [`VideoRepository`],
//! both borrowed from an `AppState`, and is written back to the store
//! before the borrow ends.

use crate::kv_store::{load_json, save_json, KvStore, StorageKey};
use crate::user::{IdentityService, IdentitySettings, User};
use crate::video::{Video, VideoRepository};
use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub type GuardedAppState = Arc<Mutex<AppState>>;

pub struct AppState {
    store: Arc<dyn KvStore>,
    pub(crate) settings: IdentitySettings,
    pub(crate) users: Vec<User>,
    pub(crate) videos: Vec<Video>,
    pub(crate) current_user_id: Option<String>,
}

impl AppState {
    /// Reads the three slots from `store`. Missing or malformed slots start
    /// empty, and a session pointing at an unknown user is dropped.
    pub fn load(store: Arc<dyn KvStore>, settings: IdentitySettings) -> AppState {
        let users: Vec<User> = load_json(store.as_ref(), StorageKey::Users).unwrap_or_default();
        let videos: Vec<Video> =
            load_json(store.as_ref(), StorageKey::Videos).unwrap_or_default();
        let session: Option<User> =
            load_json::<Option<User>>(store.as_ref(), StorageKey::CurrentUser).flatten();

        let current_user_id = match session {
            Some(snapshot) if users.iter().any(|u| u.id == snapshot.id) => Some(snapshot.id),
            Some(snapshot) => {
                warn!(
                    "Dropping stored session for unknown user {}",
                    snapshot.username
                );
                None
            }
            None => None,
        };

        info!(
            "Loaded {} users and {} videos, session: {}",
            users.len(),
            videos.len(),
            current_user_id.is_some()
        );

        AppState {
            store,
            settings,
            users,
            videos,
            current_user_id,
        }
    }

    pub fn into_guarded(self) -> GuardedAppState {
        Arc::new(Mutex::new(self))
    }

    pub fn identity(&mut self) -> IdentityService<'_> {
        IdentityService::new(self)
    }

    pub fn videos(&mut self) -> VideoRepository<'_> {
        VideoRepository::new(self)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn all_videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn current_user(&self) -> Option<&User> {
        let id = self.current_user_id.as_deref()?;
        self.find_user_by_id(id)
    }

    pub fn find_user_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Case-insensitive, first match wins.
    pub fn find_user_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.matches_username(username))
    }

    pub fn get_video(&self, id: &str) -> Option<&Video> {
        self.videos.iter().find(|v| v.id == id)
    }

    pub fn is_subscribed(&self, author_id: &str, user_id: &str) -> bool {
        self.find_user_by_id(user_id)
            .map(|u| u.is_subscribed_to(author_id))
            .unwrap_or(false)
    }

    pub(crate) fn persist_users(&self) -> Result<()> {
        save_json(self.store.as_ref(), StorageKey::Users, &self.users)
    }

    pub(crate) fn persist_videos(&self) -> Result<()> {
        save_json(self.store.as_ref(), StorageKey::Videos, &self.videos)
    }

    /// Writes the snapshot of the logged in user, or `null`.
    pub(crate) fn persist_session(&self) -> Result<()> {
        save_json(self.store.as_ref(), StorageKey::CurrentUser, &self.current_user())
    }

    /// Refreshes the session snapshot when `user_id` is the one logged in.
    pub(crate) fn refresh_session_of(&self, user_id: &str) -> Result<()> {
        if self.current_user_id.as_deref() == Some(user_id) {
            self.persist_session()?;
        }
        Ok(())
    }
}
