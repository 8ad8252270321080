use super::{guest_viewer_marker, EmbeddedBlob, Video};
use crate::app_state::AppState;
use crate::error::{ServiceError, ServiceResult};
use chrono::Utc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaction {
    Like,
    Dislike,
}

/// Video operations over the borrowed state. Ownership is not checked here,
/// callers gate destructive operations.
pub struct VideoRepository<'a> {
    state: &'a mut AppState,
}

impl<'a> VideoRepository<'a> {
    pub(crate) fn new(state: &'a mut AppState) -> Self {
        VideoRepository { state }
    }

    /// Publishes a video authored by the logged in user.
    pub fn create(
        &mut self,
        title: &str,
        video_data: EmbeddedBlob,
        thumbnail_data: EmbeddedBlob,
    ) -> ServiceResult<Video> {
        let author = self
            .state
            .current_user()
            .ok_or(ServiceError::NotAuthenticated)?;
        let video = Video {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_owned(),
            author_id: author.id.clone(),
            author_name: author.username.clone(),
            video_data,
            thumbnail_data,
            likes: vec![],
            dislikes: vec![],
            views: vec![],
            timestamp: Utc::now(),
        };

        self.state.videos.push(video.clone());
        self.state.persist_videos()?;
        info!("{} published video {} ({})", video.author_name, video.title, video.id);
        Ok(video)
    }

    pub fn get(&self, id: &str) -> Option<&Video> {
        self.state.get_video(id)
    }

    pub fn all(&self) -> &[Video] {
        self.state.all_videos()
    }

    pub fn delete(&mut self, id: &str) -> ServiceResult<bool> {
        let Some(position) = self.state.videos.iter().position(|v| v.id == id) else {
            return Ok(false);
        };
        let video = self.state.videos.remove(position);

        let mut users_changed = false;
        for user in self.state.users.iter_mut() {
            let before = user.liked_videos.len() + user.disliked_videos.len();
            user.liked_videos.retain(|v| v != id);
            user.disliked_videos.retain(|v| v != id);
            users_changed |= before != user.liked_videos.len() + user.disliked_videos.len();
        }

        self.state.persist_videos()?;
        if users_changed {
            self.state.persist_users()?;
            self.state.persist_session()?;
        }
        info!("Deleted video {} ({})", video.title, video.id);
        Ok(true)
    }

    pub fn rename(&mut self, id: &str, title: &str) -> ServiceResult<bool> {
        let Some(video) = self.state.videos.iter_mut().find(|v| v.id == id) else {
            return Ok(false);
        };
        video.title = title.to_owned();
        self.state.persist_videos()?;
        debug!("Renamed video {} to {}", id, title);
        Ok(true)
    }

    pub fn toggle_like(&mut self, video_id: &str, user_id: &str) -> ServiceResult<bool> {
        self.toggle_reaction(video_id, user_id, Reaction::Like)
    }

    pub fn toggle_dislike(&mut self, video_id: &str, user_id: &str) -> ServiceResult<bool> {
        self.toggle_reaction(video_id, user_id, Reaction::Dislike)
    }

    fn toggle_reaction(
        &mut self,
        video_id: &str,
        user_id: &str,
        reaction: Reaction,
    ) -> ServiceResult<bool> {
        if user_id.is_empty() {
            return Ok(false);
        }
        let state = &mut *self.state;
        let Some(video) = state.videos.iter_mut().find(|v| v.id == video_id) else {
            return Ok(false);
        };

        let (own, other) = match reaction {
            Reaction::Like => (&mut video.likes, &mut video.dislikes),
            Reaction::Dislike => (&mut video.dislikes, &mut video.likes),
        };
        let reacted = if own.iter().any(|id| id == user_id) {
            own.retain(|id| id != user_id);
            false
        } else {
            other.retain(|id| id != user_id);
            own.push(user_id.to_owned());
            true
        };

        let mut user_changed = false;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            let (own, other) = match reaction {
                Reaction::Like => (&mut user.liked_videos, &mut user.disliked_videos),
                Reaction::Dislike => (&mut user.disliked_videos, &mut user.liked_videos),
            };
            own.retain(|id| id != video_id);
            other.retain(|id| id != video_id);
            if reacted {
                own.push(video_id.to_owned());
            }
            user_changed = true;
        }

        state.persist_videos()?;
        if user_changed {
            state.persist_users()?;
            state.refresh_session_of(user_id)?;
        }
        debug!("{:?} on {} by {}: {}", reaction, video_id, user_id, reacted);
        Ok(true)
    }

    /// Authenticated viewers count once, anonymous ones every time.
    pub fn record_view(&mut self, video_id: &str, user_id: Option<&str>) -> ServiceResult<bool> {
        let Some(video) = self.state.videos.iter_mut().find(|v| v.id == video_id) else {
            return Ok(false);
        };
        match user_id.filter(|id| !id.is_empty()) {
            Some(user_id) => {
                if !video.views.iter().any(|id| id == user_id) {
                    video.views.push(user_id.to_owned());
                }
            }
            None => video.views.push(guest_viewer_marker()),
        }
        self.state.persist_videos()?;
        Ok(true)
    }

    pub fn toggle_subscription(&mut self, author_id: &str, user_id: &str) -> ServiceResult<bool> {
        let Some(user) = self.state.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        if user.is_subscribed_to(author_id) {
            user.subscriptions.retain(|id| id != author_id);
        } else {
            user.subscriptions.push(author_id.to_owned());
        }
        self.state.persist_users()?;
        self.state.refresh_session_of(user_id)?;
        Ok(true)
    }

    pub fn is_subscribed(&self, author_id: &str, user_id: &str) -> bool {
        self.state.is_subscribed(author_id, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_store::{load_json, MemoryKvStore, StorageKey};
    use crate::user::{IdentitySettings, User};
    use crate::video::feed::newest_first;
    use std::sync::Arc;

    fn blobs() -> (EmbeddedBlob, EmbeddedBlob) {
        (
            EmbeddedBlob::encode("video/mp4", b"video"),
            EmbeddedBlob::encode("image/jpeg", b"thumb"),
        )
    }

    /// State with users "ann" (logged in) and "bob", plus one video by ann.
    fn make_state() -> (AppState, Arc<MemoryKvStore>, String) {
        let store = Arc::new(MemoryKvStore::default());
        let mut state = AppState::load(store.clone(), IdentitySettings::default());
        state.identity().register("ann", "pw").unwrap();
        state.identity().register("bob", "pw").unwrap();
        state.identity().login("ann", "pw").unwrap();
        let (video, thumb) = blobs();
        let video = state.videos().create("First", video, thumb).unwrap();
        (state, store, video.id)
    }

    fn user_id(state: &AppState, name: &str) -> String {
        state.find_user_by_username(name).unwrap().id.clone()
    }

    #[test]
    fn create_requires_a_session() {
        let (mut state, _, _) = make_state();
        state.identity().logout().unwrap();

        let (video, thumb) = blobs();
        assert!(matches!(
            state.videos().create("Nope", video, thumb),
            Err(ServiceError::NotAuthenticated)
        ));
        assert_eq!(state.all_videos().len(), 1);
    }

    #[test]
    fn create_stamps_the_author() {
        let (state, store, video_id) = make_state();
        let video = state.get_video(&video_id).unwrap();

        assert_eq!(video.author_name, "ann");
        assert_eq!(video.author_id, user_id(&state, "ann"));
        assert_eq!(video.view_count(), 0);

        let stored: Vec<Video> = load_json(store.as_ref(), StorageKey::Videos).unwrap();
        assert_eq!(stored[0].id, video_id);
    }

    #[test]
    fn reactions_are_mutually_exclusive() {
        let (mut state, _, video_id) = make_state();
        let bob = user_id(&state, "bob");
        let mut videos = state.videos();

        let toggles = [true, false, false, true, true, false, true];
        for like in toggles {
            if like {
                assert!(videos.toggle_like(&video_id, &bob).unwrap());
            } else {
                assert!(videos.toggle_dislike(&video_id, &bob).unwrap());
            }
            let video = videos.get(&video_id).unwrap();
            assert!(!(video.is_liked_by(&bob) && video.is_disliked_by(&bob)));
        }

        let video = state.get_video(&video_id).unwrap();
        let user = state.find_user_by_id(&bob).unwrap();
        assert_eq!(video.is_liked_by(&bob), user.liked_videos.contains(&video_id));
        assert_eq!(
            video.is_disliked_by(&bob),
            user.disliked_videos.contains(&video_id)
        );
    }

    #[test]
    fn liking_twice_restores_the_original_list() {
        let (mut state, _, video_id) = make_state();
        let ann = user_id(&state, "ann");
        let bob = user_id(&state, "bob");
        state.videos().toggle_like(&video_id, &ann).unwrap();
        let before = state.get_video(&video_id).unwrap().likes.clone();

        state.videos().toggle_like(&video_id, &bob).unwrap();
        state.videos().toggle_like(&video_id, &bob).unwrap();

        assert_eq!(state.get_video(&video_id).unwrap().likes, before);
        assert!(state.find_user_by_id(&bob).unwrap().liked_videos.is_empty());
    }

    #[test]
    fn disliking_moves_a_like_over() {
        let (mut state, _, video_id) = make_state();
        let bob = user_id(&state, "bob");
        state.videos().toggle_like(&video_id, &bob).unwrap();
        state.videos().toggle_dislike(&video_id, &bob).unwrap();

        let video = state.get_video(&video_id).unwrap();
        assert_eq!(video.like_count(), 0);
        assert_eq!(video.dislikes, vec![bob.clone()]);
        let user = state.find_user_by_id(&bob).unwrap();
        assert!(user.liked_videos.is_empty());
        assert_eq!(user.disliked_videos, vec![video_id.clone()]);
    }

    #[test]
    fn toggles_on_missing_targets_are_silent() {
        let (mut state, _, video_id) = make_state();
        let bob = user_id(&state, "bob");

        assert!(!state.videos().toggle_like("missing", &bob).unwrap());
        assert!(!state.videos().toggle_dislike(&video_id, "").unwrap());
        assert!(!state.videos().toggle_subscription("someone", "missing").unwrap());
        assert!(!state.videos().record_view("missing", None).unwrap());
        assert_eq!(state.get_video(&video_id).unwrap().dislike_count(), 0);
    }

    #[test]
    fn views_dedupe_users_but_not_guests() {
        let (mut state, _, video_id) = make_state();
        let bob = user_id(&state, "bob");

        state.videos().record_view(&video_id, Some(&bob)).unwrap();
        state.videos().record_view(&video_id, Some(&bob)).unwrap();
        assert_eq!(state.get_video(&video_id).unwrap().view_count(), 1);

        state.videos().record_view(&video_id, None).unwrap();
        state.videos().record_view(&video_id, None).unwrap();
        let video = state.get_video(&video_id).unwrap();
        assert_eq!(video.view_count(), 3);
        assert_ne!(video.views[1], video.views[2]);
        assert!(video.views[1].starts_with("guest_"));
    }

    #[test]
    fn delete_removes_from_lookups_and_feed() {
        let (mut state, _, video_id) = make_state();
        let bob = user_id(&state, "bob");
        state.videos().toggle_like(&video_id, &bob).unwrap();

        assert!(state.videos().delete(&video_id).unwrap());
        assert!(state.get_video(&video_id).is_none());
        assert!(newest_first(state.all_videos()).is_empty());
        assert!(state.find_user_by_id(&bob).unwrap().liked_videos.is_empty());

        assert!(!state.videos().delete(&video_id).unwrap());
        assert!(!state.videos().delete("never-existed").unwrap());
    }

    #[test]
    fn delete_and_rename_do_not_check_ownership() {
        let (mut state, _, video_id) = make_state();
        state.identity().login("bob", "pw").unwrap();

        assert!(state.videos().rename(&video_id, "Renamed").unwrap());
        assert_eq!(state.get_video(&video_id).unwrap().title, "Renamed");
        assert!(!state.videos().rename("missing", "x").unwrap());

        assert!(state.videos().delete(&video_id).unwrap());
    }

    #[test]
    fn subscriptions_toggle_and_refresh_the_session() {
        let (mut state, store, video_id) = make_state();
        let ann = user_id(&state, "ann");
        let author = state.get_video(&video_id).unwrap().author_id.clone();
        let bob = user_id(&state, "bob");
        state.identity().login("bob", "pw").unwrap();

        assert!(state.videos().toggle_subscription(&author, &bob).unwrap());
        assert!(state.videos().is_subscribed(&ann, &bob));
        let snapshot: Option<User> = load_json(store.as_ref(), StorageKey::CurrentUser);
        assert_eq!(snapshot.unwrap().subscriptions, vec![ann.clone()]);

        assert!(state.videos().toggle_subscription(&author, &bob).unwrap());
        assert!(!state.is_subscribed(&ann, &bob));
    }
}
