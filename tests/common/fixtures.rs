//! Test data setup
//!
//! Builds the database every test server starts from, plus helper trees
//! on disk for the importer.

use super::constants::*;
use std::path::Path;
use std::sync::Arc;
use vidshare::kv_store::SqliteKvStore;
use vidshare::user::IdentitySettings;
use vidshare::AppState;

/// Creates a database under `dir` holding the three test users and no
/// session.
pub fn create_test_db(dir: &Path) -> Arc<SqliteKvStore> {
    let store = Arc::new(
        SqliteKvStore::new(dir.join("vidshare.db")).expect("Failed to create test database"),
    );
    let mut state = AppState::load(store.clone(), IdentitySettings::default());
    for (username, password) in [
        (TEST_USER, TEST_PASS),
        (OTHER_USER, OTHER_PASS),
        (ADMIN_USER, ADMIN_PASS),
    ] {
        state
            .identity()
            .register(username, password)
            .expect("Failed to register test user");
    }
    state.identity().logout().expect("Failed to clear session");
    store
}

/// One folder of an import tree.
pub struct VideoFixture<'a> {
    pub folder: &'a str,
    pub with_video: bool,
    pub with_thumbnail: bool,
}

impl<'a> VideoFixture<'a> {
    pub fn complete(folder: &'a str) -> Self {
        VideoFixture {
            folder,
            with_video: true,
            with_thumbnail: true,
        }
    }

    pub fn video_only(folder: &'a str) -> Self {
        VideoFixture {
            folder,
            with_video: true,
            with_thumbnail: false,
        }
    }
}

/// Writes one sub folder per fixture under `root`.
pub fn write_import_tree(root: &Path, fixtures: &[VideoFixture]) {
    for fixture in fixtures {
        let folder = root.join(fixture.folder);
        std::fs::create_dir_all(&folder).expect("Failed to create import folder");
        if fixture.with_video {
            std::fs::write(folder.join("clip.mp4"), SAMPLE_MP4).expect("Failed to write video");
        }
        if fixture.with_thumbnail {
            std::fs::write(folder.join("cover.png"), SAMPLE_PNG)
                .expect("Failed to write thumbnail");
        }
    }
}
