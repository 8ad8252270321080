//! Bulk import: one video per top-level folder of a selected directory.
//!
//! Each folder contributes its first `video/mp4` file and its first image.
//! Folders missing either are skipped. Files are read without holding the
//! state lock, which is only taken to publish a folder.

mod scan;

pub use scan::{detect_mime_type, scan_directory, SelectedFile};

use crate::app_state::GuardedAppState;
use crate::error::ServiceError;
use crate::video::EmbeddedBlob;
use std::io;
use tracing::{error, info, warn};

pub const IMPORT_VIDEO_MIME: &str = "video/mp4";
pub const IMPORT_IMAGE_MIME_PREFIX: &str = "image/";

#[derive(Debug)]
pub struct FolderSelection {
    pub name: String,
    pub files: Vec<SelectedFile>,
}

impl FolderSelection {
    fn first_video(&self) -> Option<&SelectedFile> {
        self.files.iter().find(|f| f.mime_type == IMPORT_VIDEO_MIME)
    }

    fn first_image(&self) -> Option<&SelectedFile> {
        self.files
            .iter()
            .find(|f| f.mime_type.starts_with(IMPORT_IMAGE_MIME_PREFIX))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Titles of the published videos.
    pub created: Vec<String>,
    /// Folders without a video and an image.
    pub skipped: Vec<String>,
    /// Folders whose files could not be read or stored, with the reason.
    pub failed: Vec<(String, String)>,
    pub aborted_unauthenticated: bool,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "Import finished: {} created, {} skipped, {} failed",
            self.created.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

/// Groups files by their first path segment, keeping first-seen order.
pub fn group_by_folder(files: Vec<SelectedFile>) -> Vec<FolderSelection> {
    let mut folders: Vec<FolderSelection> = vec![];
    for file in files {
        let name = file.folder().to_owned();
        match folders.iter_mut().find(|f| f.name == name) {
            Some(folder) => folder.files.push(file),
            None => folders.push(FolderSelection {
                name,
                files: vec![file],
            }),
        }
    }
    folders
}

async fn read_blob(file: &SelectedFile) -> io::Result<EmbeddedBlob> {
    let bytes = tokio::fs::read(&file.path).await?;
    Ok(EmbeddedBlob::encode(&file.mime_type, &bytes))
}

async fn read_pair(
    video: &SelectedFile,
    thumbnail: &SelectedFile,
) -> io::Result<(EmbeddedBlob, EmbeddedBlob)> {
    Ok((read_blob(video).await?, read_blob(thumbnail).await?))
}

/// Publishes one video per eligible folder as the logged in user.
/// The whole batch stops as soon as no one is logged in.
pub async fn import_files(app: &GuardedAppState, files: Vec<SelectedFile>) -> ImportReport {
    let mut report = ImportReport::default();

    for folder in group_by_folder(files) {
        let (Some(video), Some(thumbnail)) = (folder.first_video(), folder.first_image()) else {
            info!("Skipping folder {}, it needs a video and an image", folder.name);
            report.skipped.push(folder.name);
            continue;
        };

        let (video_data, thumbnail_data) = match read_pair(video, thumbnail).await {
            Ok(pair) => pair,
            Err(err) => {
                error!("Could not read files of folder {}: {}", folder.name, err);
                report.failed.push((folder.name, err.to_string()));
                continue;
            }
        };

        let created = app
            .lock()
            .unwrap()
            .videos()
            .create(&folder.name, video_data, thumbnail_data);
        match created {
            Ok(video) => report.created.push(video.title),
            Err(ServiceError::NotAuthenticated) => {
                warn!("Import aborted, nobody is logged in");
                report.aborted_unauthenticated = true;
                return report;
            }
            Err(err) => {
                error!("Could not store video {}: {}", folder.name, err);
                report.failed.push((folder.name, err.to_string()));
            }
        }
    }

    info!("{}", report.summary());
    report
}
