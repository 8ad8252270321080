use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A file picked for import, addressed relative to the selected root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Forward-slash separated, first segment is the folder name.
    pub relative_path: String,
    pub mime_type: String,
    pub path: PathBuf,
}

impl SelectedFile {
    pub fn folder(&self) -> &str {
        self.relative_path
            .split('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// The type a browser declares for a picked file, keyed on its extension.
fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    let mime_type = match extension.as_deref()? {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime_type)
}

/// The extension decides, content is only sniffed for unknown extensions.
pub fn detect_mime_type(path: &Path) -> String {
    if let Some(mime_type) = mime_from_extension(path) {
        return mime_type.to_string();
    }
    match infer::get_from_path(path) {
        Ok(Some(kind)) => kind.mime_type().to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

fn scan_directory_blocking(root: &Path) -> Result<Vec<SelectedFile>> {
    if !root.is_dir() {
        bail!("{:?} is not a directory", root);
    }
    let mut files = vec![];
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {:?}", root))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{:?} escaped {:?}", entry.path(), root))?;
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(SelectedFile {
            relative_path,
            mime_type: detect_mime_type(entry.path()),
            path: entry.path().to_path_buf(),
        });
    }
    debug!("Scanned {} files under {:?}", files.len(), root);
    Ok(files)
}

/// Lists every file under `root`, sorted by name within each directory.
pub async fn scan_directory(root: PathBuf) -> Result<Vec<SelectedFile>> {
    tokio::task::spawn_blocking(move || scan_directory_blocking(&root)).await?
}
