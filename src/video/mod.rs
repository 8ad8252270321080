mod embedded_blob;
pub mod feed;
mod video_models;
mod video_repository;

pub use embedded_blob::EmbeddedBlob;
pub use video_models::{guest_viewer_marker, Video, GUEST_VIEWER_PREFIX};
pub use video_repository::VideoRepository;
