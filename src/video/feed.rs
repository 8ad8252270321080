use super::Video;

pub const MORE_FROM_AUTHOR_LIMIT: usize = 4;

/// Newest first. Ties keep their stored order.
pub fn newest_first(videos: &[Video]) -> Vec<&Video> {
    let mut sorted: Vec<&Video> = videos.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

/// Other videos by the author of `video`, in stored order.
pub fn more_from_author<'a>(videos: &'a [Video], video: &Video, limit: usize) -> Vec<&'a Video> {
    videos
        .iter()
        .filter(|v| v.author_id == video.author_id && v.id != video.id)
        .take(limit)
        .collect()
}
