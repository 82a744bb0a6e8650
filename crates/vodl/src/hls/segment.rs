use std::path::{Path, PathBuf};

use m3u8_rs::MediaPlaylist;

use crate::util::path::segment_path;

/// One segment scheduled for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTask {
    /// Position of the segment in the media playlist, starts from 0
    pub index: usize,
    /// Segment URI as written in the playlist, possibly relative
    pub uri: String,
    /// Destination file, exclusive to this task
    pub path: PathBuf,
}

impl SegmentTask {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.uri.clone())
    }
}

/// Build download tasks for every segment of `playlist`, in playlist order.
///
/// Segments without a URI are skipped but still consume their index, so the
/// file names always reflect playback position.
pub fn segment_tasks<P>(playlist: &MediaPlaylist, cwd: P, prefix: &str) -> Vec<SegmentTask>
where
    P: AsRef<Path>,
{
    playlist
        .segments
        .iter()
        .enumerate()
        .filter(|(_, segment)| !segment.uri.trim().is_empty())
        .map(|(index, segment)| SegmentTask {
            index,
            uri: segment.uri.clone(),
            path: segment_path(cwd.as_ref(), prefix, index),
        })
        .collect()
}
