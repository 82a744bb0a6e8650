use thiserror::Error;

use crate::{downloader::JobStage, hls::PlaylistType};

#[derive(Error, Debug)]
pub enum VodlError {
    #[error("HTTP error: {0}")]
    HttpError(reqwest::StatusCode),

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid m3u8 file: {0}")]
    M3u8ParseError(String),

    #[error("Unexpected playlist type: expected {expected}, received {actual}")]
    UnexpectedPlaylistType {
        expected: PlaylistType,
        actual: PlaylistType,
    },

    #[error("No usable variant stream found in master playlist")]
    NoVariant,

    /// Indices are playlist positions of the failed segments, ascending.
    #[error("Failed to download {} segment(s): {failed:?}", .failed.len())]
    SegmentDownloadError { failed: Vec<usize> },

    #[error("Mux error: {0}")]
    MuxError(String),

    #[error("Can not resolve {reference:?} against {base}")]
    InvalidUri { base: String, reference: String },

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error(transparent)]
    MissingExecutable(#[from] which::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    AcquireError(#[from] tokio::sync::AcquireError),

    /// A download job stopped at `stage`.
    #[error("Failed during {stage}: {source}")]
    JobFailed {
        stage: JobStage,
        source: Box<VodlError>,
    },
}

impl VodlError {
    /// Whether this error came from the HTTP layer, either a transport failure
    /// or a final status other than `200 OK`.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self.inner(), Self::HttpError(_) | Self::RequestError(_))
    }

    /// The stage a download job failed at, if this error came from one.
    pub fn stage(&self) -> Option<JobStage> {
        match self {
            Self::JobFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error without its job stage.
    pub fn inner(&self) -> &VodlError {
        match self {
            Self::JobFailed { source, .. } => source.inner(),
            e => e,
        }
    }
}

pub type VodlResult<T> = Result<T, VodlError>;
