pub mod segment;
mod variant;

use std::fmt;

pub use m3u8_rs;
use m3u8_rs::Playlist;
pub use variant::select_variant;

use crate::error::{VodlError, VodlResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistType {
    Master,
    Media,
}

impl PlaylistType {
    pub fn of(playlist: &Playlist) -> Self {
        match playlist {
            Playlist::MasterPlaylist(_) => Self::Master,
            Playlist::MediaPlaylist(_) => Self::Media,
        }
    }
}

impl fmt::Display for PlaylistType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => f.write_str("master playlist"),
            Self::Media => f.write_str("media playlist"),
        }
    }
}

/// Decode raw manifest bytes into a master or media playlist.
pub fn decode_playlist(bytes: &[u8]) -> VodlResult<Playlist> {
    m3u8_rs::parse_playlist_res(bytes).map_err(|e| VodlError::M3u8ParseError(e.to_string()))
}
