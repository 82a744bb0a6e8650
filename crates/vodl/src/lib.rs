//! Download HLS video-on-demand streams into a single file.
//!
//! ```text
//! ┌───────────────────┐          ┌───────────────────┐
//! │                   │  master  │                   │
//! │   Manifest URL    ├──────────►  select_variant   │
//! │                   │          │                   │
//! └─────────┬─────────┘          └─────────┬─────────┘
//!           │ media                        │ resolve_reference
//!           │                              │
//! ┌─────────▼──────────────────────────────▼─────────┐
//! │                                                  │
//! │                  Media Playlist                  │
//! │                                                  │
//! └────────────────────────┬─────────────────────────┘
//!                          │
//! ┌────────────────────────▼─────────────────────────┐
//! │                                                  ├───┐
//! │                SegmentDownloader                 │   │fetch_segment
//! │                   [Semaphore]                    ◄───┘
//! │                                                  │
//! └────────────────────────┬─────────────────────────┘
//!                          │ {prefix}_0.ts .. {prefix}_N.ts
//! ┌────────────────────────▼─────────────────────────┐
//! │                      Muxer                       │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod batch;
pub mod download;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod hls;
pub mod mux;
pub mod util;

pub use downloader::{JobStage, VodDownloader, VodDownloaderBuilder};
pub use error::*;
pub use fetch::{FetchResult, Fetcher, RetryPolicy};
pub use util::http::HttpClient;
