use std::{
    fmt,
    num::NonZeroU32,
    path::{Path, PathBuf},
    time::Duration,
};

use m3u8_rs::{MediaPlaylist, Playlist};
use reqwest::Url;

use crate::{
    download::{SegmentDownloader, DEFAULT_CONCURRENCY},
    error::{VodlError, VodlResult},
    fetch::{Fetcher, RetryPolicy},
    hls::select_variant,
    mux::Muxer,
    util::{http::HttpClient, path::segment_prefix, resolve_reference},
};

/// Steps a single download job goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    FetchingRootManifest,
    MasterResolution,
    FetchingMediaManifest,
    DownloadingSegments,
    Muxing,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::FetchingRootManifest => "fetching root manifest",
            Self::MasterResolution => "master playlist resolution",
            Self::FetchingMediaManifest => "fetching media manifest",
            Self::DownloadingSegments => "downloading segments",
            Self::Muxing => "muxing",
        };
        f.write_str(stage)
    }
}

/// Downloads a VOD asset from its manifest URL into a single file.
///
/// One downloader can serve several jobs at once. Every job gets its own
/// segment concurrency limit, while the HTTP client is shared.
pub struct VodDownloader<M> {
    fetcher: Fetcher,
    muxer: M,
    concurrency: NonZeroU32,
}

impl<M> VodDownloader<M>
where
    M: Muxer + Sync,
{
    pub fn new(fetcher: Fetcher, muxer: M, concurrency: NonZeroU32) -> Self {
        Self {
            fetcher,
            muxer,
            concurrency,
        }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Download the stream behind `manifest_url` to `output_dir/output_name`.
    ///
    /// Segments are written next to the output file as `{stem}_{index}.ts`.
    /// Errors are wrapped in [VodlError::JobFailed] with the stage they
    /// happened at.
    pub async fn download<P>(
        &self,
        manifest_url: &str,
        output_dir: P,
        output_name: &str,
    ) -> VodlResult<PathBuf>
    where
        P: AsRef<Path>,
    {
        let output_dir = output_dir.as_ref();
        let mut stage = JobStage::FetchingRootManifest;
        match self
            .run(manifest_url, output_dir, output_name, &mut stage)
            .await
        {
            Ok(output) => {
                tracing::info!("{output_name} downloaded to {}", output.display());
                Ok(output)
            }
            Err(e) => {
                tracing::error!("{output_name} failed during {stage}: {e}");
                Err(VodlError::JobFailed {
                    stage,
                    source: Box::new(e),
                })
            }
        }
    }

    async fn run(
        &self,
        manifest_url: &str,
        output_dir: &Path,
        output_name: &str,
        stage: &mut JobStage,
    ) -> VodlResult<PathBuf> {
        let url = Url::parse(manifest_url)?;
        tracing::info!("Start fetching manifest for {output_name}: {url}");
        let (final_url, playlist) = self.fetcher.fetch_manifest(url).await?;

        let (media_url, media_playlist) = match playlist {
            Playlist::MasterPlaylist(master) => {
                *stage = JobStage::MasterResolution;
                tracing::debug!(
                    "Master playlist with {} variants fetched from {final_url}",
                    master.variants.len()
                );
                let variant = select_variant(&master.variants).ok_or(VodlError::NoVariant)?;
                let variant_url = resolve_reference(&final_url, &variant.uri)?;

                *stage = JobStage::FetchingMediaManifest;
                self.fetcher.fetch_media_manifest(variant_url).await?
            }
            Playlist::MediaPlaylist(media) => (final_url, media),
        };

        *stage = JobStage::DownloadingSegments;
        let segments = self
            .download_segments(&media_playlist, &media_url, output_dir, output_name)
            .await?;

        *stage = JobStage::Muxing;
        let output = output_dir.join(output_name);
        self.muxer.mux(&segments, &output, output_dir).await?;

        Ok(output)
    }

    async fn download_segments(
        &self,
        playlist: &MediaPlaylist,
        base_url: &Url,
        output_dir: &Path,
        output_name: &str,
    ) -> VodlResult<Vec<PathBuf>> {
        tracing::debug!(
            "Media playlist with {} segments fetched from {base_url}",
            playlist.segments.len()
        );
        tokio::fs::create_dir_all(output_dir).await?;

        let prefix = segment_prefix(output_name);
        SegmentDownloader::new(self.fetcher.clone(), self.concurrency)
            .download(playlist, base_url, output_dir, &prefix)
            .await
    }
}

pub struct VodDownloaderBuilder<M> {
    client: Option<HttpClient>,
    policy: RetryPolicy,
    concurrency: NonZeroU32,
    muxer: Option<M>,
}

impl<M> VodDownloaderBuilder<M> {
    pub fn new() -> Self {
        Self {
            client: None,
            policy: RetryPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
            muxer: None,
        }
    }

    pub fn client(mut self, client: HttpClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn concurrency(mut self, concurrency: NonZeroU32) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.policy.retries = retries;
        self
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.policy.backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, max_backoff: Duration) -> Self {
        self.policy.max_backoff = max_backoff;
        self
    }

    pub fn muxer(mut self, muxer: M) -> Self {
        self.muxer = Some(muxer);
        self
    }

    pub fn build(self) -> VodDownloader<M>
    where
        M: Muxer + Sync + Default,
    {
        let client = self.client.unwrap_or_default();
        VodDownloader::new(
            Fetcher::new(client, self.policy),
            self.muxer.unwrap_or_default(),
            self.concurrency,
        )
    }
}

impl<M> Default for VodDownloaderBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}
