use std::time::Duration;

use bytes::Bytes;
use m3u8_rs::{MasterPlaylist, MediaPlaylist, Playlist};
use reqwest::{StatusCode, Url};

use crate::{
    download::SegmentSource,
    error::{VodlError, VodlResult},
    hls::{decode_playlist, PlaylistType},
    util::http::HttpClient,
};

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one. Defaults to 3
    pub retries: u32,
    /// Delay before the first retry, doubled on every following one. Defaults to 1s
    pub backoff: Duration,
    /// Upper bound of a single delay. Defaults to 30s
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before retry number `attempt`, starting from 0.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Body of a successful response and the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Request URL after following redirects. Relative references found in
    /// `body` resolve against this one.
    pub url: Url,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct Fetcher {
    client: HttpClient,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: HttpClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GET `url`, retrying transport errors and retryable status codes.
    ///
    /// Only `200 OK` counts as success.
    pub async fn fetch(&self, url: Url) -> VodlResult<FetchResult> {
        tracing::debug!("GET {url}");

        let mut attempt = 0;
        loop {
            let error = match self.fetch_once(url.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };

            if attempt >= self.policy.retries || !is_retryable(&error) {
                tracing::error!("Failed to fetch {url}: {error}");
                return Err(error);
            }

            let delay = self.policy.delay_for_attempt(attempt);
            attempt += 1;
            tracing::warn!(
                "Failed to fetch {url}, retry {attempt}/{} in {delay:?}. {error}",
                self.policy.retries
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn fetch_once(&self, url: Url) -> VodlResult<FetchResult> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            if let Ok(body) = response.text().await {
                tracing::debug!("Error body: {body}");
            }
            return Err(VodlError::HttpError(status));
        }

        let url = response.url().clone();
        let body = response.bytes().await?;
        Ok(FetchResult { url, body })
    }

    /// Fetch and decode a playlist of either type.
    pub async fn fetch_manifest(&self, url: Url) -> VodlResult<(Url, Playlist)> {
        let FetchResult { url: final_url, body } = self.fetch(url).await?;
        let playlist = decode_playlist(&body).inspect_err(|e| {
            tracing::error!("Failed to decode manifest from {final_url}: {e}");
        })?;
        Ok((final_url, playlist))
    }

    pub async fn fetch_master_manifest(&self, url: Url) -> VodlResult<(Url, MasterPlaylist)> {
        match self.fetch_manifest(url).await? {
            (url, Playlist::MasterPlaylist(playlist)) => Ok((url, playlist)),
            (url, playlist) => Err(unexpected_type(&url, PlaylistType::Master, &playlist)),
        }
    }

    pub async fn fetch_media_manifest(&self, url: Url) -> VodlResult<(Url, MediaPlaylist)> {
        match self.fetch_manifest(url).await? {
            (url, Playlist::MediaPlaylist(playlist)) => Ok((url, playlist)),
            (url, playlist) => Err(unexpected_type(&url, PlaylistType::Media, &playlist)),
        }
    }

    pub async fn fetch_segment(&self, url: Url) -> VodlResult<Bytes> {
        let FetchResult { body, .. } = self.fetch(url).await?;
        Ok(body)
    }
}

impl SegmentSource for Fetcher {
    async fn fetch_segment(&self, url: &Url) -> VodlResult<Bytes> {
        Fetcher::fetch_segment(self, url.clone()).await
    }
}

fn unexpected_type(url: &Url, expected: PlaylistType, playlist: &Playlist) -> VodlError {
    let error = VodlError::UnexpectedPlaylistType {
        expected,
        actual: PlaylistType::of(playlist),
    };
    tracing::error!("{error} at {url}");
    error
}

fn is_retryable(error: &VodlError) -> bool {
    match error {
        VodlError::HttpError(status) => {
            status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
        }
        VodlError::RequestError(e) => !e.is_builder(),
        _ => false,
    }
}
