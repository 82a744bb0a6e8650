use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use m3u8_rs::MediaPlaylist;
use reqwest::Url;
use tokio::{fs::File, io::AsyncWriteExt, sync::Semaphore};

use super::SegmentSource;
use crate::{
    error::{VodlError, VodlResult},
    hls::segment::{segment_tasks, SegmentTask},
    util::resolve_reference,
};

pub const DEFAULT_CONCURRENCY: NonZeroU32 = match NonZeroU32::new(50) {
    Some(concurrency) => concurrency,
    None => unreachable!(),
};

/// Downloads the segments of one media playlist with at most `concurrency`
/// requests in flight.
///
/// A downloader is consumed by [SegmentDownloader::download], so its permits
/// are never shared between two playlists.
pub struct SegmentDownloader<S> {
    source: Arc<S>,
    concurrency: NonZeroU32,
    permits: Arc<Semaphore>,

    downloaded: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
}

impl<S> SegmentDownloader<S>
where
    S: SegmentSource + Send + Sync + 'static,
{
    pub fn new(source: S, concurrency: NonZeroU32) -> Self {
        let permits = Arc::new(Semaphore::new(concurrency.get() as usize));

        Self {
            source: Arc::new(source),
            concurrency,
            permits,

            downloaded: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Download every segment of `playlist` into `output_dir`.
    ///
    /// Returns the written files in playlist order. If any segment fails, the
    /// remaining ones still run to completion before
    /// [VodlError::SegmentDownloadError] is returned.
    pub async fn download<P>(
        self,
        playlist: &MediaPlaylist,
        base_url: &Url,
        output_dir: P,
        prefix: &str,
    ) -> VodlResult<Vec<PathBuf>>
    where
        P: AsRef<Path>,
    {
        let tasks = segment_tasks(playlist, output_dir, prefix);
        let total = tasks.len();
        tracing::info!(
            "Start downloading {total} segments with {} thread(s).",
            self.concurrency.get()
        );

        let mut handles = Vec::with_capacity(total);
        for task in tasks.iter().cloned() {
            // wait for a free slot before the task is admitted
            let permit = self.permits.clone().acquire_owned().await?;

            let source = self.source.clone();
            let segments_downloaded = self.downloaded.clone();
            let segments_failed = self.failed.clone();
            let base_url = base_url.clone();

            let index = task.index;
            let handle = tokio::spawn(async move {
                let filename = task.file_name();

                // Workaround for `higher-ranked lifetime error`
                let result = assert_send(download_segment(&*source, &base_url, &task)).await;
                match &result {
                    Ok(_) => {
                        let downloaded = segments_downloaded.fetch_add(1, Ordering::Relaxed)
                            + 1
                            + segments_failed.load(Ordering::Relaxed);
                        let percentage = if total == 0 {
                            0.
                        } else {
                            downloaded as f32 / total as f32 * 100.
                        };
                        tracing::info!(
                            "Processing {filename} finished. ({downloaded} / {total} or {percentage:.2}%)"
                        );
                    }
                    Err(e) => {
                        segments_failed.fetch_add(1, Ordering::Relaxed);
                        tracing::error!("Processing {filename} failed. {e}");
                    }
                }

                // drop permit to release the semaphore
                drop(permit);
                result
            });
            handles.push((index, handle));
        }

        // wait for all tasks to finish, a failed one does not stop the others
        let mut failed = Vec::new();
        for (index, handle) in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => failed.push(index),
                Err(e) => {
                    tracing::error!("Segment {index} task aborted: {e}");
                    failed.push(index);
                }
            }
        }

        if !failed.is_empty() {
            tracing::error!("Failed to download {} segments:", failed.len());
            for index in failed.iter() {
                tracing::error!("  - #{index}");
            }
            return Err(VodlError::SegmentDownloadError { failed });
        }

        Ok(tasks.into_iter().map(|task| task.path).collect())
    }
}

async fn download_segment<S>(source: &S, base_url: &Url, task: &SegmentTask) -> VodlResult<()>
where
    S: SegmentSource + Sync,
{
    let url = resolve_reference(base_url, &task.uri)?;
    let bytes = source.fetch_segment(&url).await?;

    let mut file = File::create(&task.path).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;

    Ok(())
}

// https://github.com/rust-lang/rust/issues/102211#issuecomment-1371414544
// TODO: remove this when this issue is fixed
fn assert_send<'a, T>(
    fut: impl std::future::Future<Output = T> + Send + 'a,
) -> impl std::future::Future<Output = T> + Send + 'a {
    fut
}
