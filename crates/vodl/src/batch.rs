use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    downloader::VodDownloader,
    error::VodlResult,
    mux::Muxer,
    util::path::{segment_prefix, VodlPathExt},
};

pub const DEFAULT_OUTPUT_FOLDER: &str = "output";

/// One entry of a batch input file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJob {
    pub url: String,
    #[serde(default)]
    pub output_folder: PathBuf,
    #[serde(default)]
    pub output_file: String,
}

/// Read a JSON array of jobs from `path`, resolving relative output folders
/// against `base_dir`.
pub async fn load_batch<P, B>(path: P, base_dir: B) -> VodlResult<Vec<BatchJob>>
where
    P: AsRef<Path>,
    B: AsRef<Path>,
{
    let data = tokio::fs::read(path.as_ref()).await?;
    let jobs: Vec<BatchJob> = serde_json::from_slice(&data)?;
    Ok(prepare_jobs(jobs, base_dir.as_ref()))
}

/// Fill in missing output names and folders, then make every
/// (folder, file stem) pair unique.
///
/// Segment and intermediate files are named after the stem, so `a.mp4` and
/// `a.mkv` in one folder would share them.
pub fn prepare_jobs(mut jobs: Vec<BatchJob>, base_dir: &Path) -> Vec<BatchJob> {
    for (i, job) in jobs.iter_mut().enumerate() {
        if job.output_file.is_empty() {
            job.output_file = format!("video_{}.mp4", i + 1);
        }
        if job.output_folder.as_os_str().is_empty() {
            job.output_folder = PathBuf::from(DEFAULT_OUTPUT_FOLDER);
        }
        job.output_folder = base_dir.join(&job.output_folder);
    }

    let mut taken = HashSet::new();
    for job in jobs.iter_mut() {
        if taken.insert(job_key(&job.output_folder, &job.output_file)) {
            continue;
        }

        let mut n = 2;
        let renamed = loop {
            let mut candidate = PathBuf::from(&job.output_file);
            candidate.add_suffix(n.to_string());
            if taken.insert(job_key(&job.output_folder, &candidate)) {
                break candidate;
            }
            n += 1;
        };
        let renamed = renamed.to_string_lossy().into_owned();
        tracing::info!(
            "Renaming {} to {renamed} in {}",
            job.output_file,
            job.output_folder.display()
        );
        job.output_file = renamed;
    }

    jobs
}

fn job_key<P>(folder: &Path, file: P) -> PathBuf
where
    P: AsRef<Path>,
{
    folder.join(segment_prefix(file))
}

/// Run all jobs concurrently. A failing job does not affect the others.
///
/// Results are returned in the same order as `jobs`.
pub async fn run_batch<M>(
    downloader: &VodDownloader<M>,
    jobs: &[BatchJob],
) -> Vec<VodlResult<PathBuf>>
where
    M: Muxer + Sync,
{
    tracing::info!("Start downloading {} vods.", jobs.len());
    let downloads = jobs
        .iter()
        .map(|job| downloader.download(&job.url, &job.output_folder, &job.output_file));
    futures::future::join_all(downloads).await
}
