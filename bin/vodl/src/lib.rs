use std::{num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use clap::{ArgGroup, ValueEnum};
use fake_user_agent::get_chrome_rua;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use vodl::{
    batch::{load_batch, run_batch, BatchJob},
    download::DEFAULT_CONCURRENCY,
    mux::VodMuxer,
    HttpClient, VodDownloaderBuilder,
};

pub const DEFAULT_OUTPUT_FILE: &str = "video.mp4";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxerKind {
    /// Concat with ffmpeg and remux into the output container
    Ffmpeg,
    /// Join segments byte by byte, only suitable for .ts output
    Concat,
}

#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "vodl", version, about)]
#[clap(group(ArgGroup::new("input").required(true).args(["url", "json"])))]
pub struct VodlArgs {
    /// Url of m3u8 to be downloaded
    #[clap(short, long)]
    url: Option<String>,

    /// Path to input json
    ///
    /// A list of `{"url", "outputFolder", "outputFile"}` objects. All entries are
    /// downloaded at the same time.
    #[clap(short, long)]
    json: Option<PathBuf>,

    /// Output folder, used with --url
    #[clap(short, long, default_value = "output")]
    output: PathBuf,

    /// Name to save downloaded video file as [default: video.mp4]
    ///
    /// Ignored when --json is used.
    #[clap(short, long)]
    name: Option<String>,

    /// Segments downloaded concurrently for each video
    #[clap(long, alias = "concurrency", default_value_t = DEFAULT_CONCURRENCY)]
    threads: NonZeroU32,

    /// Retry limit for each request
    #[clap(long, default_value = "3")]
    retries: u32,

    /// Timeout seconds for each manifest/segment request
    #[clap(long, default_value = "60")]
    timeout: u64,

    /// HTTP Header used to download
    ///
    /// Custom header. eg. "User-Agent: xxxxx". This option will override --cookies.
    #[clap(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Cookies used to download
    #[clap(long)]
    cookies: Option<String>,

    /// How downloaded segments are merged
    #[clap(long, value_enum, default_value_t = MuxerKind::Ffmpeg)]
    muxer: MuxerKind,

    /// Do not merge m3u8 chunks.
    #[clap(long)]
    no_merge: bool,

    /// Debug output
    #[clap(long, alias = "debug")]
    pub verbose: bool,
}

impl VodlArgs {
    fn client(&self) -> anyhow::Result<HttpClient> {
        let mut headers = HeaderMap::new();
        if let Some(cookies) = &self.cookies {
            headers.insert(
                reqwest::header::COOKIE,
                HeaderValue::from_str(cookies).context("Invalid cookie")?,
            );
        }

        for header in &self.headers {
            let (key, value) = parse_header(header)?;
            headers.insert(key, value);
        }

        let builder = Client::builder()
            .default_headers(headers)
            .user_agent(get_chrome_rua())
            .timeout(Duration::from_secs(self.timeout));
        Ok(HttpClient::new(builder)?)
    }

    fn muxer(&self) -> VodMuxer {
        if self.no_merge {
            VodMuxer::skip()
        } else {
            match self.muxer {
                MuxerKind::Ffmpeg => VodMuxer::ffmpeg(),
                MuxerKind::Concat => VodMuxer::concat(),
            }
        }
    }

    async fn jobs(&self) -> anyhow::Result<Vec<BatchJob>> {
        let cwd = std::env::current_dir()?;

        if let Some(json) = &self.json {
            if self.name.is_some() {
                log::warn!("ignoring --name since using --json");
            }
            let jobs = load_batch(json, &cwd)
                .await
                .with_context(|| format!("Failed to load {}", json.display()))?;
            return Ok(jobs);
        }

        let Some(url) = &self.url else {
            bail!("invalid args: neither --url nor --json present");
        };
        Ok(vec![BatchJob {
            url: url.clone(),
            output_folder: cwd.join(&self.output),
            output_file: self
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
        }])
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let jobs = self.jobs().await?;
        let downloader = VodDownloaderBuilder::new()
            .client(self.client()?)
            .concurrency(self.threads)
            .retries(self.retries)
            .muxer(self.muxer())
            .build();

        let results = run_batch(&downloader, &jobs).await;

        let mut failed = 0;
        for (job, result) in jobs.iter().zip(results) {
            if let Err(e) = result {
                failed += 1;
                log::error!(
                    "{} -> {}: {e}",
                    job.url,
                    job.output_folder.join(&job.output_file).display()
                );
            }
        }
        if failed > 0 {
            bail!("{failed} of {} downloads failed", jobs.len());
        }

        Ok(())
    }
}

fn parse_header(header: &str) -> anyhow::Result<(HeaderName, HeaderValue)> {
    let Some((key, value)) = header.split_once(':') else {
        bail!("Invalid header: {header}");
    };
    let key = HeaderName::from_str(key.trim()).context("Invalid header name")?;
    let value = HeaderValue::from_str(value.trim()).context("Invalid header value")?;
    Ok((key, value))
}
