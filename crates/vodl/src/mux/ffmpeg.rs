use std::{
    io::Write,
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::process::Command;

use super::Muxer;
use crate::{
    error::{VodlError, VodlResult},
    util::path::segment_prefix,
};

/// Concatenate segments with the ffmpeg CLI concat demuxer, then remux the
/// joined stream into the container implied by the output extension.
#[derive(Default)]
pub struct FfmpegMuxer {
    executable: Option<PathBuf>,
}

impl FfmpegMuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific ffmpeg binary instead of looking it up in `PATH`.
    pub fn with_executable<P>(executable: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            executable: Some(executable.into()),
        }
    }

    fn executable(&self) -> VodlResult<PathBuf> {
        match &self.executable {
            Some(executable) => Ok(executable.clone()),
            None => Ok(which::which("ffmpeg")?),
        }
    }
}

impl Muxer for FfmpegMuxer {
    async fn mux(&self, inputs: &[PathBuf], output: &Path, cwd: &Path) -> VodlResult<()> {
        if inputs.is_empty() {
            return Err(VodlError::MuxError("no segment to merge".to_string()));
        }

        let ffmpeg = self.executable()?;

        tracing::debug!("Creating concat file for {}", output.display());
        let mut list = tempfile::Builder::new()
            .prefix("concat")
            .suffix(".txt")
            .tempfile_in(cwd)?;
        for input in inputs {
            let input = std::path::absolute(input)?;
            writeln!(list, "file '{}'", escape_concat_path(&input))?;
        }
        list.flush()?;

        let is_ts_output = output
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ts"));
        let combined = if is_ts_output {
            output.to_path_buf()
        } else {
            cwd.join(format!("{}_combined.ts", segment_prefix(output)))
        };

        tracing::info!("Merging {} chunks with ffmpeg...", inputs.len());
        let mut concat = Command::new(&ffmpeg);
        concat
            .args(["-y", "-hide_banner", "-loglevel", "error"])
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(list.path())
            .args(["-c", "copy"])
            .arg(&combined);
        run(&mut concat, "concat").await?;

        if !is_ts_output {
            tracing::debug!("Remuxing {} into {}", combined.display(), output.display());
            let mut remux = Command::new(&ffmpeg);
            remux
                .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
                .arg(&combined)
                .args(["-acodec", "copy", "-vcodec", "copy"])
                .arg(output);
            run(&mut remux, "remux").await?;

            tokio::fs::remove_file(&combined).await?;
        }

        tracing::info!(
            "All finished. Please checkout your files at {}",
            output.display()
        );
        Ok(())
    }
}

async fn run(command: &mut Command, step: &str) -> VodlResult<()> {
    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VodlError::MuxError(format!(
            "ffmpeg {step} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Quote a path for a `file '...'` line of an ffmpeg concat list.
fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}
