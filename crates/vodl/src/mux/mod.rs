mod concat;
mod ffmpeg;
mod skip;

pub use concat::ConcatMuxer;
pub use ffmpeg::FfmpegMuxer;
pub use skip::SkipMuxer;

use crate::error::VodlResult;
use std::{
    future::Future,
    path::{Path, PathBuf},
};

pub trait Muxer {
    /// Combine `inputs` into a single file at `output`.
    ///
    /// `inputs` are already in playback order and must be consumed in that
    /// order. `cwd` is the job's working directory, where intermediate files
    /// may be placed.
    fn mux(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        cwd: &Path,
    ) -> impl Future<Output = VodlResult<()>> + Send;
}

pub enum VodMuxer {
    Ffmpeg(FfmpegMuxer),
    Concat(ConcatMuxer),
    Skip(SkipMuxer),
}

impl VodMuxer {
    pub fn ffmpeg() -> Self {
        Self::Ffmpeg(FfmpegMuxer::new())
    }

    pub fn concat() -> Self {
        Self::Concat(ConcatMuxer)
    }

    pub fn skip() -> Self {
        Self::Skip(SkipMuxer)
    }
}

impl Default for VodMuxer {
    fn default() -> Self {
        Self::ffmpeg()
    }
}

impl Muxer for VodMuxer {
    async fn mux(&self, inputs: &[PathBuf], output: &Path, cwd: &Path) -> VodlResult<()> {
        match self {
            Self::Ffmpeg(muxer) => muxer.mux(inputs, output, cwd).await,
            Self::Concat(muxer) => muxer.mux(inputs, output, cwd).await,
            Self::Skip(muxer) => muxer.mux(inputs, output, cwd).await,
        }
    }
}
