use std::path::{Path, PathBuf};

use super::Muxer;
use crate::error::VodlResult;

/// Leaves downloaded segments untouched.
#[derive(Default)]
pub struct SkipMuxer;

impl Muxer for SkipMuxer {
    async fn mux(&self, inputs: &[PathBuf], _output: &Path, cwd: &Path) -> VodlResult<()> {
        tracing::info!("Skip merging. Please merge video chunks manually.");
        tracing::info!(
            "{} segment files are located at {}",
            inputs.len(),
            cwd.display()
        );
        Ok(())
    }
}
