use std::path::{Path, PathBuf};

use super::Muxer;
use crate::error::VodlResult;
use tokio::{fs::File, io::AsyncWriteExt};

/// Concat all segments byte by byte into the output file.
///
/// MPEG-TS segments can be joined this way without any external tool, so this
/// works whenever the output is a `.ts` file.
#[derive(Default)]
pub struct ConcatMuxer;

impl Muxer for ConcatMuxer {
    async fn mux(&self, inputs: &[PathBuf], output: &Path, _cwd: &Path) -> VodlResult<()> {
        tracing::info!("Merging chunks...");

        let mut output_file = File::create(output).await?;
        for input in inputs {
            let mut file = File::open(input).await?;
            tokio::io::copy(&mut file, &mut output_file).await?;
        }
        output_file.flush().await?;

        tracing::info!(
            "All finished. Please checkout your files at {}",
            output.display()
        );
        Ok(())
    }
}
