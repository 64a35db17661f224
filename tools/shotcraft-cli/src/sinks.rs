//! Terminal-side sinks and cues.

use std::borrow::Cow;
use std::io::Write;

use shotcraft_capture_engine::FailureCue;
use shotcraft_common::error::{ShotcraftError, ShotcraftResult};
use shotcraft_render_engine::{ArtifactSink, RenderedArtifact};

/// Copies the artifact to the system clipboard.
pub struct ClipboardSink;

impl ArtifactSink for ClipboardSink {
    fn deliver(&self, artifact: &RenderedArtifact) -> ShotcraftResult<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ShotcraftError::sink(format!("clipboard unavailable: {e}")))?;
        clipboard
            .set_image(arboard::ImageData {
                width: artifact.image.width() as usize,
                height: artifact.image.height() as usize,
                bytes: Cow::Borrowed(artifact.image.as_raw()),
            })
            .map_err(|e| ShotcraftError::sink(format!("clipboard write failed: {e}")))?;
        tracing::info!(seq = artifact.seq, "Copied to clipboard");
        Ok(())
    }

    fn name(&self) -> &str {
        "clipboard"
    }
}

/// Rings the terminal bell and logs the failure.
pub struct TerminalBellCue;

impl FailureCue for TerminalBellCue {
    fn signal(&self, error: &ShotcraftError) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
        tracing::warn!(error = %error, "Capture failed");
    }
}
