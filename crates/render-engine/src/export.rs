//! Output sinks for finished composites.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use shotcraft_common::error::{ShotcraftError, ShotcraftResult};

use crate::scheduler::RenderedArtifact;

/// Destination for a finished composite (file, clipboard, ...).
pub trait ArtifactSink: Send + Sync {
    /// Accept the final raster.
    fn deliver(&self, artifact: &RenderedArtifact) -> ShotcraftResult<()>;

    /// Sink name for diagnostics.
    fn name(&self) -> &str;
}

/// Encode an RGBA raster as PNG with its alpha channel.
pub fn encode_png(image: &RgbaImage) -> ShotcraftResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Writes the artifact as a PNG file.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so readers never observe a partial image.
#[derive(Debug, Clone)]
pub struct PngFileSink {
    path: PathBuf,
}

impl PngFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactSink for PngFileSink {
    fn deliver(&self, artifact: &RenderedArtifact) -> ShotcraftResult<()> {
        let bytes = encode_png(&artifact.image)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| {
            ShotcraftError::sink(format!("cannot create {}: {e}", dir.display()))
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| ShotcraftError::sink(format!("cannot create temp file: {e}")))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| ShotcraftError::sink(format!("write failed: {e}")))?;
        tmp.persist(&self.path).map_err(|e| {
            ShotcraftError::sink(format!("cannot save {}: {}", self.path.display(), e.error))
        })?;

        tracing::info!(
            path = %self.path.display(),
            seq = artifact.seq,
            bytes = bytes.len(),
            "PNG written"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "png-file"
    }
}

/// Keeps the most recent artifact in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    slot: Arc<Mutex<Option<RenderedArtifact>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last delivered artifact, if any.
    pub fn contents(&self) -> Option<RenderedArtifact> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl ArtifactSink for MemorySink {
    fn deliver(&self, artifact: &RenderedArtifact) -> ShotcraftResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ShotcraftError::sink("memory sink poisoned"))?;
        *slot = Some(artifact.clone());
        tracing::debug!(seq = artifact.seq, "Artifact stored in memory");
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn artifact(seq: u64) -> RenderedArtifact {
        RenderedArtifact {
            seq,
            image: Arc::new(RgbaImage::from_pixel(6, 4, Rgba([10, 20, 30, 128]))),
        }
    }

    #[test]
    fn test_encoded_png_keeps_alpha() {
        let bytes = encode_png(&artifact(1).image).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.color().has_alpha());
        assert_eq!(decoded.to_rgba8().get_pixel(5, 3).0, [10, 20, 30, 128]);
    }

    #[test]
    fn test_file_sink_writes_png_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shot.png");
        let sink = PngFileSink::new(&path);

        sink.deliver(&artifact(3)).unwrap();

        let written = image::open(&path).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (6, 4));
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_file_sink_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"not a png").unwrap();

        PngFileSink::new(&path).deliver(&artifact(1)).unwrap();
        assert!(image::open(&path).is_ok());
    }

    #[test]
    fn test_file_sink_failure_is_a_sink_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = PngFileSink::new(blocker.join("shot.png"))
            .deliver(&artifact(1))
            .unwrap_err();
        assert!(matches!(err, ShotcraftError::Sink { .. }));
        assert!(err.is_user_visible());
    }

    #[test]
    fn test_memory_sink_keeps_latest() {
        let sink = MemorySink::new();
        assert!(sink.contents().is_none());
        sink.deliver(&artifact(1)).unwrap();
        sink.deliver(&artifact(2)).unwrap();
        assert_eq!(sink.contents().unwrap().seq, 2);
    }
}
