//! Pointer sample recorder.
//!
//! Writes the samples of a selection session as JSONL so the drag can be
//! replayed later through `ScriptedInput::from_jsonl_file`.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shotcraft_common::error::{ShotcraftError, ShotcraftResult};
use shotcraft_model::event::PointerSample;

/// Metadata written as the first (comment) line of a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStreamHeader {
    pub schema_version: String,
    /// Wall-clock time the session started (RFC 3339).
    pub epoch_wall: String,
    /// Size of the selection view in points.
    pub view_width: f64,
    pub view_height: f64,
    pub window_flipped: bool,
}

/// Writes samples to a JSONL file.
pub struct SampleWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    samples_written: u64,
}

impl SampleWriter {
    /// Create the file (truncating any previous recording) and write the
    /// header line.
    pub fn new(path: &Path, header: &SampleStreamHeader) -> ShotcraftResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);

        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| ShotcraftError::input(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            samples_written: 0,
        })
    }

    pub fn write_sample(&mut self, sample: &PointerSample) -> ShotcraftResult<()> {
        let json = serde_json::to_string(sample)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| ShotcraftError::input(format!("Failed to write sample: {e}")))?;
        self.samples_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> ShotcraftResult<()> {
        self.writer
            .flush()
            .map_err(|e| ShotcraftError::input(format!("Failed to flush samples: {e}")))
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SampleWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotcraft_model::event::parse_samples;

    #[test]
    fn test_sample_writer_output_replays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("drag.jsonl");
        let header = SampleStreamHeader {
            schema_version: "1.0".to_string(),
            epoch_wall: "2026-01-01T00:00:00Z".to_string(),
            view_width: 500.0,
            view_height: 500.0,
            window_flipped: true,
        };

        {
            let mut writer = SampleWriter::new(&path, &header).unwrap();
            writer.write_sample(&PointerSample::down(0, 10.0, 10.0)).unwrap();
            writer
                .write_sample(&PointerSample::drag(8_000_000, 60.0, 80.0))
                .unwrap();
            writer
                .write_sample(&PointerSample::up(16_000_000, 110.0, 160.0))
                .unwrap();
            assert_eq!(writer.samples_written(), 3);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let first = content.lines().next().unwrap();
        assert!(first.starts_with("# "));
        let parsed: SampleStreamHeader = serde_json::from_str(&first[2..]).unwrap();
        assert_eq!(parsed, header);

        let samples = parse_samples(&content).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[2], PointerSample::up(16_000_000, 110.0, 160.0));
    }
}
