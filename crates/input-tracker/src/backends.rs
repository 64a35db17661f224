//! Input source implementations.
//!
//! The interactive overlay lives outside this crate; it adapts native
//! toolkit events into [`PointerSample`]s. The sources here replay samples
//! from memory or from a recorded JSONL file.

use std::collections::VecDeque;
use std::path::Path;

use shotcraft_common::error::{ShotcraftError, ShotcraftResult};
use shotcraft_model::event::{parse_samples, PointerSample};
use shotcraft_model::mapper;
use shotcraft_platform_core::DisplayInfo;

use crate::InputSource;

/// Replays a fixed list of samples, then reports itself finished.
pub struct ScriptedInput {
    samples: VecDeque<PointerSample>,
    label: String,
}

impl ScriptedInput {
    pub fn new(samples: Vec<PointerSample>) -> Self {
        Self {
            samples: samples.into(),
            label: "scripted".to_string(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Samples recorded in global desktop points, translated into the
    /// window-space of `display`.
    pub fn from_global(samples: Vec<PointerSample>, display: &DisplayInfo) -> Self {
        let origin = display.origin();
        let translated = samples
            .into_iter()
            .map(|mut sample| {
                let p = mapper::global_to_window(sample.position(), origin);
                sample.x = p.x;
                sample.y = p.y;
                sample
            })
            .collect();
        Self::new(translated)
    }

    /// Load samples from a JSONL file (`#` lines are ignored).
    pub fn from_jsonl_file(path: &Path) -> ShotcraftResult<Self> {
        if !path.exists() {
            return Err(ShotcraftError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let samples = parse_samples(&content).map_err(|e| {
            ShotcraftError::input(format!("Invalid sample file {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), samples = samples.len(), "Loaded pointer samples");
        Ok(Self {
            samples: samples.into(),
            label: format!("jsonl:{}", path.display()),
        })
    }

    /// Next sample to be delivered, without consuming it.
    pub fn peek(&self) -> Option<&PointerSample> {
        self.samples.front()
    }

    /// Samples not yet delivered.
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> ShotcraftResult<Option<PointerSample>> {
        Ok(self.samples.pop_front())
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn is_finished(&self) -> bool {
        self.samples.is_empty()
    }
}
