//! Shotcraft Input Tracker
//!
//! Turns a stream of pointer samples into a region selection. Uses a
//! pluggable source so the same state machine serves every front end:
//!
//! - **Toolkit adapters:** translate native mouse/key events (outside this crate)
//! - **Scripted:** in-memory sample lists for tests and demos
//! - **JSONL:** replay of a recorded drag
//!
//! Sessions can optionally record their samples as JSONL.

pub mod backends;
pub mod tracker;
pub mod writer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shotcraft_common::clock::SessionClock;
use shotcraft_common::error::ShotcraftResult;
use shotcraft_model::event::PointerSample;

/// Consecutive poll failures after which the selection is abandoned.
pub const MAX_CONSECUTIVE_POLL_ERRORS: u32 = 8;

/// Pause between polls while the source has nothing to report.
const IDLE_POLL_INTERVAL: tokio::time::Duration = tokio::time::Duration::from_millis(1);

pub use tracker::{Selection, SelectionOutcome, SelectionState, SelectionTracker};
pub use writer::{SampleStreamHeader, SampleWriter};

/// Trait for pointer input sources.
pub trait InputSource: Send {
    /// Poll for the next sample. Returns `None` if no sample is available.
    fn poll(&mut self) -> ShotcraftResult<Option<PointerSample>>;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// True once the source will never produce another sample.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Drives a [`SelectionTracker`] from an [`InputSource`] until the
/// selection reaches a terminal state.
pub struct SelectionSession {
    source: Box<dyn InputSource>,
    tracker: SelectionTracker,
    recorder: Option<SampleWriter>,
    clock: SessionClock,
    stop_flag: Arc<AtomicBool>,
    samples_seen: u64,
}

impl SelectionSession {
    pub fn new(source: Box<dyn InputSource>, tracker: SelectionTracker) -> Self {
        Self {
            source,
            tracker,
            recorder: None,
            clock: SessionClock::start(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            samples_seen: 0,
        }
    }

    /// Record every consumed sample.
    pub fn with_recorder(mut self, recorder: SampleWriter) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Feed samples until the tracker commits or cancels.
    ///
    /// A source that runs dry mid-drag, a raised stop flag, or a source that
    /// keeps failing cancels the selection.
    pub async fn run(&mut self) -> ShotcraftResult<SelectionOutcome> {
        tracing::info!(source = %self.source.name(), "Selection session started");

        let mut poll_errors = 0u32;
        let outcome = loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                break self.finish_cancelled("stopped");
            }

            match self.source.poll() {
                Ok(Some(sample)) => {
                    poll_errors = 0;
                    self.samples_seen += 1;
                    if let Some(recorder) = self.recorder.as_mut() {
                        recorder.write_sample(&sample)?;
                    }
                    if let Some(outcome) = self.tracker.handle(&sample) {
                        break outcome;
                    }
                }
                Ok(None) if self.source.is_finished() => {
                    break self.finish_cancelled("input exhausted");
                }
                Ok(None) => {
                    poll_errors = 0;
                    tokio::time::sleep(IDLE_POLL_INTERVAL).await;
                }
                Err(e) => {
                    poll_errors += 1;
                    tracing::warn!(error = %e, attempt = poll_errors, "Input source error");
                    if poll_errors >= MAX_CONSECUTIVE_POLL_ERRORS {
                        break self.finish_cancelled("input source keeps failing");
                    }
                    tokio::time::sleep(IDLE_POLL_INTERVAL).await;
                }
            }
        };

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.flush()?;
        }
        tracing::info!(
            samples = self.samples_seen,
            elapsed_ms = self.clock.elapsed_ms(),
            outcome = ?outcome,
            "Selection session finished"
        );
        Ok(outcome)
    }

    fn finish_cancelled(&mut self, reason: &str) -> SelectionOutcome {
        tracing::debug!(reason, "Cancelling selection");
        self.tracker.cancel();
        SelectionOutcome::Cancelled
    }

    /// Set the stop flag (the cancel key from outside the sample stream).
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    /// Number of samples consumed so far.
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ScriptedInput;
    use shotcraft_model::event::straight_drag;
    use shotcraft_model::geometry::{Point, Rect};

    /// Fails every poll, or only the first `failures` polls before
    /// delegating to `then`.
    struct FlakySource {
        failures: u32,
        polls: u32,
        then: ScriptedInput,
    }

    impl InputSource for FlakySource {
        fn poll(&mut self) -> ShotcraftResult<Option<PointerSample>> {
            self.polls += 1;
            if self.polls <= self.failures {
                return Err(shotcraft_common::error::ShotcraftError::input("device lost"));
            }
            self.then.poll()
        }

        fn name(&self) -> &str {
            "flaky"
        }

        fn is_finished(&self) -> bool {
            self.polls > self.failures && self.then.is_finished()
        }
    }

    fn view() -> SelectionTracker {
        SelectionTracker::new(Rect::new(0.0, 0.0, 500.0, 500.0), true)
    }

    #[tokio::test]
    async fn test_session_commits_scripted_drag() {
        let samples = straight_drag(Point::new(10.0, 10.0), Point::new(110.0, 160.0), 4, 8_000_000);
        let mut session = SelectionSession::new(Box::new(ScriptedInput::new(samples)), view());
        let outcome = session.run().await.unwrap();
        assert_eq!(
            outcome,
            SelectionOutcome::Committed(Rect::new(10.0, 10.0, 100.0, 150.0))
        );
        assert_eq!(session.samples_seen(), 7);
    }

    #[tokio::test]
    async fn test_exhausted_source_cancels() {
        let samples = vec![
            PointerSample::down(0, 10.0, 10.0),
            PointerSample::drag(1, 50.0, 50.0),
        ];
        let mut session = SelectionSession::new(Box::new(ScriptedInput::new(samples)), view());
        assert_eq!(session.run().await.unwrap(), SelectionOutcome::Cancelled);
        assert_eq!(session.tracker().state(), SelectionState::Cancelled);
    }

    #[tokio::test]
    async fn test_stop_flag_cancels() {
        let mut session = SelectionSession::new(Box::new(ScriptedInput::empty()), view());
        session.stop();
        assert_eq!(session.run().await.unwrap(), SelectionOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_session_records_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        let header = SampleStreamHeader {
            schema_version: "1.0".to_string(),
            epoch_wall: "2026-01-01T00:00:00Z".to_string(),
            view_width: 500.0,
            view_height: 500.0,
            window_flipped: true,
        };
        let samples = straight_drag(Point::new(0.0, 0.0), Point::new(40.0, 40.0), 1, 1_000);
        let mut session = SelectionSession::new(Box::new(ScriptedInput::new(samples)), view())
            .with_recorder(SampleWriter::new(&path, &header).unwrap());
        session.run().await.unwrap();

        let replay = backends::ScriptedInput::from_jsonl_file(&path).unwrap();
        assert_eq!(replay.remaining(), 4);
    }

    #[tokio::test]
    async fn test_failing_source_cancels_instead_of_spinning() {
        let source = FlakySource {
            failures: u32::MAX,
            polls: 0,
            then: ScriptedInput::empty(),
        };
        let mut session = SelectionSession::new(Box::new(source), view());
        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), session.run())
            .await
            .expect("session should give up on a failing source")
            .unwrap();
        assert_eq!(outcome, SelectionOutcome::Cancelled);
        assert_eq!(session.tracker().state(), SelectionState::Cancelled);
        assert_eq!(session.samples_seen(), 0);
    }

    #[tokio::test]
    async fn test_transient_poll_errors_are_tolerated() {
        let samples = straight_drag(Point::new(10.0, 10.0), Point::new(60.0, 60.0), 2, 1_000);
        let source = FlakySource {
            failures: MAX_CONSECUTIVE_POLL_ERRORS - 1,
            polls: 0,
            then: ScriptedInput::new(samples),
        };
        let mut session = SelectionSession::new(Box::new(source), view());
        assert_eq!(
            session.run().await.unwrap(),
            SelectionOutcome::Committed(Rect::new(10.0, 10.0, 50.0, 50.0))
        );
    }
}
