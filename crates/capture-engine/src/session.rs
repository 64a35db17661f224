//! Capture session management.
//!
//! One session = one frozen frame, one selection, at most one crop. The frame
//! is dropped when the session ends.

use image::RgbaImage;
use shotcraft_common::clock::SessionClock;
use shotcraft_common::config::CaptureDefaults;
use shotcraft_common::error::{ShotcraftError, ShotcraftResult};
use shotcraft_input_tracker::{InputSource, SelectionOutcome, SelectionSession, SelectionTracker};
use shotcraft_input_tracker::writer::SampleWriter;
use shotcraft_model::geometry::{PixelRect, Point, Rect};
use shotcraft_platform_core::{display_at, DisplayId};

use crate::crop::Cropper;
use crate::frame::FrozenFrame;
use crate::provider::FrameProvider;

/// Signals a user-visible failure without interrupting anything.
pub trait FailureCue: Send + Sync {
    fn signal(&self, error: &ShotcraftError);
}

/// Cue that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCue;

impl FailureCue for LogCue {
    fn signal(&self, error: &ShotcraftError) {
        tracing::warn!(error = %error, "Capture failed");
    }
}

/// Result of a successful selection.
#[derive(Debug, Clone)]
pub struct CapturedRegion {
    /// Cropped pixels.
    pub image: RgbaImage,
    /// Committed selection in view space.
    pub view_rect: Rect,
    /// Region of the frame that was extracted.
    pub pixel_rect: PixelRect,
    pub display_id: DisplayId,
    pub scale_factor: f64,
}

/// How a capture session ended. None of these are errors.
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    Captured(CapturedRegion),
    /// The user pressed the cancel key (or input ended mid-drag).
    Cancelled,
    /// The drag was too small or missed the frame.
    Degenerate,
}

impl CaptureOutcome {
    pub fn region(&self) -> Option<&CapturedRegion> {
        match self {
            CaptureOutcome::Captured(region) => Some(region),
            _ => None,
        }
    }
}

/// Configuration for a capture session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub display_id: DisplayId,
    pub capture: CaptureDefaults,
    /// Whether the overlay window reports Y growing downward.
    pub window_flipped: bool,
}

impl SessionConfig {
    pub fn new(display_id: DisplayId, capture: CaptureDefaults) -> Self {
        Self {
            display_id,
            capture,
            window_flipped: true,
        }
    }

    /// Session on the display under `pointer` (global points), falling back
    /// to the primary display when the pointer is off every screen.
    pub fn for_pointer(
        pointer: Point,
        provider: &dyn FrameProvider,
        capture: CaptureDefaults,
    ) -> ShotcraftResult<Self> {
        let displays = provider.displays()?;
        let display = display_at(pointer, &displays).ok_or_else(|| {
            ShotcraftError::capture_unavailable("any", "no display connected")
        })?;
        let (display_id, display_name) = (display.id, &display.name);
        tracing::debug!(
            display_id = display_id,
            name = %display_name,
            x = pointer.x,
            y = pointer.y,
            "Display under pointer"
        );
        Ok(Self::new(display.id, capture))
    }
}

/// Freezes a display, runs the selection, and crops the result.
pub struct CaptureSession<'a> {
    config: SessionConfig,
    provider: &'a dyn FrameProvider,
    cue: &'a dyn FailureCue,
    recorder: Option<SampleWriter>,
}

impl<'a> CaptureSession<'a> {
    pub fn new(
        config: SessionConfig,
        provider: &'a dyn FrameProvider,
        cue: &'a dyn FailureCue,
    ) -> Self {
        Self {
            config,
            provider,
            cue,
            recorder: None,
        }
    }

    /// Record the selection's pointer samples.
    pub fn with_recorder(mut self, recorder: SampleWriter) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Grab the frame. A failure is signaled through the cue and returned.
    pub fn freeze(&self) -> ShotcraftResult<FrozenFrame> {
        match self.provider.capture_display(self.config.display_id) {
            Ok(frame) => Ok(frame),
            Err(e) => {
                let e = match e {
                    e @ ShotcraftError::CaptureUnavailable { .. } => e,
                    other => ShotcraftError::capture_unavailable(
                        self.config.display_id.to_string(),
                        other.to_string(),
                    ),
                };
                self.cue.signal(&e);
                Err(e)
            }
        }
    }

    /// Run the whole session.
    ///
    /// Only `CaptureUnavailable` is returned as an error; cancellation and
    /// degenerate selections are ordinary outcomes.
    pub async fn run(self, input: Box<dyn InputSource>) -> ShotcraftResult<CaptureOutcome> {
        let clock = SessionClock::start();
        tracing::info!(
            provider = %self.provider.name(),
            display = self.config.display_id,
            "Starting capture session"
        );

        let frame = self.freeze()?;
        let outcome = self.select_and_crop(&frame, input).await?;

        tracing::info!(
            elapsed_ms = clock.elapsed_ms(),
            captured = outcome.region().is_some(),
            "Capture session finished"
        );
        Ok(outcome)
    }

    /// Selection and crop against an already frozen frame.
    pub async fn select_and_crop(
        self,
        frame: &FrozenFrame,
        input: Box<dyn InputSource>,
    ) -> ShotcraftResult<CaptureOutcome> {
        let view = Rect::from_size(frame.view_size());
        let tracker = SelectionTracker::new(view, self.config.window_flipped)
            .with_min_size(self.config.capture.min_selection_px);
        let mut selection = SelectionSession::new(input, tracker);
        if let Some(recorder) = self.recorder {
            selection = selection.with_recorder(recorder);
        }

        let view_rect = match selection.run().await? {
            SelectionOutcome::Committed(rect) => rect,
            SelectionOutcome::Cancelled => return Ok(CaptureOutcome::Cancelled),
            SelectionOutcome::Degenerate => return Ok(CaptureOutcome::Degenerate),
        };

        let cropper = Cropper::from_config(&self.config.capture);
        let Some(pixel_rect) = cropper.crop_rect(frame, view_rect) else {
            tracing::debug!(error = %ShotcraftError::CropOutOfBounds, "Discarding selection");
            return Ok(CaptureOutcome::Degenerate);
        };
        let image = Cropper::extract(frame, pixel_rect);

        tracing::info!(
            width = image.width(),
            height = image.height(),
            "Region captured"
        );
        Ok(CaptureOutcome::Captured(CapturedRegion {
            image,
            view_rect,
            pixel_rect,
            display_id: frame.display_id(),
            scale_factor: frame.scale_factor(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticFrameProvider;
    use shotcraft_input_tracker::backends::ScriptedInput;
    use shotcraft_model::event::{straight_drag, PointerSample};
    use shotcraft_platform_core::DisplayInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCue(AtomicUsize);

    impl FailureCue for CountingCue {
        fn signal(&self, _error: &ShotcraftError) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn provider() -> StaticFrameProvider {
        StaticFrameProvider::new().with_display(
            DisplayInfo::from_pixels(1, "main", 200, 200, 1.0),
            RgbaImage::new(200, 200),
        )
    }

    fn config() -> SessionConfig {
        SessionConfig::new(1, CaptureDefaults::default())
    }

    #[test]
    fn test_config_for_pointer_picks_display_under_it() {
        let left = DisplayInfo {
            primary: false,
            ..DisplayInfo::from_pixels(2, "left", 100, 100, 1.0).with_origin(-100.0, 0.0)
        };
        let provider = provider().with_display(left, RgbaImage::new(100, 100));
        let display_for = |x, y| {
            SessionConfig::for_pointer(Point::new(x, y), &provider, CaptureDefaults::default())
                .map(|c| c.display_id)
        };

        assert_eq!(display_for(-50.0, 10.0).unwrap(), 2);
        assert_eq!(display_for(50.0, 10.0).unwrap(), 1);
        assert_eq!(display_for(5000.0, 5000.0).unwrap(), 1);

        let none = StaticFrameProvider::new();
        let err = SessionConfig::for_pointer(Point::ZERO, &none, CaptureDefaults::default());
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_session_captures_region() {
        let provider = provider();
        let cue = CountingCue::default();
        let input = ScriptedInput::new(straight_drag(
            Point::new(20.0, 30.0),
            Point::new(70.0, 90.0),
            2,
            1_000,
        ));
        let outcome = CaptureSession::new(config(), &provider, &cue)
            .run(Box::new(input))
            .await
            .unwrap();
        let region = outcome.region().unwrap();
        assert_eq!(region.pixel_rect, PixelRect::new(20, 30, 50, 60));
        assert_eq!(region.image.dimensions(), (50, 60));
        assert_eq!(cue.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_escape_is_a_silent_cancel() {
        let provider = provider();
        let cue = CountingCue::default();
        let input = ScriptedInput::new(vec![
            PointerSample::down(0, 10.0, 10.0),
            PointerSample::drag(1, 80.0, 80.0),
            PointerSample::cancel(2),
        ]);
        let outcome = CaptureSession::new(config(), &provider, &cue)
            .run(Box::new(input))
            .await
            .unwrap();
        assert!(matches!(outcome, CaptureOutcome::Cancelled));
        assert_eq!(cue.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_click_without_drag_is_degenerate() {
        let provider = provider();
        let cue = CountingCue::default();
        let input = ScriptedInput::new(vec![
            PointerSample::down(0, 10.0, 10.0),
            PointerSample::up(1, 11.0, 10.5),
        ]);
        let outcome = CaptureSession::new(config(), &provider, &cue)
            .run(Box::new(input))
            .await
            .unwrap();
        assert!(matches!(outcome, CaptureOutcome::Degenerate));
    }

    #[tokio::test]
    async fn test_unavailable_capture_signals_cue() {
        let provider = StaticFrameProvider::denied();
        let cue = CountingCue::default();
        let result = CaptureSession::new(config(), &provider, &cue)
            .run(Box::new(ScriptedInput::empty()))
            .await;
        assert!(matches!(
            result,
            Err(ShotcraftError::CaptureUnavailable { .. })
        ));
        assert_eq!(cue.0.load(Ordering::SeqCst), 1);
    }
}
