//! Frame providers.
//!
//! A provider owns whatever permission handshake and screen-grab API the
//! platform needs. Its only contract: given a display id, return a frozen
//! frame or fail with `CaptureUnavailable`.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use shotcraft_common::error::{ShotcraftError, ShotcraftResult};
use shotcraft_platform_core::{DisplayId, DisplayInfo};

use crate::frame::FrozenFrame;

/// Abstract interface for grabbing a display's pixels.
pub trait FrameProvider: Send + Sync {
    /// Displays this provider can capture.
    fn displays(&self) -> ShotcraftResult<Vec<DisplayInfo>>;

    /// Snapshot the given display.
    fn capture_display(&self, display_id: DisplayId) -> ShotcraftResult<FrozenFrame>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Serves a single display whose pixels come from an image file, such as a
/// screenshot taken by another tool.
pub struct ImageFileProvider {
    path: PathBuf,
    scale_factor: f64,
    chrome_height_pt: f64,
}

impl ImageFileProvider {
    pub const DISPLAY_ID: DisplayId = 1;

    pub fn new(path: impl Into<PathBuf>, scale_factor: f64, chrome_height_pt: f64) -> Self {
        Self {
            path: path.into(),
            scale_factor,
            chrome_height_pt,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }

    fn unavailable(&self, reason: impl Into<String>) -> ShotcraftError {
        ShotcraftError::capture_unavailable(self.display_name(), reason)
    }
}

impl FrameProvider for ImageFileProvider {
    fn displays(&self) -> ShotcraftResult<Vec<DisplayInfo>> {
        let (w, h) = image::image_dimensions(&self.path)
            .map_err(|e| self.unavailable(e.to_string()))?;
        Ok(vec![DisplayInfo::from_pixels(
            Self::DISPLAY_ID,
            self.display_name(),
            w,
            h,
            self.scale_factor,
        )
        .with_chrome_height(self.chrome_height_pt)])
    }

    fn capture_display(&self, display_id: DisplayId) -> ShotcraftResult<FrozenFrame> {
        if display_id != Self::DISPLAY_ID {
            return Err(self.unavailable(format!("no display with id {display_id}")));
        }
        if !self.path.exists() {
            return Err(self.unavailable(format!("{} does not exist", self.path.display())));
        }

        let image = image::open(&self.path)
            .map_err(|e| self.unavailable(e.to_string()))?
            .to_rgba8();
        tracing::info!(
            path = %self.path.display(),
            width = image.width(),
            height = image.height(),
            scale = self.scale_factor,
            "Loaded frozen frame"
        );
        Ok(FrozenFrame::new(
            image,
            display_id,
            self.scale_factor,
            self.chrome_height_pt,
        ))
    }

    fn name(&self) -> &str {
        "image-file"
    }
}

/// In-memory provider with a fixed set of displays.
#[derive(Default)]
pub struct StaticFrameProvider {
    frames: Vec<(DisplayInfo, RgbaImage)>,
    denied: bool,
}

impl StaticFrameProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display(mut self, display: DisplayInfo, image: RgbaImage) -> Self {
        self.frames.push((display, image));
        self
    }

    /// A provider whose capture permission was refused.
    pub fn denied() -> Self {
        Self {
            frames: Vec::new(),
            denied: true,
        }
    }
}

impl FrameProvider for StaticFrameProvider {
    fn displays(&self) -> ShotcraftResult<Vec<DisplayInfo>> {
        Ok(self.frames.iter().map(|(d, _)| d.clone()).collect())
    }

    fn capture_display(&self, display_id: DisplayId) -> ShotcraftResult<FrozenFrame> {
        if self.denied {
            return Err(ShotcraftError::capture_unavailable(
                display_id.to_string(),
                "screen capture permission denied",
            ));
        }
        self.frames
            .iter()
            .find(|(d, _)| d.id == display_id)
            .map(|(d, image)| FrozenFrame::for_display(image.clone(), d))
            .ok_or_else(|| {
                ShotcraftError::capture_unavailable(display_id.to_string(), "no such display")
            })
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider_returns_display_frame() {
        let display = DisplayInfo::from_pixels(7, "main", 40, 20, 2.0).with_chrome_height(12.0);
        let provider = StaticFrameProvider::new().with_display(display, RgbaImage::new(40, 20));
        let frame = provider.capture_display(7).unwrap();
        assert_eq!(frame.display_id(), 7);
        assert_eq!(frame.scale_factor(), 2.0);
        assert_eq!(frame.chrome_height_pt(), 12.0);
    }

    #[test]
    fn test_unknown_display_is_unavailable() {
        let provider = StaticFrameProvider::new();
        assert!(matches!(
            provider.capture_display(3),
            Err(ShotcraftError::CaptureUnavailable { .. })
        ));
        assert!(matches!(
            StaticFrameProvider::denied().capture_display(1),
            Err(ShotcraftError::CaptureUnavailable { .. })
        ));
    }

    #[test]
    fn test_image_file_provider_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen.png");
        RgbaImage::from_pixel(64, 32, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let provider = ImageFileProvider::new(&path, 2.0, 0.0);
        let displays = provider.displays().unwrap();
        assert_eq!(displays.len(), 1);
        assert_eq!(displays[0].width_pt, 32.0);

        let frame = provider.capture_display(ImageFileProvider::DISPLAY_ID).unwrap();
        assert_eq!(frame.pixel_size(), (64, 32));
        assert_eq!(frame.image().get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_image_file_provider_missing_file() {
        let provider = ImageFileProvider::new("/nonexistent/screen.png", 1.0, 0.0);
        assert!(matches!(
            provider.capture_display(ImageFileProvider::DISPLAY_ID),
            Err(ShotcraftError::CaptureUnavailable { .. })
        ));
    }
}
