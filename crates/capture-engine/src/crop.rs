//! Pixel-exact cropping of a committed selection.
//!
//! This is the only place the floor/ceil rounding policy is applied before
//! samples are extracted.

use image::RgbaImage;
use shotcraft_common::config::CaptureDefaults;
use shotcraft_model::geometry::{PixelRect, Rect};
use shotcraft_model::mapper;

use crate::frame::FrozenFrame;

/// Maps view-space selections onto a frame's raster and extracts them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cropper {
    /// Fraction of the chrome height the selection is shifted down by.
    pub chrome_correction: f64,
    /// Crops narrower or shorter than this many pixels are rejected.
    pub min_selection_px: i64,
}

impl Default for Cropper {
    fn default() -> Self {
        Self::from_config(&CaptureDefaults::default())
    }
}

impl Cropper {
    pub fn from_config(config: &CaptureDefaults) -> Self {
        Self {
            chrome_correction: config.chrome_correction,
            min_selection_px: config.min_selection_px.max(1.0).ceil() as i64,
        }
    }

    /// Pixel rectangle a view-space selection covers, clipped to the frame.
    ///
    /// `None` when the clipped rectangle is empty or below the minimum size.
    /// The selection is clipped to the view before scaling, so arbitrarily
    /// large selections map onto at most the whole frame.
    pub fn crop_rect(&self, frame: &FrozenFrame, view_rect: Rect) -> Option<PixelRect> {
        if !is_finite(&view_rect) {
            tracing::debug!(?view_rect, "Ignoring non-finite selection");
            return None;
        }
        let view_size = frame.view_size();
        let shifted = mapper::apply_chrome_offset(
            view_rect,
            frame.chrome_height_pt(),
            view_size.height,
            self.chrome_correction,
        );
        let visible = shifted.intersection(&Rect::from_size(view_size));
        let (w, h) = frame.pixel_size();
        let mapped = mapper::view_to_pixel(visible, view_size, (w, h));
        let clipped = mapped.intersection(&PixelRect::bounds(w, h))?;

        if clipped.width < self.min_selection_px || clipped.height < self.min_selection_px {
            tracing::debug!(
                width = clipped.width,
                height = clipped.height,
                "Crop below minimum size"
            );
            return None;
        }

        tracing::debug!(
            view_x = view_rect.x,
            view_y = view_rect.y,
            px = clipped.x,
            py = clipped.y,
            pw = clipped.width,
            ph = clipped.height,
            "Mapped selection to pixels"
        );
        Some(clipped)
    }

    /// Extract the selected region as a new raster.
    pub fn crop(&self, frame: &FrozenFrame, view_rect: Rect) -> Option<RgbaImage> {
        self.crop_rect(frame, view_rect)
            .map(|r| Self::extract(frame, r))
    }

    /// Copy out a rectangle previously returned by [`Cropper::crop_rect`].
    pub fn extract(frame: &FrozenFrame, rect: PixelRect) -> RgbaImage {
        let (w, h) = frame.pixel_size();
        let Some(r) = rect.intersection(&PixelRect::bounds(w, h)) else {
            return RgbaImage::new(0, 0);
        };
        image::imageops::crop_imm(
            frame.image(),
            r.x as u32,
            r.y as u32,
            r.width as u32,
            r.height as u32,
        )
        .to_image()
    }
}

fn is_finite(r: &Rect) -> bool {
    [r.x, r.y, r.width, r.height].iter().all(|v| v.is_finite())
}
