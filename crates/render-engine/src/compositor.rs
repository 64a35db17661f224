//! Styled composition: background, shadow, rounded subject.
//!
//! Layers, bottom to top:
//!
//! ```text
//! canvas (subject + 2 × padding)
//!   ├── background   solid | gradient | aspect-filled image
//!   ├── shadow       blurred, offset, alpha-scaled silhouette (optional)
//!   └── subject      clipped by the rounded-corner mask, at (padding, padding)
//! ```

use std::sync::Arc;

use image::RgbaImage;
use shotcraft_common::error::{ShotcraftError, ShotcraftResult};
use shotcraft_model::style::{ShadowOptions, StyleOptions};

use crate::background::{paint_background, ImageCache};
use crate::blur::{blur_plane_q16, gaussian_kernel_q16, kernel_radius, sigma_for_radius};
use crate::mask::apply_rounded_mask;
use crate::raster::{mul_div255_u8, PremulBuffer};

/// Largest canvas, in pixels, the engine will allocate.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Anything that turns a subject and a style into a finished raster.
pub trait Composer: Send + Sync {
    /// Must never fail; on error the subject is returned unchanged.
    fn compose(&self, subject: &RgbaImage, style: &StyleOptions) -> RgbaImage;
}

/// The deterministic CPU compositor.
///
/// Clones share the decoded background image.
#[derive(Debug, Clone)]
pub struct CompositionEngine {
    max_canvas_pixels: u64,
    images: Arc<ImageCache>,
}

impl Default for CompositionEngine {
    fn default() -> Self {
        Self {
            max_canvas_pixels: MAX_CANVAS_PIXELS,
            images: Arc::default(),
        }
    }
}

impl CompositionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_canvas_pixels(mut self, max: u64) -> Self {
        self.max_canvas_pixels = max;
        self
    }

    /// Compose, reporting failures instead of falling back.
    pub fn try_compose(
        &self,
        subject: &RgbaImage,
        style: &StyleOptions,
    ) -> ShotcraftResult<RgbaImage> {
        let (sw, sh) = subject.dimensions();
        if sw == 0 || sh == 0 {
            return Err(ShotcraftError::composition("subject is empty"));
        }
        let (cw, ch) = style
            .canvas_size(sw, sh)
            .ok_or_else(|| ShotcraftError::composition("canvas size overflows"))?;
        if cw as u64 * ch as u64 > self.max_canvas_pixels {
            return Err(ShotcraftError::composition(format!(
                "canvas {cw}x{ch} exceeds {} pixels",
                self.max_canvas_pixels
            )));
        }

        let pad = style.effective_padding();
        let radius = style.effective_corner_radius(sw, sh);

        let mut canvas = PremulBuffer::try_new(cw, ch)?;
        paint_background(&mut canvas, &style.background, &self.images);

        let mut masked = PremulBuffer::from_straight(sw, sh, subject.as_raw())?;
        apply_rounded_mask(&mut masked.data, sw, sh, radius);

        if style.shadow.enabled {
            draw_shadow(&mut canvas, &masked, pad, &style.shadow)?;
        }
        canvas.over_at(&masked, pad as i64, pad as i64);

        RgbaImage::from_raw(cw, ch, canvas.into_straight())
            .ok_or_else(|| ShotcraftError::composition("canvas buffer size mismatch"))
    }
}

impl Composer for CompositionEngine {
    fn compose(&self, subject: &RgbaImage, style: &StyleOptions) -> RgbaImage {
        match self.try_compose(subject, style) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    width = subject.width(),
                    height = subject.height(),
                    "Composition failed; using subject as-is"
                );
                subject.clone()
            }
        }
    }
}

/// Blurred black silhouette of the masked subject's alpha, offset down by
/// `offset_y`, composited onto the canvas.
fn draw_shadow(
    canvas: &mut PremulBuffer,
    masked: &PremulBuffer,
    pad: u32,
    shadow: &ShadowOptions,
) -> ShotcraftResult<()> {
    let opacity = (shadow.effective_opacity() * 255.0).round() as u16;
    if opacity == 0 {
        return Ok(());
    }

    let (cw, ch) = (canvas.width, canvas.height);
    // Past one canvas height the silhouette is off-canvas either way.
    let offset = if shadow.offset_y.is_finite() {
        shadow.offset_y.round().clamp(-(ch as f64), ch as f64) as i64
    } else {
        0
    };
    let sigma = sigma_for_radius(shadow.effective_blur_radius());
    let radius = kernel_radius(sigma);

    let mut plane = Vec::new();
    plane
        .try_reserve_exact(cw as usize * ch as usize)
        .map_err(|e| ShotcraftError::composition(format!("cannot allocate shadow plane: {e}")))?;
    plane.resize(cw as usize * ch as usize, 0u8);

    // Silhouette placement, clipped to the canvas.
    let left = pad as i64;
    let top = pad as i64 + offset;
    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = (left + masked.width as i64).min(cw as i64);
    let y1 = (top + masked.height as i64).min(ch as i64);
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }
    for y in y0..y1 {
        let src_row = (y - top) as usize * masked.width as usize;
        let dst_row = y as usize * cw as usize;
        for x in x0..x1 {
            let a = masked.data[(src_row + (x - left) as usize) * 4 + 3];
            plane[dst_row + x as usize] = a;
        }
    }

    // Blur only where the shadow can reach.
    let r = radius as i64;
    let bx0 = (x0 - r).max(0);
    let by0 = (y0 - r).max(0);
    let bx1 = (x1 + r).min(cw as i64);
    let by1 = (y1 + r).min(ch as i64);
    let kernel = gaussian_kernel_q16(radius, sigma);
    blur_plane_q16(
        &mut plane,
        cw,
        ch,
        (bx0 as u32, by0 as u32, (bx1 - bx0) as u32, (by1 - by0) as u32),
        &kernel,
    );

    for y in by0..by1 {
        let row = y as usize * cw as usize;
        for x in bx0..bx1 {
            let a = mul_div255_u8(plane[row + x as usize] as u16, opacity);
            if a == 0 {
                continue;
            }
            // Black premultiplied source: only the destination is attenuated.
            let i = (row + x as usize) * 4;
            let inv = 255 - a as u16;
            let px = &mut canvas.data[i..i + 4];
            px[0] = mul_div255_u8(px[0] as u16, inv);
            px[1] = mul_div255_u8(px[1] as u16, inv);
            px[2] = mul_div255_u8(px[2] as u16, inv);
            px[3] = a.saturating_add(mul_div255_u8(px[3] as u16, inv));
        }
    }

    tracing::trace!(sigma, radius, offset, "Shadow drawn");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use shotcraft_model::style::{BackgroundSpec, Color};

    fn subject(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([200, 40, 40, 255]))
    }

    fn flat_style() -> StyleOptions {
        StyleOptions {
            padding: 10.0,
            corner_radius: 0.0,
            background: BackgroundSpec::Solid {
                color: Color::WHITE,
            },
            shadow: ShadowOptions::DISABLED,
        }
    }

    #[test]
    fn test_canvas_adds_padding_and_places_subject() {
        let out = CompositionEngine::new().compose(&subject(30, 20), &flat_style());
        assert_eq!(out.dimensions(), (50, 40));
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(10, 10).0, [200, 40, 40, 255]);
        assert_eq!(out.get_pixel(39, 29).0, [200, 40, 40, 255]);
        assert_eq!(out.get_pixel(40, 30).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_rounded_corner_shows_background() {
        let style = StyleOptions {
            corner_radius: 8.0,
            ..flat_style()
        };
        let out = CompositionEngine::new().compose(&subject(30, 20), &style);
        assert_eq!(out.get_pixel(10, 10).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(25, 20).0, [200, 40, 40, 255]);
    }

    #[test]
    fn test_disabled_shadow_leaves_background_untouched() {
        let out = CompositionEngine::new().compose(&subject(30, 20), &flat_style());
        assert_eq!(out.get_pixel(25, 32).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_enabled_shadow_darkens_below_subject() {
        let style = StyleOptions {
            shadow: ShadowOptions {
                enabled: true,
                opacity: 0.5,
                blur_radius: 4.0,
                offset_y: 4.0,
            },
            ..flat_style()
        };
        let out = CompositionEngine::new().compose(&subject(30, 20), &style);
        let below = out.get_pixel(25, 31).0;
        assert!(below[0] < 255, "expected shadow, got {below:?}");
        assert_eq!(below[3], 255);
        // The top edge is further from the offset silhouette.
        assert!(out.get_pixel(25, 8).0[0] > below[0]);
    }

    #[test]
    fn test_zero_opacity_shadow_is_invisible() {
        let style = StyleOptions {
            shadow: ShadowOptions {
                enabled: true,
                opacity: 0.0,
                blur_radius: 10.0,
                offset_y: 0.0,
            },
            ..flat_style()
        };
        let out = CompositionEngine::new().compose(&subject(30, 20), &style);
        assert_eq!(out.get_pixel(25, 32).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_empty_subject_is_returned_unchanged() {
        let empty = RgbaImage::new(0, 0);
        let out = CompositionEngine::new().compose(&empty, &StyleOptions::default());
        assert_eq!(out.dimensions(), (0, 0));
    }

    #[test]
    fn test_oversized_canvas_falls_back_to_subject() {
        let engine = CompositionEngine::new().with_max_canvas_pixels(100);
        let s = subject(8, 8);
        let out = engine.compose(&s, &flat_style());
        assert_eq!(out, s);
        assert!(engine.try_compose(&s, &flat_style()).is_err());
    }

    #[test]
    fn test_translucent_subject_blends_over_background() {
        let s = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 128]));
        let out = CompositionEngine::new().compose(&s, &flat_style());
        assert_eq!(out.get_pixel(12, 12).0, [127, 127, 127, 255]);
    }

    #[test]
    fn test_huge_shadow_offset_draws_nothing() {
        for offset_y in [1e19, -1e19, f64::MAX, -f64::MAX] {
            let style = StyleOptions {
                shadow: ShadowOptions {
                    enabled: true,
                    opacity: 1.0,
                    blur_radius: 4.0,
                    offset_y,
                },
                ..flat_style()
            };
            let out = CompositionEngine::new()
                .try_compose(&subject(30, 20), &style)
                .unwrap();
            assert_eq!(out.dimensions(), (50, 40));
            assert_eq!(out.get_pixel(25, 35).0, [255, 255, 255, 255]);
            assert_eq!(out.get_pixel(25, 4).0, [255, 255, 255, 255]);
        }
    }

    #[test]
    fn test_offset_just_past_canvas_matches_no_shadow() {
        let shadowed = |offset_y| StyleOptions {
            shadow: ShadowOptions {
                enabled: true,
                opacity: 1.0,
                blur_radius: 0.0,
                offset_y,
            },
            ..flat_style()
        };
        let engine = CompositionEngine::new();
        let plain = engine.compose(&subject(30, 20), &flat_style());
        assert_eq!(engine.compose(&subject(30, 20), &shadowed(41.0)), plain);
        assert_eq!(engine.compose(&subject(30, 20), &shadowed(-41.0)), plain);
    }

    #[test]
    fn test_background_image_is_decoded_once_per_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        RgbaImage::from_pixel(8, 8, Rgba([0, 160, 0, 255]))
            .save(&path)
            .unwrap();
        let style = StyleOptions {
            background: BackgroundSpec::Image { path: path.clone() },
            ..flat_style()
        };

        let engine = CompositionEngine::new();
        let first = engine.compose(&subject(30, 20), &style);
        std::fs::remove_file(&path).unwrap();
        let second = engine.clone().compose(&subject(30, 20), &style);
        assert_eq!(first.get_pixel(2, 2).0, [0, 160, 0, 255]);
        assert_eq!(second, first);

        // A fresh engine has nothing cached and falls back.
        let fresh = CompositionEngine::new().compose(&subject(30, 20), &style);
        assert_eq!(fresh.get_pixel(2, 2).0, Color::DARK_GRAY.to_array());
    }
}
