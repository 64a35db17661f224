//! Canvas background fills.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use image::imageops::FilterType;
use image::RgbaImage;
use shotcraft_common::error::ShotcraftResult;
use shotcraft_model::style::{BackgroundSpec, Color};

use crate::raster::{premul_color, premultiply_in_place, PremulBuffer};

/// Most recently decoded background image, keyed by path.
///
/// Slider edits recompose with the same background many times per second;
/// only a change of path triggers another decode.
#[derive(Debug, Default)]
pub(crate) struct ImageCache {
    slot: Mutex<Option<(PathBuf, Arc<RgbaImage>)>>,
}

impl ImageCache {
    pub(crate) fn load(&self, path: &Path) -> ShotcraftResult<Arc<RgbaImage>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached, image)) = slot.as_ref() {
            if cached == path {
                return Ok(Arc::clone(image));
            }
        }
        let image = Arc::new(image::open(path)?.to_rgba8());
        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Decoded background image"
        );
        *slot = Some((path.to_path_buf(), Arc::clone(&image)));
        Ok(image)
    }
}

/// Fill the whole canvas according to `spec`.
pub(crate) fn paint_background(
    canvas: &mut PremulBuffer,
    spec: &BackgroundSpec,
    images: &ImageCache,
) {
    match spec {
        BackgroundSpec::Solid { color } => canvas.fill(*color),
        BackgroundSpec::Gradient { colors } => {
            paint_vertical_gradient(canvas, BackgroundSpec::gradient_stops(colors))
        }
        BackgroundSpec::Image { path } => {
            if let Err(e) = paint_image(canvas, path, images) {
                tracing::warn!(path = %path.display(), error = %e, "Background image unavailable");
                canvas.fill(Color::DARK_GRAY);
            }
        }
    }
}

/// Top-to-bottom gradient with evenly spaced stops.
fn paint_vertical_gradient(canvas: &mut PremulBuffer, stops: &[Color]) {
    let height = canvas.height;
    for y in 0..height {
        let t = (y as f64 + 0.5) / height as f64;
        canvas.fill_row(y, premul_color(sample_stops(stops, t)));
    }
}

/// Color at `t` in `[0, 1]` along evenly spaced stops.
pub(crate) fn sample_stops(stops: &[Color], t: f64) -> Color {
    match stops {
        [] => Color::TRANSPARENT,
        [only] => *only,
        _ => {
            let segments = (stops.len() - 1) as f64;
            let pos = t.clamp(0.0, 1.0) * segments;
            let i = (pos.floor() as usize).min(stops.len() - 2);
            let f = pos - i as f64;
            lerp_color(stops[i], stops[i + 1], f)
        }
    }
}

fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round().clamp(0.0, 255.0) as u8;
    Color::rgba(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

fn paint_image(
    canvas: &mut PremulBuffer,
    path: &Path,
    images: &ImageCache,
) -> ShotcraftResult<()> {
    let source = images.load(path)?;
    let filled = aspect_fill(&source, canvas.width, canvas.height);
    let mut data = filled.into_raw();
    premultiply_in_place(&mut data);
    canvas.data.copy_from_slice(&data);
    Ok(())
}

/// Aspect-fill: center-crop the source to the canvas aspect ratio, then
/// scale the crop to exactly `width` x `height`.
///
/// Cropping first keeps every intermediate no larger than the source or the
/// canvas, however extreme the two aspect ratios are.
pub(crate) fn aspect_fill(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (sw, sh) = source.dimensions();
    if sw == 0 || sh == 0 || width == 0 || height == 0 {
        return RgbaImage::from_pixel(width, height, image::Rgba(Color::DARK_GRAY.to_array()));
    }
    let (crop_w, crop_h) = fill_crop_size((sw, sh), (width, height));
    let x = (sw - crop_w) / 2;
    let y = (sh - crop_h) / 2;
    let crop = image::imageops::crop_imm(source, x, y, crop_w, crop_h).to_image();
    image::imageops::resize(&crop, width, height, FilterType::Triangle)
}

/// Largest region of a `source`-sized image with the aspect ratio of
/// `target`, at least one pixel on each side.
fn fill_crop_size(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = (source.0 as f64, source.1 as f64);
    let aspect = target.0 as f64 / target.1 as f64;
    if sw / sh > aspect {
        let w = (sh * aspect).round().clamp(1.0, sw) as u32;
        (w, source.1)
    } else {
        let h = (sw / aspect).round().clamp(1.0, sh) as u32;
        (source.0, h)
    }
}
