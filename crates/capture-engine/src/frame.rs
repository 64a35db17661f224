//! The frozen frame a capture session selects from.

use std::sync::Arc;

use image::RgbaImage;
use shotcraft_model::geometry::Size;
use shotcraft_platform_core::{DisplayId, DisplayInfo};

/// Immutable raster snapshot of one display.
///
/// The raster is shared behind an `Arc` so concurrent crops never copy or
/// lock it.
#[derive(Debug, Clone)]
pub struct FrozenFrame {
    image: Arc<RgbaImage>,
    display_id: DisplayId,
    scale_factor: f64,
    chrome_height_pt: f64,
}

impl FrozenFrame {
    pub fn new(
        image: RgbaImage,
        display_id: DisplayId,
        scale_factor: f64,
        chrome_height_pt: f64,
    ) -> Self {
        Self {
            image: Arc::new(image),
            display_id,
            scale_factor: if scale_factor.is_finite() && scale_factor > 0.0 {
                scale_factor
            } else {
                1.0
            },
            chrome_height_pt: chrome_height_pt.max(0.0),
        }
    }

    /// Frame for `display` using its scale and chrome height.
    pub fn for_display(image: RgbaImage, display: &DisplayInfo) -> Self {
        Self::new(
            image,
            display.id,
            display.scale_factor,
            display.chrome_height_pt,
        )
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn shared_image(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.image)
    }

    pub fn display_id(&self) -> DisplayId {
        self.display_id
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Menu bar height still present in the raster, in points.
    pub fn chrome_height_pt(&self) -> f64 {
        self.chrome_height_pt
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Logical size of the selection view showing this frame.
    pub fn view_size(&self) -> Size {
        let (w, h) = self.pixel_size();
        Size::new(w as f64 / self.scale_factor, h as f64 / self.scale_factor)
    }
}
