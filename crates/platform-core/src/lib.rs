//! Shotcraft platform core contracts.
//!
//! Display descriptions shared by the capture and input crates without
//! coupling them to a concrete OS backend. Positions and sizes are in
//! global desktop points; the backing raster is `points * scale_factor`.

use serde::{Deserialize, Serialize};
use shotcraft_model::geometry::{Point, Rect};

/// Identifier of a connected display.
pub type DisplayId = u32;

/// Information about a connected display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayInfo {
    pub id: DisplayId,
    /// Display name (connector or model).
    pub name: String,
    /// Top-left corner in the global desktop (points).
    pub x: f64,
    pub y: f64,
    /// Logical resolution in points.
    pub width_pt: f64,
    pub height_pt: f64,
    /// Backing scale factor (for example 1.0, 2.0).
    pub scale_factor: f64,
    /// Height of the system menu bar on this display (points).
    #[serde(default)]
    pub chrome_height_pt: f64,
    /// Whether this display is primary.
    #[serde(default)]
    pub primary: bool,
}

impl DisplayInfo {
    /// Display at the global origin whose logical size is derived from a
    /// raster of `width_px` x `height_px` at `scale_factor`.
    pub fn from_pixels(
        id: DisplayId,
        name: impl Into<String>,
        width_px: u32,
        height_px: u32,
        scale_factor: f64,
    ) -> Self {
        let scale = sanitize_scale(scale_factor);
        Self {
            id,
            name: name.into(),
            x: 0.0,
            y: 0.0,
            width_pt: width_px as f64 / scale,
            height_pt: height_px as f64 / scale,
            scale_factor: scale,
            chrome_height_pt: 0.0,
            primary: true,
        }
    }

    pub fn with_chrome_height(mut self, chrome_height_pt: f64) -> Self {
        self.chrome_height_pt = chrome_height_pt.max(0.0);
        self
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Frame in global desktop points.
    pub fn frame(&self) -> Rect {
        Rect::new(self.x, self.y, self.width_pt, self.height_pt)
    }

    /// Raster size in physical pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = sanitize_scale(self.scale_factor);
        (
            (self.width_pt * scale).round().max(0.0) as u32,
            (self.height_pt * scale).round().max(0.0) as u32,
        )
    }

    /// Half-open containment: a point on the shared edge of two displays
    /// belongs to the one on its right/bottom.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x
            && p.x < self.x + self.width_pt
            && p.y >= self.y
            && p.y < self.y + self.height_pt
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Display under a global point.
///
/// Falls back to the primary display, then the first one, when the point
/// lies outside every display.
pub fn display_at(point: Point, displays: &[DisplayInfo]) -> Option<&DisplayInfo> {
    displays
        .iter()
        .find(|d| d.contains(point))
        .or_else(|| {
            tracing::debug!(x = point.x, y = point.y, "Point outside all displays");
            displays.iter().find(|d| d.primary)
        })
        .or_else(|| displays.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side_by_side() -> Vec<DisplayInfo> {
        vec![
            DisplayInfo {
                primary: false,
                ..DisplayInfo::from_pixels(2, "left", 1920, 1080, 1.0).with_origin(-1920.0, 0.0)
            },
            DisplayInfo::from_pixels(1, "main", 2880, 1800, 2.0).with_chrome_height(24.0),
        ]
    }

    #[test]
    fn display_at_picks_containing_display() {
        let displays = side_by_side();
        assert_eq!(display_at(Point::new(-10.0, 10.0), &displays).unwrap().id, 2);
        assert_eq!(display_at(Point::new(0.0, 10.0), &displays).unwrap().id, 1);
    }

    #[test]
    fn display_at_falls_back_to_primary() {
        let displays = side_by_side();
        assert_eq!(display_at(Point::new(9999.0, 9999.0), &displays).unwrap().id, 1);
        assert!(display_at(Point::ZERO, &[]).is_none());
    }

    #[test]
    fn pixel_size_uses_scale() {
        let d = DisplayInfo::from_pixels(1, "retina", 2880, 1800, 2.0);
        assert_eq!(d.width_pt, 1440.0);
        assert_eq!(d.pixel_size(), (2880, 1800));
        assert_eq!(DisplayInfo::from_pixels(1, "bad", 100, 100, 0.0).scale_factor, 1.0);
    }

    #[test]
    fn display_json_defaults() {
        let json = r#"{"id":3,"name":"ext","x":0,"y":0,
            "width_pt":800,"height_pt":600,"scale_factor":1.0}"#;
        let d: DisplayInfo = serde_json::from_str(json).unwrap();
        assert_eq!(d.chrome_height_pt, 0.0);
        assert!(!d.primary);
    }
}
