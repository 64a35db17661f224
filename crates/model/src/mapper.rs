//! Coordinate mapping between global, window, view, and pixel space.
//!
//! - **Global:** desktop points spanning every display.
//! - **Window:** points relative to the selection overlay window; Y may point
//!   up (unflipped) or down (flipped) depending on the toolkit.
//! - **View:** points relative to the overlay view, origin top-left, Y down.
//! - **Pixel:** samples of the captured raster, origin top-left, Y down.
//!
//! Rounding policy for view → pixel: left/top edges round down, width and
//! height round up, so the pixel rectangle always contains the geometric
//! selection.

use crate::geometry::{PixelRect, Point, Rect, Size};

/// Convert a global desktop point to window-space of the display whose
/// top-left corner sits at `display_origin`.
pub fn global_to_window(global: Point, display_origin: Point) -> Point {
    Point::new(global.x - display_origin.x, global.y - display_origin.y)
}

/// Convert a window-space point into top-left-origin view space.
///
/// `view_frame` is the view's frame in window coordinates. When
/// `window_flipped` is false the window's Y axis points up and the point is
/// flipped against the view height.
pub fn to_view_space(window_point: Point, view_frame: Rect, window_flipped: bool) -> Point {
    let x = window_point.x - view_frame.x;
    let local_y = window_point.y - view_frame.y;
    let y = if window_flipped {
        local_y
    } else {
        view_frame.height - local_y
    };
    Point::new(x, y)
}

/// Convert a window-space rectangle into view space.
pub fn rect_to_view_space(window_rect: Rect, view_frame: Rect, window_flipped: bool) -> Rect {
    let a = to_view_space(window_rect.origin(), view_frame, window_flipped);
    let b = to_view_space(
        Point::new(window_rect.right(), window_rect.bottom()),
        view_frame,
        window_flipped,
    );
    Rect::from_points(a, b)
}

/// Scale a view-space rectangle into the pixel grid of a raster.
///
/// X and Y use independent factors `pixel / view`. A degenerate view size
/// yields an empty rectangle.
pub fn view_to_pixel(view_rect: Rect, view_size: Size, pixel_size: (u32, u32)) -> PixelRect {
    if view_size.is_empty() || !is_finite_rect(&view_rect) {
        return PixelRect::default();
    }
    let scale_x = pixel_size.0 as f64 / view_size.width;
    let scale_y = pixel_size.1 as f64 / view_size.height;

    PixelRect::new(
        to_pixel((view_rect.x * scale_x).floor()),
        to_pixel((view_rect.y * scale_y).floor()),
        to_pixel((view_rect.width * scale_x).ceil()),
        to_pixel((view_rect.height * scale_y).ceil()),
    )
}

/// Shift a view-space rectangle down by a fraction of the system chrome
/// (menu bar) height.
///
/// The shifted rectangle is clamped so its bottom edge never passes
/// `view_height`; a rectangle taller than the view is cut to fit.
pub fn apply_chrome_offset(
    rect: Rect,
    chrome_height_pt: f64,
    view_height: f64,
    correction: f64,
) -> Rect {
    let shift = chrome_height_pt * correction;
    if !shift.is_finite() || shift == 0.0 {
        return rect;
    }
    let height = rect.height.min(view_height).max(0.0);
    let max_y = (view_height - height).max(0.0);
    let y = (rect.y + shift).min(max_y).max(0.0);
    Rect::new(rect.x, y, rect.width, height)
}

fn to_pixel(v: f64) -> i64 {
    v.clamp(i64::MIN as f64, i64::MAX as f64) as i64
}

fn is_finite_rect(r: &Rect) -> bool {
    r.x.is_finite() && r.y.is_finite() && r.width.is_finite() && r.height.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_to_window_subtracts_display_origin() {
        let p = global_to_window(Point::new(-1800.0, 40.0), Point::new(-1920.0, 0.0));
        assert_eq!(p, Point::new(120.0, 40.0));
    }

    #[test]
    fn test_to_view_space_flipped_is_translation() {
        let frame = Rect::new(0.0, 0.0, 500.0, 500.0);
        let p = to_view_space(Point::new(10.0, 20.0), frame, true);
        assert_eq!(p, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_to_view_space_unflipped_inverts_y() {
        let frame = Rect::new(0.0, 0.0, 500.0, 400.0);
        let p = to_view_space(Point::new(10.0, 20.0), frame, false);
        assert_eq!(p, Point::new(10.0, 380.0));
    }

    #[test]
    fn test_rect_to_view_space_unflipped_keeps_size() {
        let frame = Rect::new(0.0, 0.0, 500.0, 400.0);
        let r = rect_to_view_space(Rect::new(10.0, 300.0, 100.0, 50.0), frame, false);
        assert_eq!(r, Rect::new(10.0, 50.0, 100.0, 50.0));
    }

    #[test]
    fn test_view_to_pixel_floor_origin_ceil_size() {
        let r = view_to_pixel(
            Rect::new(10.3, 10.7, 100.2, 150.1),
            Size::new(500.0, 500.0),
            (1000, 1000),
        );
        assert_eq!(r, PixelRect::new(20, 21, 201, 301));
    }

    #[test]
    fn test_view_to_pixel_independent_axes() {
        let r = view_to_pixel(
            Rect::new(10.0, 10.0, 10.0, 10.0),
            Size::new(100.0, 100.0),
            (200, 300),
        );
        assert_eq!(r, PixelRect::new(20, 30, 20, 30));
    }

    #[test]
    fn test_view_to_pixel_degenerate_view() {
        let r = view_to_pixel(Rect::new(1.0, 1.0, 5.0, 5.0), Size::new(0.0, 10.0), (10, 10));
        assert!(r.is_empty());
    }

    #[test]
    fn test_chrome_offset_shifts_by_fraction() {
        let r = apply_chrome_offset(Rect::new(10.0, 10.0, 100.0, 150.0), 20.0, 500.0, 0.4);
        assert_eq!(r, Rect::new(10.0, 18.0, 100.0, 150.0));
    }

    #[test]
    fn test_chrome_offset_clamped_at_bottom() {
        let r = apply_chrome_offset(Rect::new(0.0, 395.0, 50.0, 100.0), 25.0, 500.0, 0.4);
        assert_eq!(r, Rect::new(0.0, 400.0, 50.0, 100.0));
        assert!(r.bottom() <= 500.0);
    }

    #[test]
    fn test_chrome_offset_zero_chrome_is_identity() {
        let rect = Rect::new(3.0, 4.0, 5.0, 6.0);
        assert_eq!(apply_chrome_offset(rect, 0.0, 100.0, 0.4), rect);
    }
}
