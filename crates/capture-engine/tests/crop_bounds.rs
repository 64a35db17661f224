use image::{Rgba, RgbaImage};
use proptest::prelude::*;

use shotcraft_capture_engine::{Cropper, FrozenFrame};
use shotcraft_model::geometry::{PixelRect, Rect};

fn selection(view: f64) -> impl Strategy<Value = Rect> {
    let extent = prop_oneof![
        4 => 0.0..view * 3.0,
        1 => 0.0..1e6_f64,
        1 => Just(1e300_f64),
    ];
    let origin = prop_oneof![
        4 => -view * 2.0..view * 2.0,
        1 => Just(-1e300_f64),
        1 => Just(1e300_f64),
    ];
    (origin.clone(), origin, extent.clone(), extent)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn crop_rect_never_leaves_the_frame(
        rect in selection(200.0),
        scale in prop_oneof![Just(1.0_f64), Just(1.5), Just(2.0)],
        chrome in 0.0..30.0_f64,
        correction in 0.0..1.0_f64,
    ) {
        let pixels = (200.0 * scale) as u32;
        let frame = FrozenFrame::new(
            RgbaImage::from_pixel(pixels, pixels, Rgba([0, 0, 0, 255])),
            1,
            scale,
            chrome,
        );
        let cropper = Cropper {
            chrome_correction: correction,
            min_selection_px: 1,
        };

        if let Some(r) = cropper.crop_rect(&frame, rect) {
            prop_assert!(PixelRect::bounds(pixels, pixels).contains_rect(&r));
            prop_assert!(r.width >= 1 && r.height >= 1);
            let image = Cropper::extract(&frame, r);
            prop_assert_eq!(image.dimensions(), (r.width as u32, r.height as u32));
        }
    }
}
