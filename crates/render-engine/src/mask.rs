//! Anti-aliased rounded-rectangle coverage.

/// Coverage (0..=255) of the pixel at `(x, y)` in a `width x height`
/// rectangle whose corners are rounded with `radius`.
///
/// Coverage is estimated from the distance of the pixel center to the
/// corner arc, which gives a one-pixel-wide soft edge.
pub(crate) fn corner_coverage(x: u32, y: u32, width: u32, height: u32, radius: f64) -> u8 {
    if radius <= 0.0 {
        return 255;
    }
    let px = x as f64 + 0.5;
    let py = y as f64 + 0.5;
    let w = width as f64;
    let h = height as f64;

    let cx = if px < radius {
        radius
    } else if px > w - radius {
        w - radius
    } else {
        return 255;
    };
    let cy = if py < radius {
        radius
    } else if py > h - radius {
        h - radius
    } else {
        return 255;
    };

    let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
    ((radius - d + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Scale every pixel of a premultiplied buffer by its corner coverage.
pub(crate) fn apply_rounded_mask(data: &mut [u8], width: u32, height: u32, radius: f64) {
    if radius <= 0.0 {
        return;
    }
    // Only the four corner squares can be partially covered.
    let band = (radius.ceil() as u32).min(width).min(height);
    let stride = width as usize * 4;
    for y in 0..height {
        let in_band_y = y < band || y >= height - band;
        if !in_band_y {
            continue;
        }
        for x in (0..band).chain(width.saturating_sub(band).max(band)..width) {
            let cov = corner_coverage(x, y, width, height, radius) as u16;
            if cov == 255 {
                continue;
            }
            let i = y as usize * stride + x as usize * 4;
            for c in &mut data[i..i + 4] {
                *c = super::raster::mul_div255_u8(*c as u16, cov);
            }
        }
    }
}
