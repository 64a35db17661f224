//! Separable gaussian blur of an 8-bit alpha plane.
//!
//! Weights are Q16 fixed point so the result is bit-identical across
//! platforms. Samples outside the plane count as fully transparent.

/// Sigma used for a given blur radius.
pub(crate) fn sigma_for_radius(blur_radius: f64) -> f64 {
    blur_radius / 2.0
}

/// Number of taps on each side of the center for `sigma`.
pub(crate) fn kernel_radius(sigma: f64) -> u32 {
    if !(sigma.is_finite() && sigma > 0.0) {
        return 0;
    }
    (sigma * 3.0).ceil().min(1024.0) as u32
}

/// Normalized Q16 gaussian weights; they sum to exactly `1 << 16`.
pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f64) -> Vec<u32> {
    if radius == 0 || !(sigma.is_finite() && sigma > 0.0) {
        return vec![1 << 16];
    }

    let r = radius as i64;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|w| ((w / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| w as i64).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (weights[mid] as i64 + delta).clamp(0, 65536) as u32;
    }
    weights
}

/// Blur `plane` (row-major, `width * height`) in place with the given
/// kernel. Only the rows and columns inside `region` (x, y, w, h) are
/// written; everything outside it must already be zero.
pub(crate) fn blur_plane_q16(
    plane: &mut [u8],
    width: u32,
    height: u32,
    region: (u32, u32, u32, u32),
    kernel: &[u32],
) {
    if kernel.len() <= 1 || width == 0 || height == 0 {
        return;
    }
    let (rx, ry, rw, rh) = region;
    let mut tmp = vec![0u8; plane.len()];
    horizontal_pass(plane, &mut tmp, width, (rx, ry, rw, rh), kernel);
    vertical_pass(&tmp, plane, width, height, (rx, ry, rw, rh), kernel);
}

fn horizontal_pass(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    region: (u32, u32, u32, u32),
    k: &[u32],
) {
    let radius = (k.len() / 2) as i64;
    let w = width as i64;
    let (rx, ry, rw, rh) = region;
    for y in ry..ry + rh {
        let row = y as usize * width as usize;
        for x in rx..rx + rw {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x as i64 + ki as i64 - radius;
                if sx < 0 || sx >= w {
                    continue;
                }
                acc += kw as u64 * src[row + sx as usize] as u64;
            }
            dst[row + x as usize] = q16_to_u8(acc);
        }
    }
}

fn vertical_pass(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    region: (u32, u32, u32, u32),
    k: &[u32],
) {
    let radius = (k.len() / 2) as i64;
    let h = height as i64;
    let stride = width as usize;
    let (rx, ry, rw, rh) = region;
    for y in ry..ry + rh {
        for x in rx..rx + rw {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y as i64 + ki as i64 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                acc += kw as u64 * src[sy as usize * stride + x as usize] as u64;
            }
            dst[y as usize * stride + x as usize] = q16_to_u8(acc);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}
