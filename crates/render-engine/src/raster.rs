//! Premultiplied RGBA8 buffers and the "over" operator.
//!
//! All composition happens on premultiplied buffers so partially covered
//! corner pixels blend without dark or light fringes. Conversion back to
//! straight alpha happens once, on the finished canvas.

use shotcraft_common::error::{ShotcraftError, ShotcraftResult};
use shotcraft_model::style::Color;

/// A premultiplied RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PremulBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PremulBuffer {
    /// Transparent buffer. Fails instead of aborting when the allocation
    /// cannot be satisfied.
    pub fn try_new(width: u32, height: u32) -> ShotcraftResult<Self> {
        let len = byte_len(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            ShotcraftError::composition(format!("cannot allocate {width}x{height} canvas: {e}"))
        })?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiplied copy of straight-alpha RGBA bytes.
    pub fn from_straight(width: u32, height: u32, rgba: &[u8]) -> ShotcraftResult<Self> {
        let mut buf = Self::try_new(width, height)?;
        if rgba.len() != buf.data.len() {
            return Err(ShotcraftError::composition(format!(
                "expected {} bytes for {width}x{height}, got {}",
                buf.data.len(),
                rgba.len()
            )));
        }
        buf.data.copy_from_slice(rgba);
        premultiply_in_place(&mut buf.data);
        Ok(buf)
    }

    pub fn fill(&mut self, color: Color) {
        let px = premul_color(color);
        for dst in self.data.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    /// Fill one row with a single color.
    pub fn fill_row(&mut self, y: u32, px: [u8; 4]) {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        for dst in self.data[start..start + stride].chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    /// Composite `src` over this buffer with its top-left corner at
    /// `(left, top)`. Parts of `src` outside the buffer are skipped.
    pub fn over_at(&mut self, src: &PremulBuffer, left: i64, top: i64) {
        let x0 = left.max(0);
        let y0 = top.max(0);
        let x1 = (left + src.width as i64).min(self.width as i64);
        let y1 = (top + src.height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let dst_stride = self.width as usize * 4;
        let src_stride = src.width as usize * 4;
        let run = (x1 - x0) as usize * 4;
        for y in y0..y1 {
            let d = y as usize * dst_stride + x0 as usize * 4;
            let s = (y - top) as usize * src_stride + (x0 - left) as usize * 4;
            premul_over_in_place(&mut self.data[d..d + run], &src.data[s..s + run]);
        }
    }

    /// Straight-alpha bytes of this buffer.
    pub fn into_straight(mut self) -> Vec<u8> {
        unpremultiply_in_place(&mut self.data);
        self.data
    }
}

fn byte_len(width: u32, height: u32) -> ShotcraftResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4))
        .ok_or_else(|| ShotcraftError::composition(format!("canvas {width}x{height} overflows")))
}

pub(crate) fn premul_color(color: Color) -> [u8; 4] {
    let a = color.a as u16;
    [
        mul_div255_u8(color.r as u16, a),
        mul_div255_u8(color.g as u16, a),
        mul_div255_u8(color.b as u16, a),
        color.a,
    ]
}

pub(crate) fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(*c as u16, a);
        }
    }
}

pub(crate) fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        match a {
            0 => px[..3].fill(0),
            255 => {}
            _ => {
                for c in &mut px[..3] {
                    *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
    }
}

/// `dst = src + dst * (1 - src.a)` on equal-length premultiplied rows.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3] as u16;
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - sa;
        for c in 0..4 {
            d[c] = s[c].saturating_add(mul_div255_u8(d[c] as u16, inv));
        }
    }
}

/// Rounded `x * y / 255` for 8-bit operands.
pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    let t = x as u32 * y as u32 + 128;
    (((t >> 8) + t) >> 8) as u8
}
