//! Style options applied to a captured subject.
//!
//! A `StyleOptions` value is an immutable snapshot: the preview UI edits its
//! own live copy and hands a clone to every render request.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An sRGB color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const DARK_GRAY: Color = Color::rgb(85, 85, 85);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from unit-range components.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(q(r), q(g), q(b))
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// `#rrggbb` or `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Failure to parse a hex color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #rrggbb or #rrggbbaa")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

/// Colors used when a gradient has fewer than two stops.
pub const GRADIENT_FALLBACK: [Color; 2] = [Color::WHITE, Color::BLACK];

/// How the canvas behind the subject is filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundSpec {
    /// Flat fill.
    Solid { color: Color },

    /// Top-to-bottom linear gradient with evenly spaced stops.
    Gradient { colors: Vec<Color> },

    /// Raster file scaled to fill the canvas (aspect-fill, center-crop).
    Image { path: PathBuf },
}

impl BackgroundSpec {
    /// Gradient stops actually rendered: the given colors, or the fallback
    /// pair when fewer than two were provided.
    pub fn gradient_stops(colors: &[Color]) -> &[Color] {
        if colors.len() < 2 {
            &GRADIENT_FALLBACK
        } else {
            colors
        }
    }
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        BackgroundSpec::Solid {
            color: Color::WHITE,
        }
    }
}

/// Drop shadow parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowOptions {
    pub enabled: bool,

    /// Shadow alpha multiplier in `[0, 1]`.
    pub opacity: f64,

    /// Blur radius in pixels.
    pub blur_radius: f64,

    /// Downward offset in pixels (negative moves the shadow up).
    pub offset_y: f64,
}

impl ShadowOptions {
    pub const DISABLED: ShadowOptions = ShadowOptions {
        enabled: false,
        opacity: 0.0,
        blur_radius: 0.0,
        offset_y: 0.0,
    };

    /// Opacity clamped into `[0, 1]`.
    pub fn effective_opacity(&self) -> f64 {
        if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Blur radius with negative and non-finite values treated as zero.
    pub fn effective_blur_radius(&self) -> f64 {
        if self.blur_radius.is_finite() {
            self.blur_radius.max(0.0)
        } else {
            0.0
        }
    }
}

impl Default for ShadowOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            opacity: 0.25,
            blur_radius: 18.0,
            offset_y: 0.0,
        }
    }
}

/// Complete style snapshot for one composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleOptions {
    /// Padding on every side of the subject, in pixels.
    pub padding: f64,

    /// Requested corner radius in pixels; clamped at render time.
    pub corner_radius: f64,

    pub background: BackgroundSpec,

    pub shadow: ShadowOptions,
}

impl StyleOptions {
    /// Padding rounded to whole pixels, negative values treated as zero.
    pub fn effective_padding(&self) -> u32 {
        if self.padding.is_finite() && self.padding > 0.0 {
            self.padding.round().min(u32::MAX as f64) as u32
        } else {
            0
        }
    }

    /// Corner radius clamped to `[0, min(width, height) / 2]`.
    pub fn effective_corner_radius(&self, subject_width: u32, subject_height: u32) -> f64 {
        let limit = subject_width.min(subject_height) as f64 / 2.0;
        if !self.corner_radius.is_finite() {
            return if self.corner_radius > 0.0 { limit } else { 0.0 };
        }
        self.corner_radius.clamp(0.0, limit)
    }

    /// Output canvas dimensions for a subject of the given size, or `None`
    /// when they overflow.
    pub fn canvas_size(&self, subject_width: u32, subject_height: u32) -> Option<(u32, u32)> {
        let pad = self.effective_padding().checked_mul(2)?;
        Some((
            subject_width.checked_add(pad)?,
            subject_height.checked_add(pad)?,
        ))
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            padding: 50.0,
            corner_radius: 16.0,
            background: BackgroundSpec::default(),
            shadow: ShadowOptions::default(),
        }
    }
}
