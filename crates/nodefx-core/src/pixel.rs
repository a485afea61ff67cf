//! Per-pixel color utilities.
//!
//! Scalar helpers shared by the engines:
//!
//! - [`luma`] - Rec.709 weighted luminance
//! - [`rgb_to_hsv`] / [`hsv_to_rgb`] - six-sector HSV conversion
//! - [`hsl_to_rgb`] - HSL to RGB, used by palette generation
//!
//! All hue values are normalized to `[0, 1)` rather than degrees.
//!
//! # Example
//!
//! ```rust
//! use nodefx_core::pixel::{hsv_to_rgb, rgb_to_hsv};
//!
//! let (h, s, v) = rgb_to_hsv(1.0, 0.0, 0.0);
//! assert_eq!((h, s, v), (0.0, 1.0, 1.0));
//!
//! let (r, g, b) = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
//! assert!(r.abs() < 1e-6 && (g - 1.0).abs() < 1e-6 && b.abs() < 1e-6);
//! ```

/// Rec.709 luminance coefficient for red channel.
pub const REC709_LUMA_R: f32 = 0.2126;

/// Rec.709 luminance coefficient for green channel.
pub const REC709_LUMA_G: f32 = 0.7152;

/// Rec.709 luminance coefficient for blue channel.
pub const REC709_LUMA_B: f32 = 0.0722;

/// Rec.709 luminance coefficients as an array [R, G, B].
pub const REC709_LUMA: [f32; 3] = [REC709_LUMA_R, REC709_LUMA_G, REC709_LUMA_B];

/// Rec.709 luminance: `Y = 0.2126*R + 0.7152*G + 0.0722*B`.
#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    r * REC709_LUMA_R + g * REC709_LUMA_G + b * REC709_LUMA_B
}

/// Clamps a sample to `[0, 1]`. NaN maps to 0.
#[inline]
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Converts RGB to HSV. All components are in `[0, 1]`.
///
/// Gray inputs return hue 0 and saturation 0.
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    let h = if delta <= 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    (wrap_hue(h) as f32, s as f32, v as f32)
}

/// Converts HSV to RGB. Hue wraps modulo 1.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let (h, s, v) = (wrap_hue(h as f64), s as f64, v as f64);
    let h6 = h * 6.0;
    let sector = (h6.floor() as i32).rem_euclid(6);
    let f = h6 - h6.floor();

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    (r as f32, g as f32, b as f32)
}

/// Converts HSL to RGB. Hue wraps modulo 1.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s <= 0.0 {
        return (l, l, l);
    }
    let h = wrap_hue(h as f64) as f32;
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[inline]
fn wrap_hue(h: f64) -> f64 {
    let w = h.rem_euclid(1.0);
    // rem_euclid can return exactly 1.0 for tiny negative inputs
    if w >= 1.0 { 0.0 } else { w }
}
