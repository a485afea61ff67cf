//! Edge-clamped pixel sampling.
//!
//! Both samplers return a 4-element array regardless of the image's
//! channel count; for RGB images the fourth element is `1.0`.
//! Coordinates outside the image clamp to the nearest edge pixel, so
//! callers never read out of bounds and never wrap.

use crate::Image;

/// Fetches the pixel nearest to integer (x, y), clamped to the image edge.
#[inline]
pub fn sample_clamped(img: &Image, x: i64, y: i64) -> [f32; 4] {
    let cx = x.clamp(0, img.width() as i64 - 1) as u32;
    let cy = y.clamp(0, img.height() as i64 - 1) as u32;
    let p = img.pixel(cx, cy);
    let a = if p.len() > 3 { p[3] } else { 1.0 };
    [p[0], p[1], p[2], a]
}

/// Bilinear fetch at fractional pixel coordinates.
///
/// Pixel centers sit on integer coordinates: `(0.0, 0.0)` returns the top-left
/// pixel exactly, `(0.5, 0.0)` averages the first two pixels of row 0.
///
/// # Example
///
/// ```rust
/// use nodefx_core::{Image, sample::sample_bilinear};
///
/// let img = Image::from_data(2, 1, 3, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
/// let p = sample_bilinear(&img, 0.5, 0.0);
/// assert!((p[0] - 0.5).abs() < 1e-6);
/// assert_eq!(p[3], 1.0);
/// ```
#[inline]
pub fn sample_bilinear(img: &Image, fx: f32, fy: f32) -> [f32; 4] {
    let x0f = fx.floor();
    let y0f = fy.floor();
    let dx = if fx.is_finite() { fx - x0f } else { 0.0 };
    let dy = if fy.is_finite() { fy - y0f } else { 0.0 };
    // `as` saturates and maps NaN to 0
    let x0 = x0f as i64;
    let y0 = y0f as i64;

    let p00 = sample_clamped(img, x0, y0);
    let p10 = sample_clamped(img, x0.saturating_add(1), y0);
    let p01 = sample_clamped(img, x0, y0.saturating_add(1));
    let p11 = sample_clamped(img, x0.saturating_add(1), y0.saturating_add(1));

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        out[c] = p00[c] * (1.0 - dx) * (1.0 - dy)
            + p10[c] * dx * (1.0 - dy)
            + p01[c] * (1.0 - dx) * dy
            + p11[c] * dx * dy;
    }
    out
}
