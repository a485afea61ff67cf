//! Color grading.
//!
//! A fixed-order per-pixel pipeline of photographic adjustments:
//!
//! 1. Invert
//! 2. Exposure (`* 2^stops`)
//! 3. Temperature (red/blue balance)
//! 4. Tint (green/magenta balance)
//! 5. Highlights and shadows (luma-weighted lift)
//! 6. Blacks and whites
//! 7. Contrast around 0.5
//! 8. Brightness
//! 9. Clamp
//! 10. Hue rotation and saturation in HSV
//! 11. Clamp
//!
//! Stages at their neutral value are skipped; a skipped stage produces the
//! same result as running it. The alpha channel is passed through.
//!
//! # Example
//!
//! ```rust
//! use nodefx_core::Image;
//! use nodefx_ops::grade::{grade, GradeParams};
//!
//! let img = Image::filled(2, 2, &[0.25, 0.25, 0.25, 0.5]).unwrap();
//! let params = GradeParams { exposure: 1.0, ..Default::default() };
//! let out = grade(&img, &params).unwrap();
//! assert!((out.pixel(0, 0)[0] - 0.5).abs() < 1e-6);
//! assert_eq!(out.pixel(0, 0)[3], 0.5);
//! ```

use crate::OpsResult;
use crate::parallel::for_each_row;
use nodefx_core::{Image, clamp01, hsv_to_rgb, luma, rgb_to_hsv};
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Grading controls. `Default` is the neutral grade.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GradeParams {
    /// Replace every channel with `1 - c` before grading.
    pub invert: bool,
    /// Exposure in stops, [-2, 2].
    pub exposure: f32,
    /// Warm (+) / cool (-) balance, [-1, 1].
    pub temperature: f32,
    /// Green (+) / magenta (-) balance, [-1, 1].
    pub tint: f32,
    /// Additive lift of bright areas, [-1, 1].
    pub highlights: f32,
    /// Additive lift of dark areas, [-1, 1].
    pub shadows: f32,
    /// Pull toward white weighted by darkness, [-1, 1].
    pub blacks: f32,
    /// Scale by `1 + whites`, [-1, 1].
    pub whites: f32,
    /// Contrast multiplier around 0.5, [0, 2].
    pub contrast: f32,
    /// Additive offset, [-1, 1].
    pub brightness: f32,
    /// Hue rotation in degrees, [-180, 180].
    pub hue: f32,
    /// Saturation multiplier, [0, 2].
    pub saturation: f32,
}

impl Default for GradeParams {
    fn default() -> Self {
        Self {
            invert: false,
            exposure: 0.0,
            temperature: 0.0,
            tint: 0.0,
            highlights: 0.0,
            shadows: 0.0,
            blacks: 0.0,
            whites: 0.0,
            contrast: 1.0,
            brightness: 0.0,
            hue: 0.0,
            saturation: 1.0,
        }
    }
}

/// Clamps into `[lo, hi]`, mapping NaN to `fallback`.
#[inline]
pub(crate) fn clamp_or(v: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if v.is_nan() { fallback } else { v.clamp(lo, hi) }
}

impl GradeParams {
    /// Returns a copy with every control clamped into its range.
    pub fn clamped(&self) -> Self {
        Self {
            invert: self.invert,
            exposure: clamp_or(self.exposure, -2.0, 2.0, 0.0),
            temperature: clamp_or(self.temperature, -1.0, 1.0, 0.0),
            tint: clamp_or(self.tint, -1.0, 1.0, 0.0),
            highlights: clamp_or(self.highlights, -1.0, 1.0, 0.0),
            shadows: clamp_or(self.shadows, -1.0, 1.0, 0.0),
            blacks: clamp_or(self.blacks, -1.0, 1.0, 0.0),
            whites: clamp_or(self.whites, -1.0, 1.0, 0.0),
            contrast: clamp_or(self.contrast, 0.0, 2.0, 1.0),
            brightness: clamp_or(self.brightness, -1.0, 1.0, 0.0),
            hue: clamp_or(self.hue, -180.0, 180.0, 0.0),
            saturation: clamp_or(self.saturation, 0.0, 2.0, 1.0),
        }
    }

    /// Returns `true` if every stage is at its neutral value.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Grades one RGB triple. `params` is used as given, without clamping.
pub fn grade_pixel(params: &GradeParams, rgb: [f32; 3]) -> [f32; 3] {
    let p = params;
    let [mut r, mut g, mut b] = rgb;

    if p.invert {
        r = 1.0 - r;
        g = 1.0 - g;
        b = 1.0 - b;
    }

    if p.exposure != 0.0 {
        let gain = 2.0f32.powf(p.exposure);
        r *= gain;
        g *= gain;
        b *= gain;
    }

    let t = p.temperature;
    if t > 0.0 {
        r *= 1.0 + t * 0.5;
        b *= 1.0 - t * 0.3;
    } else if t < 0.0 {
        r *= 1.0 + t * 0.3;
        b *= 1.0 - t * 0.5;
    }

    let tint = p.tint;
    if tint > 0.0 {
        g *= 1.0 + tint * 0.5;
    } else if tint < 0.0 {
        let k = 1.0 - tint.abs() * 0.3;
        r *= k;
        b *= k;
    }

    if p.highlights != 0.0 || p.shadows != 0.0 {
        let y = luma(r, g, b);
        let hmask = ((y - 0.5) * 2.0).clamp(0.0, 1.0).powi(2);
        let smask = ((0.5 - y) * 2.0).clamp(0.0, 1.0).powi(2);
        let lift = p.highlights * hmask + p.shadows * smask;
        r += lift;
        g += lift;
        b += lift;
    }

    if p.blacks != 0.0 {
        r += p.blacks * (1.0 - r);
        g += p.blacks * (1.0 - g);
        b += p.blacks * (1.0 - b);
    }
    if p.whites != 0.0 {
        r += p.whites * r;
        g += p.whites * g;
        b += p.whites * b;
    }

    if p.contrast != 1.0 {
        r = (r - 0.5) * p.contrast + 0.5;
        g = (g - 0.5) * p.contrast + 0.5;
        b = (b - 0.5) * p.contrast + 0.5;
    }

    if p.brightness != 0.0 {
        r += p.brightness;
        g += p.brightness;
        b += p.brightness;
    }

    r = clamp01(r);
    g = clamp01(g);
    b = clamp01(b);

    if p.hue != 0.0 || p.saturation != 1.0 {
        let (h, s, v) = rgb_to_hsv(r, g, b);
        let h = h + p.hue / 360.0;
        let s = (s * p.saturation).clamp(0.0, 1.0);
        (r, g, b) = hsv_to_rgb(h, s, v);
    }

    [clamp01(r), clamp01(g), clamp01(b)]
}

/// Applies the grading pipeline to every pixel.
pub fn grade(img: &Image, params: &GradeParams) -> OpsResult<Image> {
    let params = params.clamped();
    debug!(
        width = img.width(),
        height = img.height(),
        identity = params.is_identity(),
        "grade"
    );
    trace!(?params, "grade params");

    let ch = img.channels();
    let src = img.data();
    let row_len = img.row_len();
    let mut out = img.blank_like();

    for_each_row(out.data_mut(), row_len, |y, row| {
        let src_row = &src[y * row_len..(y + 1) * row_len];
        for (dst, px) in row.chunks_exact_mut(ch).zip(src_row.chunks_exact(ch)) {
            let rgb = grade_pixel(&params, [px[0], px[1], px[2]]);
            dst[..3].copy_from_slice(&rgb);
            if ch == 4 {
                dst[3] = px[3];
            }
        }
    });

    Ok(out)
}
