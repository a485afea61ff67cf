//! Image blending.
//!
//! Photoshop-style separable blend modes with opacity and an optional
//! per-pixel mask.
//!
//! # Blend Modes
//!
//! - [`BlendMode::Normal`] - Overlay replaces base
//! - [`BlendMode::Multiply`] - Darken by multiplication
//! - [`BlendMode::Screen`] - Lighten (inverse multiply)
//! - [`BlendMode::Overlay`] / [`BlendMode::HardLight`] - Contrast
//! - [`BlendMode::SoftLight`] - W3C soft light
//! - [`BlendMode::ColorDodge`] / [`BlendMode::ColorBurn`]
//! - [`BlendMode::Darken`] / [`BlendMode::Lighten`]
//! - [`BlendMode::Difference`] / [`BlendMode::Exclusion`]
//! - [`BlendMode::Add`] / [`BlendMode::Subtract`] - Clamped arithmetic
//!
//! # Compositing
//!
//! `result = base * (1 - opacity * m) + blended * (opacity * m)`, where `m`
//! is the mask sample (1 without a mask) times the overlay alpha when the
//! overlay has one. Output alpha is the base alpha.
//!
//! # Example
//!
//! ```rust
//! use nodefx_ops::composite::{blend_channel, BlendMode};
//!
//! assert_eq!(blend_channel(0.5, 0.5, BlendMode::Multiply), 0.25);
//! assert_eq!(blend_channel(0.7, 0.6, BlendMode::Add), 1.0);
//! ```

use crate::grade::clamp_or;
use crate::parallel::for_each_row;
use crate::resize::{Filter, resize_image, resize_mask};
use crate::OpsResult;
use nodefx_core::{Image, Mask, clamp01};
use std::borrow::Cow;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Blend mode for compositing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum BlendMode {
    /// Overlay replaces base.
    #[default]
    Normal,
    /// Multiply (darken).
    Multiply,
    /// Screen (lighten).
    Screen,
    /// Overlay, keyed on the base.
    Overlay,
    /// Soft light.
    SoftLight,
    /// Hard light, keyed on the overlay.
    HardLight,
    /// Color dodge.
    ColorDodge,
    /// Color burn.
    ColorBurn,
    /// Per-channel minimum.
    Darken,
    /// Per-channel maximum.
    Lighten,
    /// Absolute difference.
    Difference,
    /// Exclusion.
    Exclusion,
    /// Add (linear dodge), clamped.
    Add,
    /// Subtract overlay from base, clamped.
    Subtract,
}

crate::host_names!(BlendMode, "blend mode", {
    Normal => "normal",
    Multiply => "multiply",
    Screen => "screen",
    Overlay => "overlay",
    SoftLight => "soft_light",
    HardLight => "hard_light",
    ColorDodge => "color_dodge",
    ColorBurn => "color_burn",
    Darken => "darken",
    Lighten => "lighten",
    Difference => "difference",
    Exclusion => "exclusion",
    Add => "add",
    Subtract => "subtract",
});

/// Blend settings as a host node exposes them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlendParams {
    /// Blend mode.
    pub mode: BlendMode,
    /// Overall strength, [0, 1].
    pub opacity: f32,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            mode: BlendMode::Normal,
            opacity: 1.0,
        }
    }
}

impl BlendParams {
    /// Returns a copy with opacity clamped to [0, 1].
    pub fn clamped(&self) -> Self {
        Self {
            mode: self.mode,
            opacity: clamp_or(self.opacity, 0.0, 1.0, 1.0),
        }
    }
}

#[inline]
fn overlay_formula(a: f32, b: f32) -> f32 {
    if a < 0.5 {
        2.0 * a * b
    } else {
        1.0 - 2.0 * (1.0 - a) * (1.0 - b)
    }
}

/// Blends one channel: `a` is the base, `b` the overlay, both in [0, 1].
#[inline]
pub fn blend_channel(a: f32, b: f32, mode: BlendMode) -> f32 {
    match mode {
        BlendMode::Normal => b,
        BlendMode::Multiply => a * b,
        BlendMode::Screen => 1.0 - (1.0 - a) * (1.0 - b),
        BlendMode::Overlay => overlay_formula(a, b),
        BlendMode::SoftLight => {
            if b < 0.5 {
                a - (1.0 - 2.0 * b) * a * (1.0 - a)
            } else {
                let d = if a < 0.25 {
                    ((16.0 * a - 12.0) * a + 4.0) * a
                } else {
                    a.sqrt()
                };
                a + (2.0 * b - 1.0) * (d - a)
            }
        }
        BlendMode::HardLight => overlay_formula(b, a),
        BlendMode::ColorDodge => {
            if a >= 1.0 {
                1.0
            } else {
                (b / (1.0 - a)).min(1.0)
            }
        }
        BlendMode::ColorBurn => {
            if a <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - b) / a).min(1.0)
            }
        }
        BlendMode::Darken => a.min(b),
        BlendMode::Lighten => a.max(b),
        BlendMode::Difference => (a - b).abs(),
        BlendMode::Exclusion => a + b - 2.0 * a * b,
        BlendMode::Add => (a + b).min(1.0),
        BlendMode::Subtract => (a - b).max(0.0),
    }
}

/// Blends `overlay` onto `base`.
///
/// The overlay (and mask) are resampled bilinearly to the base size when
/// their dimensions differ. Output has the base's size and channel count.
pub fn blend(
    base: &Image,
    overlay: &Image,
    mode: BlendMode,
    opacity: f32,
    mask: Option<&Mask>,
) -> OpsResult<Image> {
    let BlendParams { mode, opacity } = BlendParams { mode, opacity }.clamped();
    let (w, h) = base.dimensions();
    debug!(
        width = w,
        height = h,
        mode = mode.as_str(),
        opacity,
        masked = mask.is_some(),
        "blend"
    );

    let overlay: Cow<'_, Image> = if overlay.same_size(base) {
        Cow::Borrowed(overlay)
    } else {
        trace!(from = ?overlay.dimensions(), to = ?(w, h), "resampling overlay");
        Cow::Owned(resize_image(overlay, w, h, Filter::Bilinear)?)
    };
    let mask: Option<Cow<'_, Mask>> = match mask {
        Some(m) if m.dimensions() != (w, h) => {
            trace!(from = ?m.dimensions(), to = ?(w, h), "resampling mask");
            Some(Cow::Owned(resize_mask(m, w, h, Filter::Bilinear)?))
        }
        Some(m) => Some(Cow::Borrowed(m)),
        None => None,
    };

    let ch = base.channels();
    let och = overlay.channels();
    let wu = w as usize;
    let base_data = base.data();
    let over_data = overlay.data();
    let mask_data = mask.as_deref().map(Mask::data);
    let mut out = base.blank_like();

    for_each_row(out.data_mut(), wu * ch, |y, row| {
        for x in 0..wu {
            let i = y * wu + x;
            let a = &base_data[i * ch..(i + 1) * ch];
            let b = &over_data[i * och..(i + 1) * och];
            let mut m = mask_data.map_or(1.0, |d| d[i]);
            if och == 4 {
                m *= clamp01(b[3]);
            }
            let k = opacity * m;

            let px = &mut row[x * ch..(x + 1) * ch];
            for c in 0..3 {
                let av = clamp01(a[c]);
                let bv = clamp01(b[c]);
                let blended = blend_channel(av, bv, mode);
                px[c] = clamp01(av * (1.0 - k) + blended * k);
            }
            if ch == 4 {
                px[3] = a[3];
            }
        }
    });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_blend_boundaries() {
        assert_eq!(blend_channel(1.0, 0.0, BlendMode::Multiply), 0.0);
        assert_eq!(blend_channel(1.0, 1.0, BlendMode::Multiply), 1.0);
        assert_eq!(blend_channel(0.0, 0.0, BlendMode::Screen), 0.0);
        assert_eq!(blend_channel(1.0, 0.0, BlendMode::Screen), 1.0);
        assert_eq!(blend_channel(0.2, 0.9, BlendMode::Darken), 0.2);
        assert_eq!(blend_channel(0.2, 0.9, BlendMode::Lighten), 0.9);
        assert_eq!(blend_channel(0.8, 0.8, BlendMode::Add), 1.0);
        assert_eq!(blend_channel(0.2, 0.8, BlendMode::Subtract), 0.0);
    }

    #[test]
    fn test_dodge_and_burn_edges() {
        assert_eq!(blend_channel(1.0, 0.3, BlendMode::ColorDodge), 1.0);
        assert_abs_diff_eq!(blend_channel(0.5, 0.25, BlendMode::ColorDodge), 0.5);
        assert_eq!(blend_channel(0.0, 0.7, BlendMode::ColorBurn), 0.0);
        assert_abs_diff_eq!(blend_channel(0.5, 0.75, BlendMode::ColorBurn), 0.5);
    }

    #[test]
    fn test_overlay_hard_light_swap() {
        for (a, b) in [(0.2, 0.7), (0.8, 0.3), (0.5, 0.5)] {
            assert_eq!(
                blend_channel(a, b, BlendMode::HardLight),
                blend_channel(b, a, BlendMode::Overlay)
            );
        }
    }

    #[test]
    fn test_soft_light_neutral_gray() {
        for a in [0.0, 0.1, 0.3, 0.6, 1.0] {
            assert_abs_diff_eq!(blend_channel(a, 0.5, BlendMode::SoftLight), a, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_difference_black_white() {
        let base = Image::filled(2, 2, &[0.0, 0.0, 0.0]).unwrap();
        let overlay = Image::filled(2, 2, &[1.0, 1.0, 1.0]).unwrap();
        let out = blend(&base, &overlay, BlendMode::Difference, 1.0, None).unwrap();
        assert!(out.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_opacity_zero_returns_base() {
        let base = Image::filled(3, 3, &[0.2, 0.4, 0.6, 0.9]).unwrap();
        let overlay = Image::filled(3, 3, &[0.9, 0.1, 0.5]).unwrap();
        for mode in BlendMode::ALL {
            let out = blend(&base, &overlay, *mode, 0.0, None).unwrap();
            assert_eq!(out, base, "{mode}");
        }
    }

    #[test]
    fn test_opacity_one_is_raw_formula() {
        let base = Image::filled(2, 2, &[0.3, 0.6, 0.9]).unwrap();
        let overlay = Image::filled(2, 2, &[0.7, 0.2, 0.4]).unwrap();
        for mode in BlendMode::ALL {
            let out = blend(&base, &overlay, *mode, 1.0, None).unwrap();
            let px = out.pixel(1, 1);
            for (c, (a, b)) in [(0.3, 0.7), (0.6, 0.2), (0.9, 0.4)].into_iter().enumerate() {
                assert_abs_diff_eq!(px[c], blend_channel(a, b, *mode), epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_mask_and_overlay_alpha() {
        let base = Image::filled(2, 1, &[0.0, 0.0, 0.0, 1.0]).unwrap();
        let overlay = Image::filled(2, 1, &[1.0, 1.0, 1.0, 0.5]).unwrap();
        let mask = Mask::from_data(2, 1, vec![0.0, 1.0]).unwrap();
        let out = blend(&base, &overlay, BlendMode::Normal, 1.0, Some(&mask)).unwrap();
        assert_eq!(out.pixel(0, 0), &[0.0, 0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(out.pixel(1, 0)[0], 0.5, epsilon = 1e-6);
        assert_eq!(out.pixel(1, 0)[3], 1.0);
    }

    #[test]
    fn test_nan_mask_and_alpha_leave_base() {
        let base = Image::filled(3, 1, &[0.25, 0.5, 0.75, 1.0]).unwrap();
        let mut overlay = Image::filled(3, 1, &[1.0, 1.0, 1.0, 1.0]).unwrap();
        overlay.set_pixel(2, 0, &[1.0, 1.0, 1.0, f32::NAN]);
        let mask = Mask::from_data(3, 1, vec![f32::NAN, 1.0, 1.0]).unwrap();
        let out = blend(&base, &overlay, BlendMode::Screen, 1.0, Some(&mask)).unwrap();
        assert!(out.data().iter().all(|v| v.is_finite()));
        assert_eq!(out.pixel(0, 0), base.pixel(0, 0));
        assert_eq!(out.pixel(1, 0), &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(out.pixel(2, 0), base.pixel(2, 0));
    }

    #[test]
    fn test_mismatched_sizes_are_resampled() {
        let base = Image::filled(8, 6, &[0.5, 0.5, 0.5]).unwrap();
        let overlay = Image::filled(3, 2, &[0.2, 0.2, 0.2, 1.0]).unwrap();
        let mask = Mask::filled(4, 4, 1.0).unwrap();
        let out = blend(&base, &overlay, BlendMode::Multiply, 1.0, Some(&mask)).unwrap();
        assert_eq!(out.dimensions(), (8, 6));
        assert_eq!(out.channels(), 3);
        assert_abs_diff_eq!(out.pixel(7, 5)[1], 0.1, epsilon = 1e-4);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!("soft_light".parse::<BlendMode>().unwrap(), BlendMode::SoftLight);
        assert_eq!(BlendMode::ALL.len(), 14);
        assert!("softlight".parse::<BlendMode>().is_err());
    }
}
