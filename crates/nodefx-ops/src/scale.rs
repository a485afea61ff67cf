//! Scale to a megapixel budget with dimension snapping.
//!
//! Latent-space models want dimensions that are multiples of 8 or 64.
//! [`megapixel_dimensions`] picks the output size: the pixel count lands
//! near `megapixels * 1024 * 1024`, and each side is rounded to the nearest
//! multiple of its snap value (never below one multiple).
//!
//! # Example
//!
//! ```rust
//! use nodefx_ops::scale::{megapixel_dimensions, ScaleParams};
//!
//! let (w, h) = megapixel_dimensions(1920, 1080, &ScaleParams::default());
//! assert_eq!((w % 64, h % 64), (0, 0));
//! assert_eq!((w, h), (1344, 768));
//! ```

use crate::grade::clamp_or;
use crate::resize::{Filter, resize_image};
use crate::OpsResult;
use nodefx_core::Image;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Megapixel scaling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScaleParams {
    /// Target size in megapixels (1 MP = 1024 * 1024), [0.01, 16].
    pub megapixels: f32,
    /// Output width is a multiple of this, [1, 512].
    pub width_multiple: u32,
    /// Output height is a multiple of this, [1, 512].
    pub height_multiple: u32,
    /// Scale both sides by the same factor; otherwise derive the sides from
    /// the aspect ratio.
    pub keep_aspect: bool,
    /// Resampling filter.
    pub filter: Filter,
}

impl Default for ScaleParams {
    fn default() -> Self {
        Self {
            megapixels: 1.0,
            width_multiple: 64,
            height_multiple: 64,
            keep_aspect: true,
            filter: Filter::Lanczos3,
        }
    }
}

impl ScaleParams {
    /// Returns a copy with every field clamped into range.
    pub fn clamped(&self) -> Self {
        Self {
            megapixels: clamp_or(self.megapixels, 0.01, 16.0, 1.0),
            width_multiple: self.width_multiple.clamp(1, 512),
            height_multiple: self.height_multiple.clamp(1, 512),
            keep_aspect: self.keep_aspect,
            filter: self.filter,
        }
    }
}

/// Rounds to the nearest multiple (ties to even), with a floor of one multiple.
fn snap(value: f64, multiple: u32) -> u32 {
    let m = f64::from(multiple);
    let snapped = (value / m).round_ties_even() * m;
    (snapped.min(u32::MAX as f64) as u32).max(multiple)
}

/// Output dimensions for scaling a `width` x `height` image.
pub fn megapixel_dimensions(width: u32, height: u32, params: &ScaleParams) -> (u32, u32) {
    let p = params.clamped();
    let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
    let target = f64::from(p.megapixels) * 1024.0 * 1024.0;

    let (tw, th) = if p.keep_aspect {
        let s = (target / (w * h)).sqrt();
        (w * s, h * s)
    } else {
        let aspect = w / h;
        let th = (target / aspect).sqrt();
        (target / th, th)
    };
    trace!(target_w = tw, target_h = th, "megapixel target");

    (snap(tw, p.width_multiple), snap(th, p.height_multiple))
}

/// Resizes `img` to [`megapixel_dimensions`].
pub fn scale_to_megapixels(img: &Image, params: &ScaleParams) -> OpsResult<Image> {
    let p = params.clamped();
    let (w, h) = megapixel_dimensions(img.width(), img.height(), &p);
    debug!(
        from_w = img.width(),
        from_h = img.height(),
        to_w = w,
        to_h = h,
        megapixels = p.megapixels,
        "scale_to_megapixels"
    );
    resize_image(img, w, h, p.filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_one_megapixel() {
        assert_eq!(megapixel_dimensions(512, 512, &ScaleParams::default()), (1024, 1024));
    }

    #[test]
    fn test_snapping_per_axis() {
        let p = ScaleParams {
            width_multiple: 8,
            height_multiple: 100,
            ..Default::default()
        };
        let (w, h) = megapixel_dimensions(1000, 500, &p);
        assert_eq!(w % 8, 0);
        assert_eq!(h % 100, 0);
        // 1448.2 x 724.1
        assert_eq!((w, h), (1448, 700));
    }

    #[test]
    fn test_floor_of_one_multiple() {
        let p = ScaleParams { megapixels: 0.01, ..Default::default() };
        let (w, h) = megapixel_dimensions(4000, 10, &p);
        assert_eq!(h, 64);
        assert!(w >= 64);
    }

    #[test]
    fn test_aspect_modes_agree() {
        let keep = ScaleParams::default();
        let derive = ScaleParams { keep_aspect: false, ..Default::default() };
        for (w, h) in [(1920, 1080), (640, 480), (300, 1200)] {
            assert_eq!(
                megapixel_dimensions(w, h, &keep),
                megapixel_dimensions(w, h, &derive)
            );
        }
    }

    #[test]
    fn test_out_of_range_params() {
        let p = ScaleParams {
            megapixels: f32::NAN,
            width_multiple: 0,
            height_multiple: 9999,
            ..Default::default()
        }
        .clamped();
        assert_eq!(p.megapixels, 1.0);
        assert_eq!(p.width_multiple, 1);
        assert_eq!(p.height_multiple, 512);
    }

    #[test]
    fn test_scale_image() {
        let img = Image::filled(40, 30, &[0.25, 0.5, 0.75, 1.0]).unwrap();
        let p = ScaleParams {
            megapixels: 0.01,
            width_multiple: 8,
            height_multiple: 8,
            filter: Filter::Bilinear,
            ..Default::default()
        };
        let out = scale_to_megapixels(&img, &p).unwrap();
        assert_eq!(out.dimensions(), megapixel_dimensions(40, 30, &p));
        assert_eq!(out.channels(), 4);
        assert!((out.pixel(3, 3)[1] - 0.5).abs() < 1e-4);
    }
}
