//! Separable resampling for images and masks.
//!
//! Used by the megapixel scaler and by the blend engine when overlay or
//! mask sizes differ from the base. Filter names match the host's
//! upscale-method values (`nearest-exact`, `bilinear`, `area`, `bicubic`,
//! `lanczos`).
//!
//! # Example
//!
//! ```rust
//! use nodefx_ops::resize::{resize_f32, Filter};
//!
//! // 40x30 RGB down to 20x15
//! let src = vec![0.25f32; 40 * 30 * 3];
//! let dst = resize_f32(&src, 40, 30, 3, 20, 15, Filter::Area).unwrap();
//! assert_eq!(dst.len(), 20 * 15 * 3);
//! ```

use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};
use nodefx_core::{Image, Mask};
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum Filter {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Bilinear interpolation (smooth, fast).
    Bilinear,
    /// Bicubic interpolation (sharper than bilinear).
    Bicubic,
    /// Lanczos-3 (high quality, best for downscaling).
    #[default]
    Lanczos3,
    /// Area average.
    Area,
}

crate::host_names!(Filter, "resize filter", {
    Nearest => "nearest-exact",
    Bilinear => "bilinear",
    Area => "area",
    Bicubic => "bicubic",
    Lanczos3 => "lanczos",
});

impl Filter {
    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Filter::Nearest | Filter::Area => 0.5,
            Filter::Bilinear => 1.0,
            Filter::Bicubic => 2.0,
            Filter::Lanczos3 => 3.0,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Filter::Nearest | Filter::Area => box_weight(x),
            Filter::Bilinear => bilinear_weight(x),
            Filter::Bicubic => bicubic_weight(x),
            Filter::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }
}

/// Box weight function, half-open so adjacent boxes never overlap.
#[inline]
fn box_weight(x: f32) -> f32 {
    if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 }
}

/// Bilinear (triangle) weight function.
#[inline]
fn bilinear_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Bicubic (Mitchell-Netravali) weight function.
#[inline]
fn bicubic_weight(x: f32) -> f32 {
    // Mitchell-Netravali with B=1/3, C=1/3
    const B: f32 = 1.0 / 3.0;
    const C: f32 = 1.0 / 3.0;

    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax
            + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax
            + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

/// Lanczos weight function.
#[inline]
fn lanczos_weight(x: f32, a: f32) -> f32 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f32::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Normalized source taps for one destination sample.
struct Taps {
    start: usize,
    weights: Vec<f32>,
}

/// Precomputes the taps of every destination index along one axis.
fn build_taps(src_len: usize, dst_len: usize, filter: Filter) -> Vec<Taps> {
    let scale = src_len as f32 / dst_len as f32;

    if filter == Filter::Nearest {
        return (0..dst_len)
            .map(|i| Taps {
                start: (((i as f32 + 0.5) * scale).floor() as usize).min(src_len - 1),
                weights: vec![1.0],
            })
            .collect();
    }

    let stretch = scale.max(1.0);
    let support = filter.support() * stretch;

    (0..dst_len)
        .map(|i| {
            let center = (i as f32 + 0.5) * scale - 0.5;
            let left = ((center - support).floor() as isize).max(0) as usize;
            let right = ((center + support).ceil() as usize).min(src_len - 1);

            let mut weights: Vec<f32> = (left..=right)
                .map(|s| filter.weight((s as f32 - center) / stretch))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum.abs() > 1e-8 {
                for w in &mut weights {
                    *w /= sum;
                }
            } else {
                // no tap landed inside the kernel: fall back to the nearest source
                let nearest = (center.round().max(0.0) as usize).clamp(left, right);
                weights.iter_mut().for_each(|w| *w = 0.0);
                weights[nearest - left] = 1.0;
            }
            Taps {
                start: left,
                weights,
            }
        })
        .collect()
}

/// Resamples `channels`-interleaved data from `src_w x src_h` to
/// `dst_w x dst_h`, horizontal pass first.
pub fn resize_f32(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_w: usize,
    dst_h: usize,
    filter: Filter,
) -> OpsResult<Vec<f32>> {
    if src_w == 0 || src_h == 0 || channels == 0 {
        return Err(OpsError::InvalidDimensions(
            "source width, height, and channels must be > 0".into(),
        ));
    }
    let expected = src_w * src_h * channels;
    if src.len() != expected {
        return Err(OpsError::InvalidDimensions(format!(
            "expected {} samples, got {}",
            expected,
            src.len()
        )));
    }
    if dst_w == 0 || dst_h == 0 {
        return Err(OpsError::InvalidDimensions(
            "destination size must be > 0".into(),
        ));
    }
    trace!(src_w, src_h, dst_w, dst_h, ?filter, "resize_f32");

    // Two-pass separable resize: horizontal then vertical
    let temp = resize_horizontal(src, src_w, src_h, channels, dst_w, filter);
    let result = resize_vertical(&temp, dst_w, src_h, channels, dst_h, filter);

    Ok(result)
}

/// Horizontal resize pass.
fn resize_horizontal(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_w: usize,
    filter: Filter,
) -> Vec<f32> {
    let taps = build_taps(src_w, dst_w, filter);
    let mut dst = vec![0.0f32; dst_w * src_h * channels];

    for_each_row(&mut dst, dst_w * channels, |y, row| {
        let src_row = &src[y * src_w * channels..(y + 1) * src_w * channels];
        for (x, t) in taps.iter().enumerate() {
            let out = &mut row[x * channels..(x + 1) * channels];
            for (k, w) in t.weights.iter().enumerate() {
                let si = (t.start + k) * channels;
                for c in 0..channels {
                    out[c] += src_row[si + c] * w;
                }
            }
        }
    });

    dst
}

/// Vertical resize pass.
fn resize_vertical(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_h: usize,
    filter: Filter,
) -> Vec<f32> {
    let taps = build_taps(src_h, dst_h, filter);
    let row_len = src_w * channels;
    let mut dst = vec![0.0f32; row_len * dst_h];

    for_each_row(&mut dst, row_len, |y, row| {
        let t = &taps[y];
        for (k, w) in t.weights.iter().enumerate() {
            let src_row = &src[(t.start + k) * row_len..(t.start + k + 1) * row_len];
            for (o, s) in row.iter_mut().zip(src_row) {
                *o += s * w;
            }
        }
    });

    dst
}

/// Resizes an [`Image`], keeping its channel count.
pub fn resize_image(img: &Image, width: u32, height: u32, filter: Filter) -> OpsResult<Image> {
    if img.dimensions() == (width, height) {
        return Ok(img.clone());
    }
    debug!(
        from_w = img.width(),
        from_h = img.height(),
        to_w = width,
        to_h = height,
        filter = filter.as_str(),
        "resize_image"
    );
    let data = resize_f32(
        img.data(),
        img.width() as usize,
        img.height() as usize,
        img.channels(),
        width as usize,
        height as usize,
        filter,
    )?;
    Ok(Image::from_data(width, height, img.channels() as u8, data)?)
}

/// Resizes a [`Mask`]; results are re-clamped to `[0, 1]`.
pub fn resize_mask(mask: &Mask, width: u32, height: u32, filter: Filter) -> OpsResult<Mask> {
    if mask.dimensions() == (width, height) {
        return Ok(mask.clone());
    }
    let data = resize_f32(
        mask.data(),
        mask.width() as usize,
        mask.height() as usize,
        1,
        width as usize,
        height as usize,
        filter,
    )?;
    Ok(Mask::from_data(width, height, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_kernel_shapes() {
        assert_eq!(Filter::Nearest.weight(0.25), 1.0);
        assert_eq!(Filter::Nearest.weight(0.75), 0.0);
        assert_abs_diff_eq!(Filter::Bilinear.weight(-0.25), 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(Filter::Lanczos3.weight(0.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(Filter::Lanczos3.weight(2.0), 0.0, epsilon = 1e-6);
        assert_eq!(Filter::Bicubic.weight(2.5), 0.0);
        for filter in Filter::ALL {
            assert_eq!(filter.weight(filter.support() + 0.5), 0.0, "{filter}");
        }
    }

    #[test]
    fn test_same_size_is_identity() {
        let src: Vec<f32> = (0..2 * 2 * 3).map(|i| i as f32 / 11.0).collect();

        for filter in [Filter::Nearest, Filter::Bilinear, Filter::Area] {
            let dst = resize_f32(&src, 2, 2, 3, 2, 2, filter).unwrap();
            for (a, b) in src.iter().zip(&dst) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_resize_upscale_constant() {
        let src = vec![0.5f32; 4 * 4 * 3];
        for filter in Filter::ALL {
            let dst = resize_f32(&src, 4, 4, 3, 10, 6, *filter).unwrap();
            assert_eq!(dst.len(), 10 * 6 * 3);
            for v in dst {
                assert!((v - 0.5).abs() < 0.01, "{filter:?} {v}");
            }
        }
    }

    #[test]
    fn test_area_downscale_averages() {
        // 4x1 single-channel row [0, 1, 0, 1] -> 2x1 averages of pairs
        let src = vec![0.0, 1.0, 0.0, 1.0];
        let dst = resize_f32(&src, 4, 1, 1, 2, 1, Filter::Area).unwrap();
        assert_abs_diff_eq!(dst[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(dst[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_nearest_downscale_picks_sources() {
        let src = vec![0.0, 1.0, 2.0, 3.0];
        let dst = resize_f32(&src, 4, 1, 1, 2, 1, Filter::Nearest).unwrap();
        assert_eq!(dst, vec![1.0, 3.0]);
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(resize_f32(&[0.0; 12], 2, 2, 3, 0, 4, Filter::Bilinear).is_err());
        assert!(resize_f32(&[0.0; 11], 2, 2, 3, 4, 4, Filter::Bilinear).is_err());
    }

    #[test]
    fn test_resize_image_and_mask() {
        let img = Image::filled(8, 6, &[0.2, 0.4, 0.6, 1.0]).unwrap();
        let out = resize_image(&img, 3, 5, Filter::Lanczos3).unwrap();
        assert_eq!(out.dimensions(), (3, 5));
        assert_eq!(out.channels(), 4);
        assert_abs_diff_eq!(out.pixel(1, 2)[1], 0.4, epsilon = 1e-4);

        let mask = Mask::filled(4, 4, 0.75).unwrap();
        let m = resize_mask(&mask, 9, 2, Filter::Bicubic).unwrap();
        assert_eq!(m.dimensions(), (9, 2));
        assert_abs_diff_eq!(m.get(8, 1), 0.75, epsilon = 1e-4);
    }

    #[test]
    fn test_filter_names() {
        assert_eq!("lanczos".parse::<Filter>().unwrap(), Filter::Lanczos3);
        assert_eq!(Filter::Nearest.as_str(), "nearest-exact");
        assert!("sinc".parse::<Filter>().is_err());
    }
}
