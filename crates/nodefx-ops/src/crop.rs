//! Rectangle crop.
//!
//! Hosts send crop requests as loose JSON (`{"x": .., "y": .., "width": ..,
//! "height": ..}`), possibly out of bounds or missing fields. [`CropRect`]
//! carries the raw request; [`CropRect::clamp_to`] resolves it against the
//! image into a [`PixelRect`] that is always non-empty and in bounds.
//!
//! # Example
//!
//! ```rust
//! use nodefx_core::Image;
//! use nodefx_ops::crop::{crop, CropRect};
//!
//! let img = Image::new(64, 48, 3).unwrap();
//! let rect = CropRect { x: 60, y: -5, width: Some(32), height: None };
//! let (out, px) = crop(&img, &rect).unwrap();
//! assert_eq!((px.x, px.y, px.width, px.height), (60, 0, 4, 48));
//! assert_eq!(out.dimensions(), (4, 48));
//! ```

use crate::{OpsError, OpsResult};
use nodefx_core::Image;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Requested crop, in source pixels. Missing extents mean "to the edge".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CropRect {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width, or the full image width.
    pub width: Option<i64>,
    /// Height, or the full image height.
    pub height: Option<i64>,
}

/// A crop rectangle resolved against a concrete image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width, at least 1.
    pub width: u32,
    /// Height, at least 1.
    pub height: u32,
}

impl CropRect {
    /// Clamps to a `w` x `h` image: `x` in `[0, w-1]`, `y` in `[0, h-1]`,
    /// width in `[1, w-x]`, height in `[1, h-y]`.
    pub fn clamp_to(&self, w: u32, h: u32) -> PixelRect {
        let (w, h) = (i64::from(w.max(1)), i64::from(h.max(1)));
        let x = self.x.clamp(0, w - 1);
        let y = self.y.clamp(0, h - 1);
        let width = self.width.unwrap_or(w).clamp(1, w - x);
        let height = self.height.unwrap_or(h).clamp(1, h - y);
        PixelRect {
            x: x as u32,
            y: y as u32,
            width: width as u32,
            height: height as u32,
        }
    }
}

/// Copies a `w` x `h` window at (`x`, `y`) out of an interleaved buffer.
pub fn crop_raw(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    rect: PixelRect,
) -> OpsResult<Vec<f32>> {
    let (x, y) = (rect.x as usize, rect.y as usize);
    let (w, h) = (rect.width as usize, rect.height as usize);
    if x + w > src_w || y + h > src_h {
        return Err(OpsError::InvalidDimensions(format!(
            "crop region {}x{} at ({},{}) exceeds {}x{}",
            w, h, x, y, src_w, src_h
        )));
    }

    let mut dst = Vec::with_capacity(w * h * channels);
    for row in y..(y + h) {
        let start = (row * src_w + x) * channels;
        dst.extend_from_slice(&src[start..start + w * channels]);
    }
    Ok(dst)
}

/// Crops `img` to the clamped `rect`; returns the image and the rectangle
/// actually used.
pub fn crop(img: &Image, rect: &CropRect) -> OpsResult<(Image, PixelRect)> {
    let px = rect.clamp_to(img.width(), img.height());
    debug!(
        x = px.x,
        y = px.y,
        width = px.width,
        height = px.height,
        "crop"
    );
    let data = crop_raw(
        img.data(),
        img.width() as usize,
        img.height() as usize,
        img.channels(),
        px,
    )?;
    let out = Image::from_data(px.width, px.height, img.channels() as u8, data)?;
    Ok((out, px))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: u32, h: u32) -> Image {
        let mut img = Image::new(w, h, 3).unwrap();
        for y in 0..h {
            for x in 0..w {
                img.set_pixel(x, y, &[x as f32, y as f32, 0.0]);
            }
        }
        img
    }

    #[test]
    fn test_clamp_defaults_to_full_image() {
        let px = CropRect::default().clamp_to(100, 50);
        assert_eq!(px, PixelRect { x: 0, y: 0, width: 100, height: 50 });
    }

    #[test]
    fn test_clamp_out_of_bounds() {
        let rect = CropRect { x: 500, y: -3, width: Some(0), height: Some(1000) };
        let px = rect.clamp_to(100, 50);
        assert_eq!(px, PixelRect { x: 99, y: 0, width: 1, height: 50 });
    }

    #[test]
    fn test_crop_copies_window() {
        let img = ramp(10, 8);
        let rect = CropRect { x: 2, y: 3, width: Some(4), height: Some(2) };
        let (out, px) = crop(&img, &rect).unwrap();
        assert_eq!(px, PixelRect { x: 2, y: 3, width: 4, height: 2 });
        assert_eq!(out.dimensions(), (4, 2));
        assert_eq!(out.pixel(0, 0), &[2.0, 3.0, 0.0]);
        assert_eq!(out.pixel(3, 1), &[5.0, 4.0, 0.0]);
    }

    #[test]
    fn test_crop_raw_rejects_overflow() {
        let src = vec![0.0; 4 * 4 * 3];
        let rect = PixelRect { x: 2, y: 0, width: 3, height: 1 };
        assert!(crop_raw(&src, 4, 4, 3, rect).is_err());
    }

    #[test]
    fn test_crop_keeps_alpha() {
        let img = Image::filled(5, 5, &[0.1, 0.2, 0.3, 0.4]).unwrap();
        let rect = CropRect { x: 1, y: 1, width: Some(2), height: Some(2) };
        let (out, _) = crop(&img, &rect).unwrap();
        assert_eq!(out.channels(), 4);
        assert_eq!(out.pixel(1, 1), &[0.1, 0.2, 0.3, 0.4]);
    }
}
