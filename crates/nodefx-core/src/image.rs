//! Image buffer types shared by every nodefx engine.
//!
//! This module provides the two buffer types the engines exchange with
//! the host:
//! - [`Image`] - owned RGB or RGBA buffer of normalized `f32` samples
//! - [`Mask`] - owned single-channel buffer of blend strengths
//!
//! # Memory Layout
//!
//! Images store pixels in **row-major** order, top-to-bottom, with
//! interleaved channels:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  ← Row 0
//!         [R G B R G B R G B ...]  ← Row 1
//!         ...
//! ```
//!
//! For RGBA images, alpha is interleaved: `[R G B A R G B A ...]`
//!
//! # Usage
//!
//! ```rust
//! use nodefx_core::Image;
//!
//! let mut img = Image::new(64, 32, 4).unwrap();
//! img.set_pixel(10, 5, &[1.0, 0.5, 0.25, 1.0]);
//!
//! assert_eq!(img.pixel(10, 5)[1], 0.5);
//! assert_eq!(img.dimensions(), (64, 32));
//! ```
//!
//! # Ownership
//!
//! Engines borrow their inputs as `&Image` and return a fresh `Image`.
//! Nothing in the crate mutates a caller's buffer in place.

use crate::pixel::{clamp01, luma};
use crate::{Error, Result};

/// Channel counts accepted by [`Image`].
pub const SUPPORTED_CHANNELS: [u8; 2] = [3, 4];

/// Validates a buffer shape and returns the expected element count.
fn checked_len(width: u32, height: u32, channels: u8) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            "width and height must be > 0",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels as usize))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "image dimensions overflow"))
}

fn check_channels(channels: u8) -> Result<()> {
    if SUPPORTED_CHANNELS.contains(&channels) {
        Ok(())
    } else {
        Err(Error::channel_mismatch("3 or 4", channels))
    }
}

/// Owned RGB/RGBA image with normalized `f32` samples.
///
/// Samples are conceptually in `[0, 1]`. Operations that produce output
/// clamp into that range before the host denormalizes with
/// [`to_u8`](Self::to_u8).
///
/// # Invariants
///
/// - `width > 0`, `height > 0`
/// - `channels` is 3 or 4
/// - `data.len() == width * height * channels`
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    data: Vec<f32>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Image {
    /// Creates an image filled with zeros.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] for a zero-sized image,
    /// [`Error::ChannelMismatch`] for a channel count other than 3 or 4.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nodefx_core::Image;
    ///
    /// let img = Image::new(1920, 1080, 3).unwrap();
    /// assert_eq!(img.width(), 1920);
    /// assert!(Image::new(16, 16, 2).is_err());
    /// ```
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self> {
        check_channels(channels)?;
        let len = checked_len(width, height, channels)?;
        Ok(Self {
            data: vec![0.0; len],
            width,
            height,
            channels,
        })
    }

    /// Creates an image where every pixel equals `pixel`.
    ///
    /// The channel count is taken from `pixel.len()`.
    pub fn filled(width: u32, height: u32, pixel: &[f32]) -> Result<Self> {
        let channels = u8::try_from(pixel.len()).unwrap_or(u8::MAX);
        let mut img = Self::new(width, height, channels)?;
        for px in img.data.chunks_exact_mut(channels as usize) {
            px.copy_from_slice(pixel);
        }
        Ok(img)
    }

    /// Wraps existing interleaved pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the data length doesn't match.
    pub fn from_data(width: u32, height: u32, channels: u8, data: Vec<f32>) -> Result<Self> {
        check_channels(channels)?;
        let expected = checked_len(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} elements, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Builds an image from 8-bit samples, normalizing to `[0, 1]`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nodefx_core::Image;
    ///
    /// let img = Image::from_u8(1, 1, 3, &[255, 0, 51]).unwrap();
    /// assert_eq!(img.pixel(0, 0), &[1.0, 0.0, 0.2]);
    /// ```
    pub fn from_u8(width: u32, height: u32, channels: u8, bytes: &[u8]) -> Result<Self> {
        let data = bytes.iter().map(|&b| b as f32 / 255.0).collect();
        Self::from_data(width, height, channels, data)
    }

    /// Denormalizes to 8-bit samples, clamping to `[0, 1]` first.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (clamp01(v) * 255.0).round() as u8)
            .collect()
    }

    /// Returns a zero-filled image with the same shape.
    pub fn blank_like(&self) -> Self {
        Self {
            data: vec![0.0; self.data.len()],
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Channels per pixel (3 or 4).
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels as usize
    }

    /// Returns `true` for RGBA images.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of `f32` elements in one row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw interleaved samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the image and returns its samples.
    #[inline]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    /// Returns the samples of the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[f32] {
        let i = self.index(x, y);
        &self.data[i..i + self.channels as usize]
    }

    /// Mutable samples of the pixel at (x, y).
    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [f32] {
        let i = self.index(x, y);
        let ch = self.channels as usize;
        &mut self.data[i..i + ch]
    }

    /// Overwrites the pixel at (x, y). Extra samples in `pixel` are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: &[f32]) {
        let ch = self.channels as usize;
        let n = ch.min(pixel.len());
        self.pixel_mut(x, y)[..n].copy_from_slice(&pixel[..n]);
    }

    /// RGB samples of the pixel at (x, y).
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [f32; 3] {
        let p = self.pixel(x, y);
        [p[0], p[1], p[2]]
    }

    /// Alpha of the pixel at (x, y); 1.0 for RGB images.
    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> f32 {
        if self.has_alpha() { self.pixel(x, y)[3] } else { 1.0 }
    }

    /// Samples of row `y`.
    #[inline]
    pub fn row(&self, y: u32) -> &[f32] {
        let len = self.row_len();
        let start = y as usize * len;
        &self.data[start..start + len]
    }

    /// Returns a copy with every sample clamped to `[0, 1]`; NaN becomes 0.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        for v in &mut out.data {
            *v = clamp01(*v);
        }
        out
    }

    /// Rec.709 luma of every pixel, row-major.
    pub fn luma_plane(&self) -> Vec<f32> {
        self.data
            .chunks_exact(self.channels as usize)
            .map(|p| luma(p[0], p[1], p[2]))
            .collect()
    }

    /// Returns `true` if both images have identical width and height.
    #[inline]
    pub fn same_size(&self, other: &Image) -> bool {
        self.dimensions() == other.dimensions()
    }
}

/// Single-channel per-pixel strength buffer.
///
/// Values are in `[0, 1]`; a blend engine multiplies its opacity by the
/// mask sample at each pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl Mask {
    /// Creates a mask where every sample equals `value` (clamped to `[0, 1]`, NaN as 0).
    pub fn filled(width: u32, height: u32, value: f32) -> Result<Self> {
        let len = checked_len(width, height, 1)?;
        Ok(Self {
            data: vec![clamp01(value); len],
            width,
            height,
        })
    }

    /// Wraps existing samples, clamping each to `[0, 1]` (NaN as 0).
    pub fn from_data(width: u32, height: u32, mut data: Vec<f32>) -> Result<Self> {
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} mask samples, got {}", expected, data.len()),
            ));
        }
        for v in &mut data {
            *v = clamp01(*v);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Derives a mask from an image as the mean of its RGB samples.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nodefx_core::{Image, Mask};
    ///
    /// let img = Image::filled(2, 2, &[0.0, 0.5, 1.0]).unwrap();
    /// let mask = Mask::from_image(&img);
    /// assert!((mask.get(1, 1) - 0.5).abs() < 1e-6);
    /// ```
    pub fn from_image(image: &Image) -> Self {
        let data = image
            .data()
            .chunks_exact(image.channels())
            .map(|p| clamp01((p[0] + p[1] + p[2]) / 3.0))
            .collect();
        Self {
            data,
            width: image.width(),
            height: image.height(),
        }
    }

    /// Mask width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw samples, row-major.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Sample at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Returns a mask with every sample replaced by `1 - v`.
    pub fn inverted(&self) -> Self {
        Self {
            data: self.data.iter().map(|v| 1.0 - v).collect(),
            width: self.width,
            height: self.height,
        }
    }
}
