//! # nodefx-core
//!
//! Core types for the nodefx image transforms.
//!
//! This crate provides the foundational types shared by every engine:
//!
//! - [`Image`] - Owned RGB/RGBA buffer of normalized `f32` samples
//! - [`Mask`] - Single-channel strength buffer
//! - [`sample`] - Edge-clamped nearest and bilinear sampling
//! - [`pixel`] - Rec.709 luma, HSV and HSL conversion
//!
//! ## Crate Structure
//!
//! ```text
//! nodefx-core (this crate)
//!    ^
//!    |
//!    +-- nodefx-ops (engines)
//!    +-- nodefx-cli (command-line driver)
//!    +-- nodefx-tests, nodefx-bench
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;
pub mod pixel;
pub mod sample;

pub use error::*;
pub use image::*;
pub use pixel::{REC709_LUMA, clamp01, hsl_to_rgb, hsv_to_rgb, luma, rgb_to_hsv};
pub use sample::{sample_bilinear, sample_clamped};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use nodefx_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::{Image, Mask};
    pub use crate::pixel::{clamp01, hsl_to_rgb, hsv_to_rgb, luma, rgb_to_hsv};
    pub use crate::sample::{sample_bilinear, sample_clamped};
}
