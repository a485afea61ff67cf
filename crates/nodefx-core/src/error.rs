//! Error types for nodefx-core operations.
//!
//! The [`Error`] enum covers the ways a buffer can be malformed:
//! zero-sized dimensions, unsupported channel counts, and data lengths
//! that don't match the declared shape.
//!
//! # Usage
//!
//! ```rust
//! use nodefx_core::{Error, Image};
//!
//! let err = Image::new(0, 16, 3).unwrap_err();
//! assert!(matches!(err, Error::InvalidDimensions { .. }));
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - derives `Display` and `std::error::Error`
//!
//! # Used By
//!
//! - [`crate::image::Image`] - Buffer construction
//! - [`crate::image::Mask`] - Buffer construction
//! - `nodefx-ops` - wrapped by `OpsError::Core`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building or reshaping image buffers.
///
/// # Categories
///
/// - **Dimension errors**: [`InvalidDimensions`](Error::InvalidDimensions),
///   [`DimensionMismatch`](Error::DimensionMismatch)
/// - **Format errors**: [`ChannelMismatch`](Error::ChannelMismatch)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid image dimensions.
    ///
    /// Returned when width or height is zero, when the data length
    /// doesn't match `width * height * channels`, or when the size
    /// computation would overflow.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Channel count is not supported.
    ///
    /// Images carry 3 (RGB) or 4 (RGBA) channels; masks carry 1.
    #[error("channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch {
        /// Expected channel count (or description)
        expected: String,
        /// Actual channel count
        got: u8,
    },

    /// Two buffers that must share a shape don't.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First buffer width
        a_width: u32,
        /// First buffer height
        a_height: u32,
        /// Second buffer width
        b_width: u32,
        /// Second buffer height
        b_height: u32,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::ChannelMismatch`] error.
    #[inline]
    pub fn channel_mismatch(expected: impl Into<String>, got: u8) -> Self {
        Self::ChannelMismatch {
            expected: expected.into(),
            got,
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Returns `true` if this is a dimension-related error.
    #[inline]
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. } | Self::DimensionMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions() {
        let err = Error::invalid_dimensions(0, 50, "width must be > 0");
        let msg = err.to_string();
        assert!(msg.contains("0x50"));
        assert!(msg.contains("width must be > 0"));
        assert!(err.is_dimension_error());
    }

    #[test]
    fn test_channel_mismatch() {
        let err = Error::channel_mismatch("3 or 4", 2);
        assert!(err.to_string().contains("3 or 4"));
        assert!(!err.is_dimension_error());
    }

    #[test]
    fn test_dimension_mismatch_names_both_sizes() {
        let err = Error::dimension_mismatch((640, 480), (320, 240));
        assert_eq!(err.to_string(), "dimension mismatch: 640x480 vs 320x240");
        assert!(err.is_dimension_error());
    }
}
