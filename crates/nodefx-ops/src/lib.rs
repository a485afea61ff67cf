//! # nodefx-ops
//!
//! Image transform engines for node-graph hosts.
//!
//! Every engine is a pure function: it borrows one or two [`Image`]s and a
//! parameter struct, and returns a fresh [`Image`]. Parameters are clamped
//! into their documented ranges before use; only malformed buffers or
//! unknown enum names produce errors.
//!
//! # Engines
//!
//! - [`grade`] - Color grading pipeline (exposure, temperature, tint, ...)
//! - [`distort`] - Twelve coordinate-remap and pixel-reorder effects
//! - [`edge`] - Six edge detectors with dilation and recoloring
//! - [`composite`] - Fourteen blend modes with opacity and mask
//! - [`halftone`] - Halftone screens and dithering
//!
//! # Supporting Modules
//!
//! - [`noise`] - Seeded Perlin noise and fBm
//! - [`resize`] - Separable resampling
//! - [`scale`] - Scale to a megapixel budget with dimension snapping
//! - [`crop`] - Rectangle crop
//! - [`region`] - Rasterize regional layout boxes into masks
//! - [`texture`] - Procedural nebula/texture generator
//!
//! # Example
//!
//! ```rust
//! use nodefx_core::Image;
//! use nodefx_ops::grade::{grade, GradeParams};
//!
//! let img = Image::filled(4, 4, &[1.0, 1.0, 1.0]).unwrap();
//! let params = GradeParams { invert: true, ..Default::default() };
//! let out = grade(&img, &params).unwrap();
//! assert_eq!(out.pixel(0, 0), &[0.0, 0.0, 0.0]);
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - Process rows on the rayon thread pool
//! - `serde` - Serialize/deserialize parameter structs and enums

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Implements host-facing names for a closed enum: `ALL`, `as_str`,
/// `FromStr`, `Display`, and the string conversions used by serde.
macro_rules! host_names {
    ($ty:ident, $what:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in host menu order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Name used by the host for this value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::OpsError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    _ => Err($crate::OpsError::unknown_name($what, s)),
                }
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::convert::TryFrom<String> for $ty {
            type Error = $crate::OpsError;

            fn try_from(s: String) -> ::std::result::Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl ::std::convert::From<$ty> for &'static str {
            fn from(v: $ty) -> Self {
                v.as_str()
            }
        }
    };
}
pub(crate) use host_names;

mod error;
pub mod parallel;
pub mod rng;

pub mod noise;
pub mod resize;

pub mod composite;
pub mod distort;
pub mod edge;
pub mod grade;
pub mod halftone;

pub mod crop;
pub mod region;
pub mod scale;
pub mod texture;

pub use error::{OpsError, OpsResult};

pub use composite::{BlendMode, blend};
pub use distort::{DistortKind, DistortParams, distort};
pub use edge::{EdgeAlgorithm, EdgeParams, detect_edges};
pub use grade::{GradeParams, grade};
pub use halftone::{HalftoneEffect, HalftoneParams, halftone};
pub use resize::Filter;

pub use nodefx_core::{Image, Mask};
