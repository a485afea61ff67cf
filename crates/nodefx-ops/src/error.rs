//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value, or an unknown enum name.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Image channel count not accepted by the operation.
    #[error("channel mismatch: {0}")]
    ChannelMismatch(String),

    /// Buffer construction failed in `nodefx-core`.
    #[error(transparent)]
    Core(nodefx_core::Error),
}

/// Channel errors land in [`OpsError::ChannelMismatch`]; everything else
/// is wrapped as [`OpsError::Core`].
impl From<nodefx_core::Error> for OpsError {
    fn from(err: nodefx_core::Error) -> Self {
        match err {
            nodefx_core::Error::ChannelMismatch { expected, got } => {
                Self::ChannelMismatch(format!("expected {expected}, got {got}"))
            }
            other => Self::Core(other),
        }
    }
}

impl OpsError {
    /// Builds an [`OpsError::InvalidParameter`] for an unrecognized enum name.
    pub(crate) fn unknown_name(what: &str, name: &str) -> Self {
        Self::InvalidParameter(format!("unknown {what} '{name}'"))
    }
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_converts() {
        let core = nodefx_core::Error::invalid_dimensions(0, 4, "width must be > 0");
        let err: OpsError = core.into();
        assert!(err.to_string().contains("0x4"));
        assert!(matches!(err, OpsError::Core(_)));
    }

    #[test]
    fn test_channel_errors_have_their_own_variant() {
        fn build() -> OpsResult<nodefx_core::Image> {
            Ok(nodefx_core::Image::from_data(1, 1, 2, vec![0.0; 2])?)
        }
        let err = build().unwrap_err();
        assert!(matches!(err, OpsError::ChannelMismatch(_)), "{err:?}");
        assert_eq!(err.to_string(), "channel mismatch: expected 3 or 4, got 2");
    }

    #[test]
    fn test_unknown_name_message() {
        let err = OpsError::unknown_name("blend mode", "glow");
        assert_eq!(err.to_string(), "invalid parameter: unknown blend mode 'glow'");
    }
}
