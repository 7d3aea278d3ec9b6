//! Error types for wire parsing in beaconwire-types.

use thiserror::Error;

/// Errors that can occur when parsing frames received from a peripheral.
///
/// This error type is platform-agnostic and does not include
/// transport-specific errors (those belong in beaconwire-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The frame is shorter than its layout requires.
    #[error("Frame requires {expected} bytes, got {actual}")]
    InsufficientBytes {
        /// Minimum number of bytes required.
        expected: usize,
        /// Number of bytes received.
        actual: usize,
    },

    /// A field holds a value outside its encodable range.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias using beaconwire-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_bytes_display() {
        let err = ParseError::InsufficientBytes {
            expected: 3,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Frame requires 3 bytes, got 1");
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ParseError::InvalidValue("size 5".to_string());
        assert!(err.to_string().contains("size 5"));
    }
}
