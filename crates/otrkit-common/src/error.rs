//! Error types for otrkit-common.

use thiserror::Error;

/// Common error type for otrkit binary operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// A byte-swapped floating point value decoded to NaN.
    #[error("byte-swapped float at offset {offset} decoded to NaN")]
    NanAfterSwap { offset: usize },

    /// Unknown byte order marker.
    #[error("invalid byte order marker: {0}")]
    InvalidEndianness(u8),

    /// Value did not match expected.
    #[error("expected value {expected}, got {actual}")]
    ExpectedValue { expected: String, actual: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Missing null terminator in string.
    #[error("string missing null terminator")]
    MissingNullTerminator,
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
