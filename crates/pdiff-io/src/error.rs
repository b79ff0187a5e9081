//! Error types for codec bridge operations.

use std::io;
use thiserror::Error;

/// Codec bridge error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Format not recognized, not compiled in, or without a usable export.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or truncated file, or a bitmap that does not fit its header.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Decoding error reported by a backend.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error reported by a backend.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Decoded pixel type cannot be normalized into an `RgbaImage`.
    #[error("unsupported pixel type: {0}")]
    UnsupportedPixelType(String),

    /// A bitmap or image buffer could not be allocated.
    #[error("failed to allocate {requested} elements")]
    AllocationFailed {
        /// Elements requested
        requested: usize,
    },

    /// Error from the core image types.
    #[error(transparent)]
    Core(pdiff_core::Error),
}

impl From<pdiff_core::Error> for IoError {
    fn from(e: pdiff_core::Error) -> Self {
        match e {
            pdiff_core::Error::AllocationFailed { requested, .. } => {
                IoError::AllocationFailed { requested }
            }
            other => IoError::Core(other),
        }
    }
}

/// Result type for codec bridge operations.
pub type IoResult<T> = Result<T, IoError>;
