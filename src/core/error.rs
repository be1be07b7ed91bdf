use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::cancel::Cancelled;

/// Errors that can occur while converting a single item
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Truncated data: expected {expected} bytes, got {actual}")]
    TruncatedPayload { expected: u64, actual: u64 },

    #[error("Dimensions {width}x{height} do not fit the 16-bit header fields")]
    DimensionOverflow { width: u32, height: u32 },

    #[error("Not an image")]
    UnrecognizedFormat,

    #[error("Cannot create directory {}: {source}", .path.display())]
    OutputDirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid buffer size: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: u64, actual: u64 },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl ConvertError {
    /// Items failing with this error are skipped rather than reported.
    pub fn is_skippable(&self) -> bool {
        matches!(self, ConvertError::UnrecognizedFormat)
    }
}

impl From<io::Error> for ConvertError {
    fn from(e: io::Error) -> Self {
        let cancelled = e
            .get_ref()
            .is_some_and(|inner| inner.downcast_ref::<Cancelled>().is_some());
        if cancelled {
            ConvertError::Cancelled
        } else {
            ConvertError::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
