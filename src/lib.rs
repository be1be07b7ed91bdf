pub mod batch;
pub mod cli;
pub mod config;
pub mod conversion;
pub mod core;
pub mod formats;
pub mod types;

pub use config::ConvertOptions;
pub use conversion::{ConversionDispatcher, Converted};
pub use crate::core::{CancellationToken, ConvertError};
pub use formats::Classification;
pub use types::{
    BYTES_PER_PIXEL, HEADER_LEN, LIBRARY_IMAGE_MAGIC, LibraryImageHeader, OutputKind, PixelBuffer,
    Rotation,
};
