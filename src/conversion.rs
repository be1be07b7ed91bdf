//! Per-item dispatch between the library image codec and generic raster images.

use std::io::Read;

use crate::config::ConvertOptions;
use crate::core::cancel::{CancellableReader, CancellationToken};
use crate::core::error::{ConvertError, Result};
use crate::formats::{Classification, classify, pocket, raster, read_magic};
use crate::types::OutputKind;

/// Bytes produced for one input
#[derive(Debug, Clone)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub kind: OutputKind,
    pub source: Classification,
}

impl Converted {
    pub fn extension(&self) -> &'static str {
        self.kind.extension()
    }
}

/// Routes each input to the decoder or the encoder based on its magic.
#[derive(Debug, Clone)]
pub struct ConversionDispatcher {
    rotate: bool,
}

impl ConversionDispatcher {
    pub fn new(options: &ConvertOptions) -> Self {
        Self {
            rotate: options.rotate,
        }
    }

    /// Converts one input stream.
    ///
    /// Library images become bitmaps, every other recognised image becomes a
    /// library image. Inputs that are neither fail with
    /// [`ConvertError::UnrecognizedFormat`]. `token` is checked before every
    /// read of `input` and before encoding starts.
    pub fn process<R: Read>(&self, input: R, token: &CancellationToken) -> Result<Converted> {
        let mut input = CancellableReader::new(input, token.clone());

        let Some(magic) = read_magic(&mut input)? else {
            return Err(ConvertError::UnrecognizedFormat);
        };

        match classify(&magic) {
            Classification::LibraryImage => {
                let image = pocket::decode(&mut input, self.rotate)?;
                token.check()?;
                Ok(Converted {
                    bytes: raster::encode_bitmap(&image)?,
                    kind: OutputKind::Bitmap,
                    source: Classification::LibraryImage,
                })
            }
            Classification::Unknown => {
                let mut bytes = magic.to_vec();
                input.read_to_end(&mut bytes)?;
                token.check()?;

                let image = raster::decode_bgra(&bytes)?.ok_or(ConvertError::UnrecognizedFormat)?;
                token.check()?;
                Ok(Converted {
                    bytes: pocket::encode(&image, self.rotate)?,
                    kind: OutputKind::LibraryImage,
                    source: Classification::Unknown,
                })
            }
        }
    }

    /// Convenience wrapper over [`process`](Self::process) for in-memory input.
    pub fn process_bytes(&self, bytes: &[u8], token: &CancellationToken) -> Result<Converted> {
        self.process(bytes, token)
    }
}
