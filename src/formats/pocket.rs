//! Library image codec
//!
//! Layout (little-endian, no padding):
//!
//! ```text
//! 0   4  magic 20 49 50 41
//! 4   2  dimA  payload rows
//! 6   2  dimB  payload columns
//! 8   ..  dimA * dimB BGRA8888 pixels, row-major
//! ```
//!
//! The payload is stored a quarter turn counter-clockwise from how the device
//! displays it, so `dimA` doubles as the displayed width. Decoding turns it
//! clockwise, encoding turns the source counter-clockwise. With rotation
//! suppressed the grid is passed through as-is, but the header still has to
//! describe the grid that was actually written.

use std::io::{Read, Write};

use crate::core::error::{ConvertError, Result};
use crate::types::{LibraryImageHeader, PixelBuffer, Rotation};

/// Reads a library image whose magic has already been consumed.
pub fn decode<R: Read>(reader: &mut R, rotate: bool) -> Result<PixelBuffer> {
    let header = read_header(reader)?;
    let expected = header.payload_len();

    let mut payload = Vec::new();
    reader.take(expected).read_to_end(&mut payload)?;
    if (payload.len() as u64) < expected {
        return Err(ConvertError::TruncatedPayload {
            expected,
            actual: payload.len() as u64,
        });
    }

    let grid = PixelBuffer::new(header.columns as u32, header.rows as u32, payload)?;

    if rotate {
        Ok(grid.rotated(Rotation::Clockwise90))
    } else {
        Ok(grid)
    }
}

/// Reads the two dimension fields that follow the magic.
pub fn read_header<R: Read>(reader: &mut R) -> Result<LibraryImageHeader> {
    let mut fields = [0u8; 4];
    let mut filled = 0usize;

    while filled < fields.len() {
        let n = reader.read(&mut fields[filled..])?;
        if n == 0 {
            return Err(ConvertError::TruncatedPayload {
                expected: fields.len() as u64,
                actual: filled as u64,
            });
        }
        filled += n;
    }

    Ok(LibraryImageHeader::parse(&fields))
}

/// Encodes `image` into a complete library image.
pub fn encode(image: &PixelBuffer, rotate: bool) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_to(image, rotate, &mut out)?;
    Ok(out)
}

/// Writes `image` as a library image.
///
/// Dimensions are validated before the first byte reaches `writer`.
pub fn encode_to<W: Write>(image: &PixelBuffer, rotate: bool, writer: &mut W) -> Result<()> {
    if image.width() > u16::MAX as u32 || image.height() > u16::MAX as u32 {
        return Err(ConvertError::DimensionOverflow {
            width: image.width(),
            height: image.height(),
        });
    }

    let rotated;
    let grid = if rotate {
        rotated = image.rotated(Rotation::CounterClockwise90);
        &rotated
    } else {
        image
    };

    let header = LibraryImageHeader::for_grid(grid.width(), grid.height())?;
    writer.write_all(&header.to_bytes())?;
    writer.write_all(grid.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_header_short() {
        let mut data: &[u8] = &[0x02, 0x00, 0x03];
        let err = read_header(&mut data).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::TruncatedPayload {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_empty_image_round_trips() {
        let empty = PixelBuffer::new(0, 0, Vec::new()).unwrap();
        let bytes = encode(&empty, true).unwrap();
        assert_eq!(bytes.len(), 8);

        let decoded = decode(&mut &bytes[4..], true).unwrap();
        assert_eq!(decoded, empty);
    }
}
