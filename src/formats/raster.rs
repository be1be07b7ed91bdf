//! Generic raster images, backed by the `image` crate.

use std::io::Cursor;

use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};

use crate::core::error::Result;
use crate::types::{BYTES_PER_PIXEL, PixelBuffer};

/// Decodes any supported raster format into a BGRA buffer.
///
/// Returns `Ok(None)` when the data is not recognised as an image at all.
/// Data that looks like a known format but fails to decode is an error.
pub fn decode_bgra(bytes: &[u8]) -> Result<Option<PixelBuffer>> {
    let format = match image::guess_format(bytes) {
        Ok(format) => format,
        Err(_) => return Ok(None),
    };

    let img = match image::load_from_memory_with_format(bytes, format) {
        Ok(img) => img,
        // Signature matched a format this build has no decoder for.
        Err(ImageError::Unsupported(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut data = rgba.into_raw();
    swap_red_blue(&mut data);

    Ok(Some(PixelBuffer::new(width, height, data)?))
}

/// Encodes a BGRA buffer as a 32-bit BMP.
pub fn encode_bitmap(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut data = buffer.as_bytes().to_vec();
    swap_red_blue(&mut data);

    let rgba = RgbaImage::from_raw(buffer.width(), buffer.height(), data)
        .expect("buffer length is validated in PixelBuffer::new - this is a bug");

    let mut out = Vec::new();
    DynamicImage::ImageRgba8(rgba).write_to(&mut Cursor::new(&mut out), ImageFormat::Bmp)?;
    Ok(out)
}

/// RGBA <-> BGRA, in place on a freshly owned copy.
fn swap_red_blue(data: &mut [u8]) {
    for px in data.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognised_bytes_are_not_an_image() {
        assert!(decode_bgra(b"plain text, not a picture").unwrap().is_none());
        assert!(decode_bgra(&[]).unwrap().is_none());
    }

    #[test]
    fn test_bitmap_keeps_channel_order() {
        // blue, green, red, alpha
        let buffer = PixelBuffer::new(2, 1, vec![0x10, 0x20, 0x30, 0xFF, 0xA0, 0xB0, 0xC0, 0xFF])
            .unwrap();
        let bmp = encode_bitmap(&buffer).unwrap();
        assert_eq!(&bmp[..2], b"BM");

        let decoded = decode_bgra(&bmp).unwrap().unwrap();
        assert_eq!(decoded, buffer);
    }
}
