use image::{ImageBuffer, Rgba, imageops};

use crate::core::error::{ConvertError, Result};

/// Leading bytes of every library image.
pub const LIBRARY_IMAGE_MAGIC: [u8; 4] = [0x20, 0x49, 0x50, 0x41];
/// Magic plus the two 16-bit dimension fields.
pub const HEADER_LEN: usize = 8;
pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// +90°, applied when decoding a library image.
    Clockwise90,
    /// −90°, applied when encoding a library image.
    CounterClockwise90,
}

/// What a conversion produced, and therefore which extension its file gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    LibraryImage,
    Bitmap,
}

impl OutputKind {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::LibraryImage => "bin",
            OutputKind::Bitmap => "bmp",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::LibraryImage => write!(f, "library image"),
            OutputKind::Bitmap => write!(f, "bitmap"),
        }
    }
}

/// Byte length of a `width` x `height` BGRA grid, `None` on overflow.
pub fn pixel_bytes(width: u64, height: u64) -> Option<u64> {
    width
        .checked_mul(height)?
        .checked_mul(BYTES_PER_PIXEL as u64)
}

/// Row-major BGRA8888 pixel grid.
///
/// Every transform returns a new buffer; nothing mutates a buffer in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps `data`, which must hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let actual = data.len() as u64;
        match pixel_bytes(width as u64, height as u64) {
            Some(expected) if expected == actual => Ok(Self {
                width,
                height,
                data,
            }),
            Some(expected) => Err(ConvertError::BufferSizeMismatch { expected, actual }),
            None => Err(ConvertError::BufferSizeMismatch {
                expected: u64::MAX,
                actual,
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// BGRA value at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.data[start..start + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Returns a rotated copy; width and height swap.
    pub fn rotated(&self, rotation: Rotation) -> PixelBuffer {
        // Rgba is only used as a 4-byte container here, rotation never looks at channels.
        let view: ImageBuffer<Rgba<u8>, &[u8]> =
            ImageBuffer::from_raw(self.width, self.height, self.data.as_slice())
                .expect("buffer length is validated in PixelBuffer::new - this is a bug");

        let out = match rotation {
            Rotation::Clockwise90 => imageops::rotate90(&view),
            Rotation::CounterClockwise90 => imageops::rotate270(&view),
        };

        PixelBuffer {
            width: out.width(),
            height: out.height(),
            data: out.into_raw(),
        }
    }
}

/// Dimension fields of a library image header.
///
/// `rows` is stored first (`dimA`), `columns` second (`dimB`). The payload is a
/// `rows` x `columns` grid that still needs a clockwise turn to be displayed
/// upright, so the displayed width equals `rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryImageHeader {
    pub rows: u16,
    pub columns: u16,
}

impl LibraryImageHeader {
    /// Builds a header for a payload grid, failing if a side exceeds `u16::MAX`.
    pub fn for_grid(columns: u32, rows: u32) -> Result<Self> {
        match (u16::try_from(rows), u16::try_from(columns)) {
            (Ok(rows), Ok(columns)) => Ok(Self { rows, columns }),
            _ => Err(ConvertError::DimensionOverflow {
                width: columns,
                height: rows,
            }),
        }
    }

    /// Parses the four dimension bytes that follow the magic.
    pub fn parse(fields: &[u8; 4]) -> Self {
        Self {
            rows: u16::from_le_bytes([fields[0], fields[1]]),
            columns: u16::from_le_bytes([fields[2], fields[3]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(&LIBRARY_IMAGE_MAGIC);
        out[4..6].copy_from_slice(&self.rows.to_le_bytes());
        out[6..8].copy_from_slice(&self.columns.to_le_bytes());
        out
    }

    pub fn payload_len(&self) -> u64 {
        self.rows as u64 * self.columns as u64 * BYTES_PER_PIXEL as u64
    }
}
