use std::io::{self, Read};

use crate::types::LIBRARY_IMAGE_MAGIC;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    LibraryImage,
    /// Anything else; left to the generic raster decoder.
    Unknown,
}

#[inline]
pub fn classify(magic: &[u8; 4]) -> Classification {
    if *magic == LIBRARY_IMAGE_MAGIC {
        Classification::LibraryImage
    } else {
        Classification::Unknown
    }
}

/// Reads the first four bytes of `reader`.
///
/// Returns `None` when the stream ends earlier. The reader is left positioned
/// at byte 5 on success.
pub fn read_magic<R: Read>(reader: &mut R) -> io::Result<Option<[u8; 4]>> {
    let mut magic = [0u8; 4];
    let mut filled = 0;

    while filled < magic.len() {
        match reader.read(&mut magic[filled..]) {
            Ok(0) => return Ok(None),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(Some(magic))
}
