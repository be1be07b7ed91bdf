use pocket_libimg::formats::{Classification, classify, read_magic};
use std::io::Read;

const MAGIC: [u8; 4] = [0x20, 0x49, 0x50, 0x41];

#[test]
fn test_classify_library_image() {
    assert_eq!(classify(&MAGIC), Classification::LibraryImage);
}

#[test]
fn test_classify_any_differing_byte_is_unknown() {
    for i in 0..4 {
        let mut magic = MAGIC;
        magic[i] ^= 0x01;
        assert_eq!(classify(&magic), Classification::Unknown, "byte {}", i);
    }
}

#[test]
fn test_classify_common_signatures_are_unknown() {
    assert_eq!(classify(&[0x89, 0x50, 0x4E, 0x47]), Classification::Unknown);
    assert_eq!(classify(&[0xFF, 0xD8, 0xFF, 0xE0]), Classification::Unknown);
    assert_eq!(classify(b"BM6\0"), Classification::Unknown);
}

#[test]
fn test_classify_is_idempotent() {
    let first = classify(&MAGIC);
    let second = classify(&MAGIC);
    assert_eq!(first, second);

    let other = [0x00, 0x49, 0x50, 0x41];
    assert_eq!(classify(&other), classify(&other));
}

#[test]
fn test_read_magic_leaves_stream_after_magic() {
    let data = [0x20, 0x49, 0x50, 0x41, 0x02, 0x00];
    let mut reader = &data[..];

    let magic = read_magic(&mut reader).unwrap();
    assert_eq!(magic, Some(MAGIC));

    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, vec![0x02, 0x00]);
}

#[test]
fn test_read_magic_short_stream() {
    let mut reader = &[0x20, 0x49][..];
    assert_eq!(read_magic(&mut reader).unwrap(), None);

    let mut empty: &[u8] = &[];
    assert_eq!(read_magic(&mut empty).unwrap(), None);
}
