use image::{ImageFormat, Rgba, RgbaImage};
use pocket_libimg::formats::{pocket, raster};
use pocket_libimg::{
    CancellationToken, Classification, ConversionDispatcher, ConvertError, ConvertOptions,
    OutputKind, PixelBuffer,
};
use std::io::Cursor;

fn sample_png(width: u32, height: u32) -> (Vec<u8>, RgbaImage) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 40) as u8, (y * 60) as u8, 0x7F, 0xFF])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    (bytes, img)
}

fn library_blob(rows: u16, columns: u16) -> Vec<u8> {
    let mut blob = vec![0x20, 0x49, 0x50, 0x41];
    blob.extend_from_slice(&rows.to_le_bytes());
    blob.extend_from_slice(&columns.to_le_bytes());
    for i in 0..(rows as u32 * columns as u32) {
        blob.extend_from_slice(&[i as u8, 0x11, 0x22, 0xFF]);
    }
    blob
}

#[test]
fn test_library_image_becomes_bitmap() {
    let dispatcher = ConversionDispatcher::new(&ConvertOptions::default());
    let converted = dispatcher
        .process_bytes(&library_blob(2, 3), &CancellationToken::new())
        .unwrap();

    assert_eq!(converted.kind, OutputKind::Bitmap);
    assert_eq!(converted.extension(), "bmp");
    assert_eq!(converted.source, Classification::LibraryImage);
    assert_eq!(&converted.bytes[..2], b"BM");

    let bitmap = raster::decode_bgra(&converted.bytes).unwrap().unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (2, 3));
    assert_eq!(bitmap.pixel(0, 0), Some([3, 0x11, 0x22, 0xFF]));
}

#[test]
fn test_library_image_without_rotation() {
    let dispatcher = ConversionDispatcher::new(&ConvertOptions::new().without_rotation());
    let converted = dispatcher
        .process_bytes(&library_blob(2, 3), &CancellationToken::new())
        .unwrap();

    let bitmap = raster::decode_bgra(&converted.bytes).unwrap().unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (3, 2));
    assert_eq!(bitmap.pixel(0, 0), Some([0, 0x11, 0x22, 0xFF]));
}

#[test]
fn test_png_becomes_library_image() {
    let (png, original) = sample_png(3, 2);
    let dispatcher = ConversionDispatcher::new(&ConvertOptions::default());
    let converted = dispatcher
        .process_bytes(&png, &CancellationToken::new())
        .unwrap();

    assert_eq!(converted.kind, OutputKind::LibraryImage);
    assert_eq!(converted.extension(), "bin");
    assert_eq!(converted.source, Classification::Unknown);
    assert_eq!(&converted.bytes[..8], &[0x20, 0x49, 0x50, 0x41, 3, 0, 2, 0]);

    let decoded: PixelBuffer = pocket::decode(&mut &converted.bytes[4..], true).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3, 2));
    for (x, y, px) in original.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        assert_eq!(decoded.pixel(x, y), Some([b, g, r, a]));
    }
}

#[test]
fn test_png_round_trips_through_both_directions() {
    let (png, _) = sample_png(4, 5);
    let dispatcher = ConversionDispatcher::new(&ConvertOptions::default());
    let token = CancellationToken::new();

    let blob = dispatcher.process_bytes(&png, &token).unwrap();
    let bmp = dispatcher.process_bytes(&blob.bytes, &token).unwrap();

    let from_png = raster::decode_bgra(&png).unwrap().unwrap();
    let from_bmp = raster::decode_bgra(&bmp.bytes).unwrap().unwrap();
    assert_eq!(from_bmp, from_png);
}

#[test]
fn test_non_image_is_unrecognized() {
    let dispatcher = ConversionDispatcher::new(&ConvertOptions::default());
    let err = dispatcher
        .process_bytes(b"just some notes about the library", &CancellationToken::new())
        .unwrap_err();

    assert!(matches!(err, ConvertError::UnrecognizedFormat));
    assert!(err.is_skippable());
}

#[test]
fn test_tiny_input_is_unrecognized() {
    let dispatcher = ConversionDispatcher::new(&ConvertOptions::default());
    let err = dispatcher
        .process_bytes(&[0x20, 0x49], &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnrecognizedFormat));
}

#[test]
fn test_truncated_library_image_is_reported() {
    let mut blob = library_blob(10, 10);
    blob.truncate(8 + 100);

    let dispatcher = ConversionDispatcher::new(&ConvertOptions::default());
    let err = dispatcher
        .process_bytes(&blob, &CancellationToken::new())
        .unwrap_err();

    assert!(matches!(
        err,
        ConvertError::TruncatedPayload {
            expected: 400,
            actual: 100
        }
    ));
    assert!(!err.is_skippable());
}

#[test]
fn test_cancelled_token_stops_before_reading() {
    let token = CancellationToken::new();
    token.cancel();

    let dispatcher = ConversionDispatcher::new(&ConvertOptions::default());
    let err = dispatcher
        .process_bytes(&library_blob(1, 1), &token)
        .unwrap_err();
    assert!(matches!(err, ConvertError::Cancelled));
}
