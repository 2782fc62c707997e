use std::io::Cursor;
use std::path::PathBuf;

use super::*;
use crate::raster::channels::ChannelCount;

#[test]
fn decode_expands_luma_to_rgba() {
    let img = image::GrayImage::from_raw(2, 1, vec![17, 99]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let raw = decode_raw(&buf).unwrap();
    assert_eq!((raw.width(), raw.height()), (2, 1));
    assert_eq!(raw.as_rgba(), &[17, 17, 17, 255, 99, 99, 99, 255]);
    assert_eq!(raw.channel_count(), ChannelCount::Gray);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_raw(b"not an image").is_err());
}

#[test]
fn load_reports_path_on_failure() {
    let err = load_raw(&PathBuf::from("target/does/not/exist.png")).unwrap_err();
    assert!(err.diagnostic().contains("failed to load 'target/does/not/exist.png'"));
}

#[test]
fn save_then_load_keeps_compact_layout() {
    let dir = PathBuf::from("target").join("raster_io");
    let path = dir.join("gray_alpha.png");
    let _ = std::fs::remove_file(&path);

    let img = CompactImage::new(2, 2, 2, vec![10, 255, 20, 0, 30, 128, 40, 255]).unwrap();
    save_png(&path, &img).unwrap();

    let back = load_raw(&path).unwrap();
    assert_eq!(back.channel_count(), ChannelCount::GrayAlpha);
    assert_eq!(back.to_compact(), img);
}

#[test]
fn save_rejects_wide_images() {
    let img = CompactImage::filled(1, 1, 5, 0).unwrap();
    let err = save_png(&PathBuf::from("target/raster_io/wide.png"), &img).unwrap_err();
    assert!(err.to_string().contains("5-channel"));
}
