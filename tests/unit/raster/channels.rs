use super::*;

fn raw(pixels: &[[u8; 4]]) -> RawImage {
    let rgba = pixels.iter().flatten().copied().collect();
    RawImage::new(pixels.len() as u32, 1, rgba).unwrap()
}

#[test]
fn opaque_gray_is_one_channel() {
    let img = raw(&[[10, 10, 10, 255], [200, 200, 200, 255], [0, 0, 0, 255]]);
    assert_eq!(img.channel_count(), ChannelCount::Gray);
    assert_eq!(img.channel_count().get(), 1);
}

#[test]
fn gray_with_any_transparency_is_two_channels() {
    let img = raw(&[[10, 10, 10, 255], [200, 200, 200, 254]]);
    assert_eq!(img.channel_count(), ChannelCount::GrayAlpha);
}

#[test]
fn opaque_color_is_three_channels() {
    let img = raw(&[[10, 10, 10, 255], [200, 10, 200, 255]]);
    assert_eq!(img.channel_count(), ChannelCount::Color);
}

#[test]
fn translucent_color_is_four_channels() {
    let img = raw(&[[1, 2, 3, 0], [9, 9, 9, 128], [4, 4, 5, 254]]);
    assert_eq!(img.channel_count(), ChannelCount::ColorAlpha);
}

#[test]
fn classification_ignores_pixel_order() {
    let a = raw(&[[1, 2, 3, 255], [7, 7, 7, 10]]);
    let b = raw(&[[7, 7, 7, 10], [1, 2, 3, 255]]);
    assert_eq!(a.channel_count(), b.channel_count());
}

#[test]
fn two_channel_repack_takes_alpha_not_green() {
    let img = raw(&[[50, 50, 50, 7], [60, 60, 60, 255]]);
    let packed = repack(&img, ChannelCount::GrayAlpha);
    assert_eq!(packed.channels(), 2);
    assert_eq!(packed.as_bytes(), &[50, 7, 60, 255]);
}

#[test]
fn repack_copies_leading_channels_in_order() {
    let img = raw(&[[1, 2, 3, 4], [5, 6, 7, 8]]);
    assert_eq!(repack(&img, ChannelCount::Gray).as_bytes(), &[1, 5]);
    assert_eq!(
        repack(&img, ChannelCount::Color).as_bytes(),
        &[1, 2, 3, 5, 6, 7]
    );
    assert_eq!(
        repack(&img, ChannelCount::ColorAlpha).as_bytes(),
        img.as_rgba()
    );
}

#[test]
fn repack_then_expand_keeps_classification() {
    let cases = [
        raw(&[[9, 9, 9, 255], [100, 100, 100, 255]]),
        raw(&[[9, 9, 9, 3], [100, 100, 100, 255]]),
        raw(&[[9, 8, 9, 255], [100, 100, 100, 255]]),
        raw(&[[9, 8, 9, 3], [100, 1, 100, 0]]),
    ];
    for img in cases {
        let count = img.channel_count();
        let expanded = img.to_compact().to_raw().unwrap();
        assert_eq!(expanded.channel_count(), count);
        assert_eq!(expanded.to_compact(), img.to_compact());
    }
}

#[test]
fn buffer_length_is_checked() {
    assert!(RawImage::new(2, 2, vec![0; 15]).is_err());
    assert!(CompactImage::new(2, 2, 3, vec![0; 11]).is_err());
    assert!(CompactImage::new(2, 2, 0, vec![]).is_err());
}

#[test]
fn inverted_complements_every_byte() {
    let img = CompactImage::new(2, 1, 1, vec![0, 200]).unwrap();
    assert_eq!(img.inverted().as_bytes(), &[255, 55]);
}
