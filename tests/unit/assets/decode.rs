use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let surface = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(surface.width(), 1);
    assert_eq!(surface.height(), 1);
    assert_eq!(
        surface.data(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_is_an_error() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn data_uri_round_trips_payload() {
    let bytes = png_bytes(2, 2, [1, 2, 3, 255]);
    let uri = encode_data_uri(sniff_mime(&bytes), &bytes);
    assert!(uri.starts_with("data:image/png;base64,"));
    assert_eq!(decode_data_uri(&uri).unwrap(), bytes);
}

#[test]
fn data_uri_rejects_non_base64() {
    assert!(decode_data_uri("data:text/plain,hello").is_err());
    assert!(decode_data_uri("https://example.com/a.png").is_err());
}

#[test]
fn unpremultiply_inverts_opaque_and_half_alpha() {
    let mut px = vec![10, 20, 30, 255, 64, 32, 0, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
    assert_eq!(&px[4..], &[128, 64, 0, 128]);
}
