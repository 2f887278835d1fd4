use std::io::Cursor;

use super::*;
use crate::{layout::canvas::resolve_canvas, model::brand::Brand, model::slide::ThemeKind};

fn solid(w: u32, h: u32, rgb: [u8; 3]) -> Surface {
    Surface::filled(w, h, Rgba8Premul::from_straight_rgba(rgb[0], rgb[1], rgb[2], 255)).unwrap()
}

fn png(w: u32, h: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn icon_geometry_matches_bottom_right_reference() {
    let geo = icon_geometry(1080, 1920, IconPosition::BottomRight, true, Vec2::ZERO).unwrap();
    assert_eq!(geo.icon_size, 86);
    assert_eq!(geo.corner_radius, 19);
    let caption = geo.caption.unwrap();
    assert_eq!(caption.font_size, 24);
    assert_eq!(caption.width, 215);
    assert_eq!(caption.height, 38);
    // pad 43, gap 13, group 215 x (86 + 13 + 38)
    assert_eq!(caption.left, 1080 - 215 - 43);
    assert_eq!(geo.icon_left, 1080 - 215 - 43 + 65);
    assert_eq!(geo.icon_top, 1920 - 137 - 43);
    assert_eq!(caption.top, geo.icon_top + 86 + 13);
}

#[test]
fn icon_geometry_without_caption_hugs_the_corner() {
    let geo = icon_geometry(1080, 1080, IconPosition::TopLeft, false, Vec2::ZERO).unwrap();
    assert_eq!(geo.icon_size, 65);
    assert_eq!((geo.icon_left, geo.icon_top), (43, 43));
    assert!(geo.caption.is_none());
}

#[test]
fn icon_geometry_applies_offsets_and_centers_mid_right() {
    let base = icon_geometry(1080, 1920, IconPosition::MidRight, false, Vec2::ZERO).unwrap();
    assert_eq!(base.icon_size, 108);
    assert_eq!(base.icon_top, ((1920.0 - 108.0) / 2.0_f64).round() as i64);
    let moved =
        icon_geometry(1080, 1920, IconPosition::MidRight, false, Vec2::new(-20.0, 30.0)).unwrap();
    assert_eq!(moved.icon_left, base.icon_left - 20);
    assert_eq!(moved.icon_top, base.icon_top + 30);
}

#[test]
fn icon_geometry_rejects_empty_base() {
    assert!(matches!(
        icon_geometry(0, 100, IconPosition::BottomRight, false, Vec2::ZERO),
        Err(CarouselError::Layout(_))
    ));
}

#[test]
fn apply_icon_watermark_requires_a_decodable_base() {
    let raster = Rasterizer::new(&[]);
    let err = apply_icon_watermark(
        b"garbage",
        &png(4, 4, [255, 0, 0]),
        None,
        IconPosition::BottomRight,
        Vec2::ZERO,
        &raster,
    )
    .unwrap_err();
    assert!(matches!(err, CarouselError::Layout(_)));
}

#[test]
fn apply_icon_watermark_stamps_the_corner() {
    let raster = Rasterizer::new(&[]);
    let out = apply_icon_watermark(
        &png(200, 200, [0, 0, 0]),
        &png(10, 10, [255, 0, 0]),
        None,
        IconPosition::BottomRight,
        Vec2::ZERO,
        &raster,
    )
    .unwrap();
    let img = image::load_from_memory(&out).unwrap().to_rgba8();
    // icon 16px at (176, 176), pad 8
    assert_eq!(img.get_pixel(184, 184).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(10, 10).0, [0, 0, 0, 255]);
}

#[test]
fn figure_is_fitted_and_anchored_from_its_own_size() {
    let canvas = resolve_canvas("9:16");
    let img = solid(1000, 500, [9, 9, 9]);
    let layer = figure_layer(&img, &canvas, SizeTier::Medium, 24.0, FigureAnchor::BottomLeft).unwrap();
    let (bw, _) = figure_box(&canvas, SizeTier::Medium);
    assert_eq!(layer.surface.width(), bw);
    assert_eq!(layer.surface.height(), (f64::from(bw) / 2.0).round() as u32);
    assert_eq!(layer.left, 60);
    assert_eq!(
        layer.top,
        1920 - i64::from(layer.surface.height()) - 60
    );
    assert_eq!(layer.surface.pixel(0, 0).unwrap()[3], 0);
}

#[test]
fn anchors_cover_all_eight_positions() {
    let canvas = resolve_canvas("1:1");
    let size = (100, 100);
    assert_eq!(anchor_origin(FigureAnchor::TopCenter, &canvas, size, 10.0), (490, 10));
    assert_eq!(anchor_origin(FigureAnchor::CenterRight, &canvas, size, 10.0), (970, 490));
    assert_eq!(anchor_origin(FigureAnchor::BottomRight, &canvas, size, 10.0), (970, 970));
}

#[test]
fn background_overlay_darkens_edges_more_than_middle() {
    let canvas = resolve_canvas("1:1");
    let photo = solid(300, 300, [200, 200, 200]);
    let layer = background_photo_layer(&photo, &canvas, 1.0, 0).unwrap();
    let top = layer.surface.pixel(540, 0).unwrap();
    let mid = layer.surface.pixel(540, 540).unwrap();
    let bottom = layer.surface.pixel(540, 1079).unwrap();
    assert!(top[0] < mid[0]);
    assert!(bottom[0] < mid[0]);
    assert_eq!(mid[3], 255);
}

#[test]
fn zero_opacity_overlay_leaves_photo_untouched() {
    let canvas = resolve_canvas("1:1");
    let photo = solid(1080, 1080, [120, 60, 30]);
    let layer = background_photo_layer(&photo, &canvas, 0.0, 0).unwrap();
    assert_eq!(layer.surface.pixel(10, 10), Some([120, 60, 30, 255]));
}

#[test]
fn darken_layer_is_skipped_at_zero() {
    let canvas = resolve_canvas("1:1");
    assert!(darken_layer(&canvas, 0.0).unwrap().is_none());
    let layer = darken_layer(&canvas, 0.5).unwrap().unwrap();
    assert_eq!(layer.surface.pixel(0, 0).unwrap()[3], 128);
}

#[test]
fn fill_layer_follows_theme_gradient() {
    let canvas = resolve_canvas("1:1");
    let theme = Theme::resolve(&Brand::resolve(None), ThemeKind::Dark);
    let layer = fill_layer(&canvas, &theme).unwrap();
    let top = layer.surface.pixel(0, 0).unwrap();
    assert_eq!(&top[..3], &[theme.background.r, theme.background.g, theme.background.b]);
    let end = theme.background_end.unwrap();
    let bottom = layer.surface.pixel(0, 1079).unwrap();
    assert_eq!(&bottom[..3], &[end.r, end.g, end.b]);
}

#[test]
fn phone_mockup_rotation_grows_bounds() {
    let raster = Rasterizer::new(&[]);
    let theme = Theme::resolve(&Brand::resolve(None), ThemeKind::Dark);
    let shot = solid(60, 120, [0, 200, 0]);
    let parts = PhoneParts {
        screenshot: Some(&shot),
        frame: None,
    };
    let upright = phone_surface(parts, 200, &theme, &raster).unwrap();
    assert_eq!(upright.height(), 200);
    assert_eq!(upright.width(), 96);
    // screen center shows the screenshot
    assert_eq!(upright.pixel(48, 120), Some([0, 200, 0, 255]));

    let tilted = phone_layer_surface(parts, 200, -8.0, &theme, &raster).unwrap();
    assert!(tilted.width() > upright.width());
    assert!(tilted.height() > upright.height());
}

#[test]
fn brand_frame_is_drawn_over_the_screen() {
    let raster = Rasterizer::new(&[]);
    let theme = Theme::resolve(&Brand::resolve(None), ThemeKind::Dark);
    let frame = solid(10, 20, [5, 5, 5]);
    let parts = PhoneParts {
        screenshot: None,
        frame: Some(&frame),
    };
    let phone = phone_surface(parts, 100, &theme, &raster).unwrap();
    assert_eq!(phone.pixel(24, 50), Some([5, 5, 5, 255]));
}

#[test]
fn composite_respects_layer_order() {
    let mut base = solid(4, 4, [0, 0, 0]);
    let layers = vec![
        Layer::full(solid(4, 4, [255, 0, 0])),
        Layer::at(solid(2, 2, [0, 0, 255]), 1, 1),
    ];
    composite(&mut base, &layers).unwrap();
    assert_eq!(base.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(base.pixel(2, 2), Some([0, 0, 255, 255]));
    assert_eq!(layers[1].bounds(), Rect::new(1.0, 1.0, 3.0, 3.0));
}

#[test]
fn meme_captions_skip_when_empty() {
    let raster = Rasterizer::new(&[]);
    assert!(meme_caption_layer(100, 100, " ", "", &raster).unwrap().is_none());
    let layer = meme_caption_layer(200, 200, "top", "bottom", &raster).unwrap().unwrap();
    assert_eq!(layer.surface.width(), 200);
}
