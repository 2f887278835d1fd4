use super::*;
use crate::{
    foundation::core::Rgba8Premul,
    layout::{
        canvas::{AspectRatio, SafeZone},
        text::estimate_width,
    },
    model::slide::SlideCopy,
};

fn mockup(layout: MockupLayout, headline: &str) -> MockupSlide {
    MockupSlide {
        copy: SlideCopy {
            micro_label: "mindset".into(),
            headline: headline.into(),
            body: "Short daily reps that build focus.".into(),
            highlight_phrase: None,
        },
        mockup_layout: layout,
        ..MockupSlide::default()
    }
}

fn setup() -> (CanvasSpec, Theme, Rasterizer) {
    let brand = Brand::resolve(None);
    (
        CanvasSpec::for_aspect(AspectRatio::Portrait9x16),
        Theme::resolve(&brand, Default::default()),
        Rasterizer::default(),
    )
}

fn solid(w: u32, h: u32) -> Surface {
    Surface::filled(w, h, Rgba8Premul::from_straight_rgba(0, 180, 90, 255)).unwrap()
}

#[test]
fn text_statement_spans_the_safe_zone() {
    let (canvas, theme, raster) = setup();
    let slide = mockup(MockupLayout::TextStatement, "Train your mind like a muscle");
    let plan = plan_slide(&slide, &canvas, &theme, &SlideInputs::default(), &raster).unwrap();

    assert_eq!(plan.text.base.x, 90.0);
    assert_eq!(plan.text.max_width, 900.0);
    let headline = plan.text.headline.as_ref().unwrap();
    let block = &headline.block;
    assert!(
        block
            .lines
            .iter()
            .all(|l| estimate_width(l, block.font_size, block.bold) <= 900.0)
    );
    // fill + text
    assert_eq!(plan.layers.len(), 2);
}

#[test]
fn headline_only_block_is_centered_in_the_safe_zone() {
    let (canvas, theme, raster) = setup();
    let mut slide = mockup(MockupLayout::TextStatement, "Focus wins");
    slide.copy.micro_label.clear();
    slide.copy.body.clear();
    let plan = plan_slide(&slide, &canvas, &theme, &SlideInputs::default(), &raster).unwrap();

    let headline = plan.text.headline.unwrap();
    let center = headline.origin.y + headline.block.height() / 2.0;
    assert!((center - 920.0).abs() < 1e-6, "center {center}");
    assert!(plan.text.micro.is_none());
    assert!(plan.text.body.is_none());
}

#[test]
fn stacked_blocks_keep_their_gaps() {
    let (canvas, theme, raster) = setup();
    let slide = mockup(MockupLayout::TextStatement, "Focus wins");
    let plan = plan_slide(&slide, &canvas, &theme, &SlideInputs::default(), &raster).unwrap();

    let micro = plan.text.micro.unwrap();
    let headline = plan.text.headline.unwrap();
    let body = plan.text.body.unwrap();
    assert_eq!(micro.block.lines, vec!["MINDSET".to_string()]);
    assert!((headline.origin.y - (micro.origin.y + micro.block.height() + 28.0)).abs() < 1e-9);
    assert!((body.origin.y - (headline.origin.y + headline.block.height() + 36.0)).abs() < 1e-9);
    assert!(body.block.line_height > headline.block.line_height);
}

#[test]
fn phone_right_keeps_text_left_of_the_device() {
    let (canvas, theme, raster) = setup();
    let slide = mockup(MockupLayout::PhoneRight, "Your brain on a training plan");
    let inputs = SlideInputs {
        image: Some(solid(300, 600)),
        ..SlideInputs::default()
    };
    let plan = plan_slide(&slide, &canvas, &theme, &inputs, &raster).unwrap();

    let phone = plan.layers[1].bounds();
    assert_eq!(plan.text.base.x, 90.0);
    assert!(plan.text.max_width >= MIN_TEXT_WIDTH);
    assert!(plan.text.max_width <= 1080.0 * TEXT_COLUMN_SHARE);
    assert!(plan.text.base.x + plan.text.max_width + INSET_GAP <= phone.x0 + 1e-9);
    assert!(phone.x1 <= 1080.0);
}

#[test]
fn phone_left_starts_text_past_the_device() {
    let (canvas, theme, raster) = setup();
    let slide = mockup(MockupLayout::PhoneLeft, "Your brain on a training plan");
    let inputs = SlideInputs {
        image: Some(solid(300, 600)),
        ..SlideInputs::default()
    };
    let plan = plan_slide(&slide, &canvas, &theme, &inputs, &raster).unwrap();

    let phone = plan.layers[1].bounds();
    assert!(phone.x0 < 100.0);
    assert!(plan.text.base.x >= phone.x1 + INSET_GAP - 1e-9);
    assert!(plan.text.base.x + plan.text.max_width <= 990.0 + 1e-9);
}

#[test]
fn highlight_follows_style() {
    let (canvas, theme, raster) = setup();
    let mut slide = mockup(MockupLayout::TextStatement, "Train your mind daily");
    slide.copy.highlight_phrase = Some("mind".into());

    let plan = plan_slide(&slide, &canvas, &theme, &SlideInputs::default(), &raster).unwrap();
    assert_eq!(plan.text.highlights.len(), 1);
    let region = plan.text.highlights[0];
    let headline = plan.text.headline.as_ref().unwrap();
    assert!(region.x > headline.origin.x);

    slide.highlight_style = HighlightStyle::Off;
    let plan = plan_slide(&slide, &canvas, &theme, &SlideInputs::default(), &raster).unwrap();
    assert!(plan.text.highlights.is_empty());
}

#[test]
fn element_offsets_move_single_blocks() {
    let (canvas, theme, raster) = setup();
    let mut slide = mockup(MockupLayout::TextStatement, "Focus wins");
    slide.offsets.headline_offset_x = Some(20.0);
    slide.offsets.headline_offset_y = Some(-10.0);
    let moved = plan_slide(&slide, &canvas, &theme, &SlideInputs::default(), &raster).unwrap();
    let still = plan_slide(
        &mockup(MockupLayout::TextStatement, "Focus wins"),
        &canvas,
        &theme,
        &SlideInputs::default(),
        &raster,
    )
    .unwrap();

    let (a, b) = (moved.text.headline.unwrap(), still.text.headline.unwrap());
    assert_eq!(a.origin.x, b.origin.x + 20.0);
    assert_eq!(a.origin.y, b.origin.y - 10.0);
    assert_eq!(moved.text.micro.unwrap().origin, still.text.micro.unwrap().origin);
}

#[test]
fn layer_stack_orders_background_darken_text_icon() {
    let (canvas, theme, raster) = setup();
    let mut slide = mockup(MockupLayout::TextStatement, "Focus wins");
    slide.overlay_darken = 0.3;
    let inputs = SlideInputs {
        icon: Some(IconStamp {
            image: solid(10, 10),
            caption: None,
            position: IconPosition::BottomRight,
        }),
        ..SlideInputs::default()
    };
    let plan = plan_slide(&slide, &canvas, &theme, &inputs, &raster).unwrap();

    assert_eq!(plan.layers.len(), 4);
    assert_eq!(plan.layers[1].surface.pixel(0, 0), Some([0, 0, 0, 77]));
    let icon = plan.layers[3].bounds();
    assert_eq!((icon.x0, icon.y0), (951.0, 1791.0));
    assert_eq!((icon.width(), icon.height()), (86.0, 86.0));
}

#[test]
fn background_usage_puts_photo_under_the_text() {
    let (canvas, theme, raster) = setup();
    let mut slide = mockup(MockupLayout::PhoneRight, "Focus wins");
    slide.image_usage = ImageUsage::Background;
    slide.bg_overlay_opacity = 0.0;
    let inputs = SlideInputs {
        image: Some(solid(20, 20)),
        ..SlideInputs::default()
    };
    let plan = plan_slide(&slide, &canvas, &theme, &inputs, &raster).unwrap();

    let bg = &plan.layers[1];
    assert_eq!((bg.surface.width(), bg.surface.height()), (1080, 1920));
    assert_eq!(bg.surface.pixel(540, 960), Some([0, 180, 90, 255]));
    assert_eq!(plan.text.base.x, 90.0);
}

#[test]
fn empty_copy_renders_only_the_fill() {
    let (canvas, theme, raster) = setup();
    let slide = MockupSlide {
        mockup_layout: MockupLayout::TextStatement,
        ..MockupSlide::default()
    };
    let plan = plan_slide(&slide, &canvas, &theme, &SlideInputs::default(), &raster).unwrap();
    assert_eq!(plan.layers.len(), 1);

    let out = compose(&plan).unwrap();
    let bg = theme.background;
    assert_eq!(out.pixel(0, 0), Some([bg.r, bg.g, bg.b, 255]));
}

#[test]
fn degenerate_canvas_is_a_layout_error() {
    let (_, theme, raster) = setup();
    let canvas = CanvasSpec {
        width: 100,
        height: 100,
        safe_zone: SafeZone {
            top: 60,
            bottom: 60,
            left: 10,
            right: 10,
        },
    };
    let slide = mockup(MockupLayout::TextStatement, "Focus");
    let err = plan_slide(&slide, &canvas, &theme, &SlideInputs::default(), &raster).unwrap_err();
    assert!(matches!(err, crate::foundation::error::CarouselError::Layout(_)));
}

#[test]
fn rendering_is_deterministic() {
    let (_, _, raster) = setup();
    let brand = Brand::resolve(None);
    let mut slide = mockup(MockupLayout::PhoneRight, "Train your mind daily");
    slide.copy.highlight_phrase = Some("mind".into());
    slide.aspect_ratio = AspectRatio::Square;
    let inputs = SlideInputs {
        image: Some(solid(60, 120)),
        ..SlideInputs::default()
    };

    let a = render_mockup(&slide, &brand, &inputs, &raster).unwrap();
    let b = render_mockup(&slide, &brand, &inputs, &raster).unwrap();
    assert_eq!((a.width(), a.height()), (1080, 1080));
    assert_eq!(a.data(), b.data());
}
