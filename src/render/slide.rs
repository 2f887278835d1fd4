//! Mockup slide rendering.
//!
//! [`plan_slide`] turns a slide, canvas, theme and decoded inputs into a [`RenderPlan`]: the text
//! geometry plus the ordered layer stack. [`render_slide`] composites that plan. Both are pure: the
//! same inputs always produce the same pixels.

use std::fmt::Write as _;

use crate::{
    foundation::{
        core::{Point, Rgb8},
        error::CarouselResult,
    },
    layout::{
        canvas::CanvasSpec,
        text::{HighlightRegion, TextBlock, highlight_regions},
    },
    model::{
        brand::Brand,
        slide::{FigureAnchor, HighlightStyle, IconPosition, ImageUsage, MockupLayout, MockupSlide, TextElement},
    },
    render::{
        layers::{
            Layer, PhoneParts, background_photo_layer, composite, darken_layer, figure_layer,
            fill_layer, icon_watermark_layers, phone_height, phone_layer_surface,
        },
        raster::{Rasterizer, escape_xml, svg_open},
        surface::Surface,
        theme::Theme,
    },
};

pub const MICRO_FONT_SIZE: f64 = 28.0;
const MICRO_LINE_HEIGHT: f64 = 1.2;
const HEADLINE_LINE_HEIGHT: f64 = 1.1;
const BODY_LINE_HEIGHT: f64 = 1.35;
const MICRO_GAP: f64 = 28.0;
const BODY_GAP: f64 = 36.0;
/// Space between the text column and a side inset.
pub const INSET_GAP: f64 = 48.0;
pub const MIN_TEXT_WIDTH: f64 = 260.0;
/// Share of the canvas width the text column may take in side layouts.
pub const TEXT_COLUMN_SHARE: f64 = 0.65;
const PHONE_EDGE_INSET: f64 = 40.0;

/// Decoded images a mockup slide draws with.
#[derive(Clone, Debug, Default)]
pub struct SlideInputs {
    /// Screenshot, figure or background photo, interpreted through `imageUsage`.
    pub image: Option<Surface>,
    pub phone_frame: Option<Surface>,
    pub icon: Option<IconStamp>,
}

#[derive(Clone, Debug)]
pub struct IconStamp {
    pub image: Surface,
    pub caption: Option<String>,
    pub position: IconPosition,
}

/// A wrapped block with its top-left corner on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBlock {
    pub block: TextBlock,
    pub origin: Point,
    pub color: Rgb8,
    pub weight: u16,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextPlan {
    /// Column origin before per-element offsets.
    pub base: Point,
    pub max_width: f64,
    pub micro: Option<PlacedBlock>,
    pub headline: Option<PlacedBlock>,
    pub body: Option<PlacedBlock>,
    pub highlights: Vec<HighlightRegion>,
}

#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub canvas: CanvasSpec,
    pub layout: MockupLayout,
    pub text: TextPlan,
    /// Bottom to top: background, inset, darken, text, icon.
    pub layers: Vec<Layer>,
}

struct Column {
    left: f64,
    width: f64,
}

fn side_column(layout: MockupLayout, canvas: &CanvasSpec, inset: Option<&Layer>) -> Column {
    let w = f64::from(canvas.width);
    let sz = canvas.safe_zone;
    let (safe_left, safe_right) = (f64::from(sz.left), w - f64::from(sz.right));
    let max_width = w * TEXT_COLUMN_SHARE;

    match (layout, inset) {
        (MockupLayout::PhoneLeft, Some(inset)) => {
            let left = (inset.bounds().x1 + INSET_GAP)
                .min(safe_right - MIN_TEXT_WIDTH)
                .max(safe_left);
            Column {
                left,
                width: (safe_right - left).min(max_width),
            }
        }
        (MockupLayout::PhoneLeft, None) => {
            let left = w * (1.0 - TEXT_COLUMN_SHARE);
            Column {
                left,
                width: safe_right - left,
            }
        }
        (_, Some(inset)) => Column {
            left: safe_left,
            width: (inset.bounds().x0 - INSET_GAP - safe_left).clamp(MIN_TEXT_WIDTH, max_width),
        },
        (_, None) => Column {
            left: safe_left,
            width: max_width - safe_left,
        },
    }
}

fn inset_layer(
    slide: &MockupSlide,
    canvas: &CanvasSpec,
    theme: &Theme,
    inputs: &SlideInputs,
    raster: &Rasterizer,
) -> CarouselResult<Option<Layer>> {
    let side_layout = slide.mockup_layout != MockupLayout::TextStatement;
    match slide.image_usage {
        ImageUsage::Phone if side_layout => {
            let parts = PhoneParts {
                screenshot: inputs.image.as_ref(),
                frame: inputs.phone_frame.as_ref(),
            };
            let height = phone_height(canvas, slide.phone_size);
            let phone = phone_layer_surface(parts, height, slide.phone_angle, theme, raster)?;
            let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
            let (pw, ph) = (f64::from(phone.width()), f64::from(phone.height()));
            let left = match slide.mockup_layout {
                MockupLayout::PhoneLeft => PHONE_EDGE_INSET,
                _ => w - pw - PHONE_EDGE_INSET,
            };
            let top = ((h - ph) / 2.0).round();
            Ok(Some(Layer::at(phone, left.round() as i64, top as i64)))
        }
        ImageUsage::Figure => {
            let Some(image) = inputs.image.as_ref() else {
                tracing::debug!("figure slide without an image, skipping inset");
                return Ok(None);
            };
            let anchor = match slide.mockup_layout {
                MockupLayout::PhoneRight => FigureAnchor::CenterRight,
                MockupLayout::PhoneLeft => FigureAnchor::CenterLeft,
                MockupLayout::TextStatement => slide.figure_position,
            };
            figure_layer(image, canvas, slide.figure_size, slide.figure_border_radius, anchor)
                .map(Some)
        }
        _ => Ok(None),
    }
}

fn stack_blocks(
    slide: &MockupSlide,
    theme: &Theme,
    canvas: &CanvasSpec,
    column: &Column,
) -> TextPlan {
    let copy = &slide.copy;
    let layout = |text: &str, size: f64, line_height: f64, bold: bool| {
        let text = text.trim();
        (!text.is_empty()).then(|| TextBlock::layout(text, size, line_height, column.width, bold))
    };
    let micro = layout(&copy.micro_label.to_uppercase(), MICRO_FONT_SIZE, MICRO_LINE_HEIGHT, true);
    let headline = layout(&copy.headline, slide.headline_font_size, HEADLINE_LINE_HEIGHT, true);
    let body = layout(&copy.body, slide.body_font_size, BODY_LINE_HEIGHT, false);

    // Gaps only separate blocks that are both present.
    let stacked: Vec<(f64, f64)> = [(&micro, MICRO_GAP), (&headline, BODY_GAP), (&body, 0.0)]
        .into_iter()
        .filter_map(|(block, gap)| block.as_ref().map(|b| (b.height(), gap)))
        .collect();
    let total: f64 = stacked.iter().map(|(h, _)| h).sum::<f64>()
        + stacked
            .iter()
            .take(stacked.len().saturating_sub(1))
            .map(|(_, gap)| gap)
            .sum::<f64>();

    let sz = canvas.safe_zone;
    let usable_top = f64::from(sz.top);
    let usable_h = f64::from(canvas.height) - f64::from(sz.top) - f64::from(sz.bottom);
    let base = Point::new(column.left, (usable_top + (usable_h - total) / 2.0).max(usable_top));

    let mut cursor = base.y;
    let mut place = |block: Option<TextBlock>, gap: f64, element: TextElement, color: Rgb8, weight: u16| {
        block.map(|block| {
            let offset = slide.offsets.for_element(element);
            let origin = Point::new(base.x + offset.x, cursor + offset.y);
            cursor += block.height() + gap;
            PlacedBlock {
                block,
                origin,
                color,
                weight,
            }
        })
    };
    let micro = place(micro, MICRO_GAP, TextElement::Micro, theme.micro, 700);
    let headline = place(headline, BODY_GAP, TextElement::Headline, theme.text, 800);
    let body = place(body, 0.0, TextElement::Body, theme.body, 400);

    let highlights = match (&headline, slide.highlight_style) {
        (Some(h), HighlightStyle::Subtle | HighlightStyle::Solid) => {
            highlight_regions(&h.block, copy.highlight(), h.origin)
        }
        _ => Vec::new(),
    };

    TextPlan {
        base,
        max_width: column.width,
        micro,
        headline,
        body,
        highlights,
    }
}

fn text_svg(plan: &TextPlan, canvas: &CanvasSpec, theme: &Theme, style: HighlightStyle) -> Option<String> {
    let blocks: Vec<&PlacedBlock> = [&plan.micro, &plan.headline, &plan.body]
        .into_iter()
        .flatten()
        .collect();
    if blocks.is_empty() {
        return None;
    }

    let mut svg = svg_open(canvas.width, canvas.height);
    let highlight_opacity = match style {
        HighlightStyle::Solid => 1.0,
        _ => 0.28,
    };
    for region in &plan.highlights {
        let _ = write!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="8" fill="{}" fill-opacity="{highlight_opacity}"/>"#,
            region.x,
            region.y,
            region.width,
            region.height,
            theme.accent.to_hex(),
        );
    }

    let family = escape_xml(&theme.font_stack());
    for placed in blocks {
        let spacing = if placed.weight == 700 { r#" letter-spacing="3""# } else { "" };
        for (i, line) in placed.block.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let _ = write!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" font-family="{family}" font-size="{}" font-weight="{}" fill="{}"{spacing}>{}</text>"#,
                placed.origin.x,
                placed.origin.y + placed.block.baseline(i),
                placed.block.font_size,
                placed.weight,
                placed.color.to_hex(),
                escape_xml(line),
            );
        }
    }
    svg.push_str("</svg>");
    Some(svg)
}

/// Derive the text geometry and ordered layer stack for a mockup slide.
#[tracing::instrument(level = "debug", skip_all, fields(layout = slide.mockup_layout.tag()))]
pub fn plan_slide(
    slide: &MockupSlide,
    canvas: &CanvasSpec,
    theme: &Theme,
    inputs: &SlideInputs,
    raster: &Rasterizer,
) -> CarouselResult<RenderPlan> {
    canvas.usable_rect()?;
    let mut layers = vec![fill_layer(canvas, theme)?];

    let wants_background = matches!(
        slide.image_usage,
        ImageUsage::Background | ImageUsage::AiBackground
    );
    if wants_background {
        match inputs.image.as_ref() {
            Some(photo) => layers.push(background_photo_layer(
                photo,
                canvas,
                slide.bg_overlay_opacity,
                slide.bg_blur,
            )?),
            None => tracing::debug!("background slide without an image, using theme fill"),
        }
    }

    let inset = inset_layer(slide, canvas, theme, inputs, raster)?;
    let column = match slide.mockup_layout {
        MockupLayout::TextStatement => {
            let sz = canvas.safe_zone;
            Column {
                left: f64::from(sz.left),
                width: f64::from(canvas.width) - f64::from(sz.left) - f64::from(sz.right),
            }
        }
        layout => side_column(layout, canvas, inset.as_ref()),
    };
    layers.extend(inset);

    if let Some(darken) = darken_layer(canvas, slide.overlay_darken)? {
        layers.push(darken);
    }

    let text = stack_blocks(slide, theme, canvas, &column);
    if let Some(svg) = text_svg(&text, canvas, theme, slide.highlight_style) {
        layers.push(Layer::full(raster.render_svg(&svg)?));
    }

    if let Some(stamp) = inputs.icon.as_ref() {
        layers.extend(icon_watermark_layers(
            &stamp.image,
            stamp.caption.as_deref(),
            stamp.position,
            slide.offsets.icon(),
            canvas.width,
            canvas.height,
            raster,
        )?);
    }

    Ok(RenderPlan {
        canvas: *canvas,
        layout: slide.mockup_layout,
        text,
        layers,
    })
}

/// Composite a plan into the final slide bitmap.
pub fn compose(plan: &RenderPlan) -> CarouselResult<Surface> {
    let mut base = Surface::new(plan.canvas.width, plan.canvas.height)?;
    composite(&mut base, &plan.layers)?;
    Ok(base)
}

pub fn render_slide(
    slide: &MockupSlide,
    canvas: &CanvasSpec,
    theme: &Theme,
    inputs: &SlideInputs,
    raster: &Rasterizer,
) -> CarouselResult<Surface> {
    compose(&plan_slide(slide, canvas, theme, inputs, raster)?)
}

/// Resolve canvas and theme for `brand`, then render.
pub fn render_mockup(
    slide: &MockupSlide,
    brand: &Brand,
    inputs: &SlideInputs,
    raster: &Rasterizer,
) -> CarouselResult<Surface> {
    let canvas = CanvasSpec::for_aspect(slide.aspect_ratio);
    let theme = Theme::for_slide(brand, slide)?;
    render_slide(slide, &canvas, &theme, inputs, raster)
}

#[cfg(test)]
#[path = "../../tests/unit/render/slide.rs"]
mod tests;
