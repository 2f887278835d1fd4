//! Layer producers and the ordered compositor.
//!
//! Every producer returns an owned [`Layer`]; the compositor only reads placement and opacity and
//! never inspects pixel content.

use std::fmt::Write as _;

use crate::{
    assets::decode::decode_image,
    foundation::{
        core::{Rect, Rgb8, Rgba8Premul, Vec2},
        error::{CarouselError, CarouselResult},
    },
    layout::{
        canvas::CanvasSpec,
        text::TextBlock,
    },
    model::slide::{FigureAnchor, IconPosition, SizeTier},
    render::{
        blur::blur_surface,
        composite::{over_at, round_corners},
        raster::{Rasterizer, escape_xml, rotate_expanded, svg_open},
        surface::Surface,
        theme::Theme,
    },
};

/// Opaque bitmap with its composite origin.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Premultiplied pixels drawn as-is.
    pub surface: Surface,
    /// Canvas x of the surface's left edge. May be negative.
    pub left: i64,
    /// Canvas y of the surface's top edge. May be negative.
    pub top: i64,
    /// Extra opacity applied while compositing, 0.0 to 1.0.
    pub opacity: f32,
}

impl Layer {
    pub fn at(surface: Surface, left: i64, top: i64) -> Self {
        Self {
            surface,
            left,
            top,
            opacity: 1.0,
        }
    }

    pub fn full(surface: Surface) -> Self {
        Self::at(surface, 0, 0)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.left as f64,
            self.top as f64,
            (self.left + i64::from(self.surface.width())) as f64,
            (self.top + i64::from(self.surface.height())) as f64,
        )
    }
}

/// Composite `layers` onto `base` in slice order.
pub fn composite(base: &mut Surface, layers: &[Layer]) -> CarouselResult<()> {
    for layer in layers {
        over_at(base, &layer.surface, layer.left, layer.top, layer.opacity)?;
    }
    Ok(())
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
}

/// Piecewise-linear vertical gradient through premultiplied `stops` at fractional heights.
fn vertical_gradient(
    width: u32,
    height: u32,
    stops: &[(f64, Rgba8Premul)],
) -> CarouselResult<Surface> {
    let mut surface = Surface::new(width, height)?;
    if stops.is_empty() {
        return Ok(surface);
    }
    let row_bytes = width as usize * 4;
    let denom = f64::from(height.saturating_sub(1).max(1));
    for (y, row) in surface.data_mut().chunks_exact_mut(row_bytes).enumerate() {
        let t = y as f64 / denom;
        let upper = stops.iter().position(|(pos, _)| *pos >= t).unwrap_or(stops.len() - 1);
        let color = if upper == 0 {
            stops[0].1
        } else {
            let (p0, c0) = stops[upper - 1];
            let (p1, c1) = stops[upper];
            let local = if p1 > p0 { ((t - p0) / (p1 - p0)).clamp(0.0, 1.0) } else { 1.0 };
            Rgba8Premul {
                r: lerp_u8(c0.r, c1.r, local),
                g: lerp_u8(c0.g, c1.g, local),
                b: lerp_u8(c0.b, c1.b, local),
                a: lerp_u8(c0.a, c1.a, local),
            }
        };
        let px = color.to_array();
        for dst in row.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }
    Ok(surface)
}

/// Theme background: solid, or a top-to-bottom two-color gradient.
pub fn fill_layer(canvas: &CanvasSpec, theme: &Theme) -> CarouselResult<Layer> {
    let surface = match theme.background_end {
        None => Surface::filled(canvas.width, canvas.height, theme.background.with_alpha(255))?,
        Some(end) => vertical_gradient(
            canvas.width,
            canvas.height,
            &[
                (0.0, theme.background.with_alpha(255)),
                (1.0, end.with_alpha(255)),
            ],
        )?,
    };
    Ok(Layer::full(surface))
}

/// Black overlay alpha at fractional heights: dark at the edges, lighter through the middle.
const OVERLAY_STOPS: [(f64, f32); 4] = [(0.0, 0.9), (0.35, 0.35), (0.65, 0.35), (1.0, 0.95)];

pub fn legibility_overlay(width: u32, height: u32, opacity: f32) -> CarouselResult<Surface> {
    let opacity = opacity.clamp(0.0, 1.0);
    let stops: Vec<(f64, Rgba8Premul)> = OVERLAY_STOPS
        .iter()
        .map(|&(pos, a)| {
            let alpha = (a * opacity * 255.0).round() as u8;
            (pos, Rgb8::BLACK.with_alpha(alpha))
        })
        .collect();
    vertical_gradient(width, height, &stops)
}

/// Photo resized to cover the canvas, optionally blurred, under the legibility gradient.
pub fn background_photo_layer(
    photo: &Surface,
    canvas: &CanvasSpec,
    overlay_opacity: f32,
    blur_radius: u32,
) -> CarouselResult<Layer> {
    let mut bg = photo.cover(canvas.width, canvas.height)?;
    if blur_radius > 0 {
        bg = blur_surface(&bg, blur_radius)?;
    }
    let overlay = legibility_overlay(canvas.width, canvas.height, overlay_opacity)?;
    over_at(&mut bg, &overlay, 0, 0, 1.0)?;
    Ok(Layer::full(bg))
}

/// Uniform black wash; `None` when `amount` rounds to nothing.
pub fn darken_layer(canvas: &CanvasSpec, amount: f32) -> CarouselResult<Option<Layer>> {
    let alpha = (amount.clamp(0.0, 1.0) * 255.0).round() as u8;
    if alpha == 0 {
        return Ok(None);
    }
    let surface = Surface::filled(canvas.width, canvas.height, Rgb8::BLACK.with_alpha(alpha))?;
    Ok(Some(Layer::full(surface)))
}

/// Distance kept between an anchored figure and the canvas edge.
pub const FIGURE_PADDING: f64 = 60.0;

/// Bounding box a figure is fitted into, per size tier.
pub fn figure_box(canvas: &CanvasSpec, tier: SizeTier) -> (u32, u32) {
    let (fw, fh) = match tier {
        SizeTier::Small => (0.42, 0.32),
        SizeTier::Medium => (0.55, 0.42),
        SizeTier::Large => (0.72, 0.55),
    };
    (
        ((f64::from(canvas.width) * fw).round() as u32).max(1),
        ((f64::from(canvas.height) * fh).round() as u32).max(1),
    )
}

/// Top-left origin of an item of `size` anchored inside the canvas.
pub fn anchor_origin(
    anchor: FigureAnchor,
    canvas: &CanvasSpec,
    size: (u32, u32),
    pad: f64,
) -> (i64, i64) {
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let (w, h) = (f64::from(size.0), f64::from(size.1));
    let left = pad;
    let hcenter = (cw - w) / 2.0;
    let right = cw - w - pad;
    let top = pad;
    let vcenter = (ch - h) / 2.0;
    let bottom = ch - h - pad;
    let (x, y) = match anchor {
        FigureAnchor::TopLeft => (left, top),
        FigureAnchor::TopCenter => (hcenter, top),
        FigureAnchor::TopRight => (right, top),
        FigureAnchor::CenterLeft => (left, vcenter),
        FigureAnchor::CenterRight => (right, vcenter),
        FigureAnchor::BottomLeft => (left, bottom),
        FigureAnchor::BottomCenter => (hcenter, bottom),
        FigureAnchor::BottomRight => (right, bottom),
    };
    (x.round() as i64, y.round() as i64)
}

/// Image fitted into its tier box, corners rounded, placed at `anchor`.
pub fn figure_layer(
    image: &Surface,
    canvas: &CanvasSpec,
    tier: SizeTier,
    corner_radius: f64,
    anchor: FigureAnchor,
) -> CarouselResult<Layer> {
    let (bw, bh) = figure_box(canvas, tier);
    let mut fig = image.fit_within(bw, bh)?;
    round_corners(&mut fig, corner_radius.max(0.0));
    let (left, top) = anchor_origin(anchor, canvas, (fig.width(), fig.height()), FIGURE_PADDING);
    Ok(Layer::at(fig, left, top))
}

/// Device width as a fraction of its height.
pub const PHONE_ASPECT: f64 = 0.48;
/// Outline of the generated device body.
const DEVICE_EDGE: Rgb8 = Rgb8::new(0x3a, 0x3a, 0x3c);
/// Widest the phone may get, as a fraction of canvas width.
const PHONE_MAX_WIDTH: f64 = 0.46;

pub fn phone_height(canvas: &CanvasSpec, tier: SizeTier) -> u32 {
    let frac = match tier {
        SizeTier::Small => 0.38,
        SizeTier::Medium => 0.45,
        SizeTier::Large => 0.52,
    };
    let by_height = f64::from(canvas.height) * frac;
    let by_width = f64::from(canvas.width) * PHONE_MAX_WIDTH / PHONE_ASPECT;
    (by_height.min(by_width).round() as u32).max(16)
}

/// Inputs of the phone mockup.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhoneParts<'a> {
    pub screenshot: Option<&'a Surface>,
    /// Brand frame with a transparent screen cut-out, drawn over the screenshot.
    pub frame: Option<&'a Surface>,
}

struct PhoneGeometry {
    width: u32,
    height: u32,
    bezel: u32,
    body_radius: f64,
    screen_radius: f64,
}

impl PhoneGeometry {
    fn new(height: u32) -> Self {
        let width = ((f64::from(height) * PHONE_ASPECT).round() as u32).max(8);
        let w = f64::from(width);
        Self {
            width,
            height,
            bezel: ((w * 0.035).round() as u32).max(1),
            body_radius: w * 0.14,
            screen_radius: w * 0.11,
        }
    }

    fn screen_size(&self) -> (u32, u32) {
        (
            self.width.saturating_sub(self.bezel * 2).max(1),
            self.height.saturating_sub(self.bezel * 2).max(1),
        )
    }
}

fn placeholder_screen(
    width: u32,
    height: u32,
    theme: &Theme,
    raster: &Rasterizer,
) -> CarouselResult<Surface> {
    let (w, h) = (f64::from(width), f64::from(height));
    let mut svg = svg_open(width, height);
    let _ = write!(
        svg,
        r#"<defs><linearGradient id="g" x1="0" y1="0" x2="0" y2="1"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient></defs><rect width="{w}" height="{h}" fill="url(#g)"/>"#,
        theme.background.to_hex(),
        theme.accent.darken(0.6).to_hex(),
    );
    let bar_x = w * 0.1;
    for (i, frac) in [0.7, 0.5, 0.6].iter().enumerate() {
        let y = h * (0.18 + i as f64 * 0.08);
        let _ = write!(
            svg,
            r##"<rect x="{bar_x:.1}" y="{y:.1}" width="{:.1}" height="{:.1}" rx="{:.1}" fill="#ffffff" fill-opacity="0.25"/>"##,
            w * frac,
            h * 0.035,
            h * 0.0175,
        );
    }
    let _ = write!(
        svg,
        r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" fill-opacity="0.8"/></svg>"#,
        w / 2.0,
        h * 0.62,
        w * 0.22,
        theme.accent.to_hex(),
    );
    raster.render_svg(&svg)
}

/// Upright phone mockup `height` pixels tall.
pub fn phone_surface(
    parts: PhoneParts<'_>,
    height: u32,
    theme: &Theme,
    raster: &Rasterizer,
) -> CarouselResult<Surface> {
    let geo = PhoneGeometry::new(height);
    let (sw, sh) = geo.screen_size();
    let mut screen = match parts.screenshot {
        Some(shot) => shot.cover(sw, sh)?,
        None => placeholder_screen(sw, sh, theme, raster)?,
    };
    round_corners(&mut screen, geo.screen_radius);
    let inset = i64::from(geo.bezel);

    if let Some(frame) = parts.frame {
        let mut phone = Surface::new(geo.width, geo.height)?;
        over_at(&mut phone, &screen, inset, inset, 1.0)?;
        let frame = frame.resized(geo.width, geo.height)?;
        over_at(&mut phone, &frame, 0, 0, 1.0)?;
        return Ok(phone);
    }

    let (w, h) = (f64::from(geo.width), f64::from(geo.height));
    let stroke = (w * 0.008).max(1.0);
    let body = format!(
        r#"{}<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" fill="{}" stroke="{}" stroke-width="{stroke:.2}"/></svg>"#,
        svg_open(geo.width, geo.height),
        stroke / 2.0,
        stroke / 2.0,
        w - stroke,
        h - stroke,
        geo.body_radius,
        theme.device.to_hex(),
        DEVICE_EDGE.to_hex(),
    );
    let mut phone = raster.render_svg(&body)?;
    over_at(&mut phone, &screen, inset, inset, 1.0)?;

    let island_w = w * 0.3;
    let island_h = w * 0.085;
    let island = format!(
        r##"{}<rect x="{:.2}" y="{:.2}" width="{island_w:.2}" height="{island_h:.2}" rx="{:.2}" fill="#000000"/></svg>"##,
        svg_open(geo.width, geo.height),
        (w - island_w) / 2.0,
        f64::from(geo.bezel) + w * 0.03,
        island_h / 2.0,
    );
    let island = raster.render_svg(&island)?;
    over_at(&mut phone, &island, 0, 0, 1.0)?;
    Ok(phone)
}

/// Phone mockup rotated by `angle_deg` on an expanded canvas.
pub fn phone_layer_surface(
    parts: PhoneParts<'_>,
    height: u32,
    angle_deg: f32,
    theme: &Theme,
    raster: &Rasterizer,
) -> CarouselResult<Surface> {
    let upright = phone_surface(parts, height, theme, raster)?;
    rotate_expanded(&upright, angle_deg)
}

/// Caption box under the icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptionBox {
    /// Canvas x of the box.
    pub left: i64,
    /// Canvas y of the box.
    pub top: i64,
    pub width: u32,
    pub height: u32,
    /// Caption font size in pixels.
    pub font_size: u32,
}

/// Placement of the icon watermark group on a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconGeometry {
    /// Edge length of the square icon in pixels.
    pub icon_size: u32,
    /// Radius used to round the icon's corners.
    pub corner_radius: u32,
    /// Canvas x of the icon.
    pub icon_left: i64,
    /// Canvas y of the icon.
    pub icon_top: i64,
    /// Box for the caption text, present only when a caption is drawn.
    pub caption: Option<CaptionBox>,
}

fn round_u32(v: f64) -> u32 {
    v.round().max(0.0) as u32
}

/// Icon size as a percentage of canvas width.
pub fn icon_size_percent(position: IconPosition) -> f64 {
    match position {
        IconPosition::BottomRight | IconPosition::BottomLeft => 8.0,
        IconPosition::TopRight | IconPosition::TopLeft => 6.0,
        IconPosition::MidRight => 10.0,
    }
}

pub fn icon_geometry(
    width: u32,
    height: u32,
    position: IconPosition,
    with_caption: bool,
    offset: Vec2,
) -> CarouselResult<IconGeometry> {
    if width == 0 || height == 0 {
        return Err(CarouselError::layout("icon watermark base has no usable dimensions"));
    }
    let w = f64::from(width);
    let h = f64::from(height);
    let icon_size = round_u32(w * icon_size_percent(position) / 100.0).max(1);
    let icon = f64::from(icon_size);
    let corner_radius = round_u32(icon * 0.22);
    let font_size = round_u32(icon * 0.28);
    let text_w = round_u32(icon * 2.5);
    let text_h = round_u32(f64::from(font_size) * 1.6);
    let pad = w * 0.04;
    let gap = f64::from(round_u32(icon * 0.15));

    let (total_w, total_h) = if with_caption {
        (icon.max(f64::from(text_w)), icon + gap + f64::from(text_h))
    } else {
        (icon, icon)
    };
    let pad = pad.round();
    let (left, top) = match position {
        IconPosition::BottomRight => (w - total_w - pad, h - total_h - pad),
        IconPosition::BottomLeft => (pad, h - total_h - pad),
        IconPosition::TopRight => (w - total_w - pad, pad),
        IconPosition::TopLeft => (pad, pad),
        IconPosition::MidRight => (w - total_w - pad, ((h - total_h) / 2.0).round()),
    };
    let (left, top) = (left.max(0.0), top.max(0.0));
    let dx = offset.x.round();
    let dy = offset.y.round();

    let icon_left = left + ((total_w - icon) / 2.0).round() + dx;
    let caption = with_caption.then(|| CaptionBox {
        left: (left + ((total_w - f64::from(text_w)) / 2.0).round() + dx) as i64,
        top: (top + icon + gap + dy) as i64,
        width: text_w.max(1),
        height: text_h.max(1),
        font_size: font_size.max(1),
    });

    Ok(IconGeometry {
        icon_size,
        corner_radius,
        icon_left: icon_left as i64,
        icon_top: (top + dy) as i64,
        caption,
    })
}

/// Brand icon (rounded) plus optional caption, placed per `position`.
pub fn icon_watermark_layers(
    icon: &Surface,
    caption: Option<&str>,
    position: IconPosition,
    offset: Vec2,
    width: u32,
    height: u32,
    raster: &Rasterizer,
) -> CarouselResult<Vec<Layer>> {
    let caption = caption.map(str::trim).filter(|c| !c.is_empty());
    let geo = icon_geometry(width, height, position, caption.is_some(), offset)?;

    let mut icon_img = icon.cover(geo.icon_size, geo.icon_size)?;
    round_corners(&mut icon_img, f64::from(geo.corner_radius));
    let mut layers = vec![Layer::at(icon_img, geo.icon_left, geo.icon_top)];

    if let (Some(text), Some(bx)) = (caption, geo.caption) {
        let svg = format!(
            r##"{}<text x="{:.1}" y="{:.1}" font-family="Helvetica, Arial, sans-serif" font-size="{}" font-weight="600" fill="#ffffff" fill-opacity="0.85" text-anchor="middle">{}</text></svg>"##,
            svg_open(bx.width, bx.height),
            f64::from(bx.width) / 2.0,
            f64::from(bx.font_size) * 1.1,
            bx.font_size,
            escape_xml(text),
        );
        layers.push(Layer::at(raster.render_svg(&svg)?, bx.left, bx.top));
    }
    Ok(layers)
}

/// Stamp the icon watermark onto an encoded image and re-encode as PNG.
pub fn apply_icon_watermark(
    image_bytes: &[u8],
    icon_bytes: &[u8],
    caption: Option<&str>,
    position: IconPosition,
    offset: Vec2,
    raster: &Rasterizer,
) -> CarouselResult<Vec<u8>> {
    let mut base = decode_image(image_bytes)
        .map_err(|e| CarouselError::layout(format!("unresolvable base image dimensions: {e}")))?;
    let icon = decode_image(icon_bytes)?;
    let layers = icon_watermark_layers(
        &icon,
        caption,
        position,
        offset,
        base.width(),
        base.height(),
        raster,
    )?;
    composite(&mut base, &layers)?;
    base.encode_png()
}

/// Classic top/bottom meme captions: bold white text with a black outline.
pub fn meme_caption_layer(
    width: u32,
    height: u32,
    top: &str,
    bottom: &str,
    raster: &Rasterizer,
) -> CarouselResult<Option<Layer>> {
    let (top, bottom) = (top.trim(), bottom.trim());
    if top.is_empty() && bottom.is_empty() {
        return Ok(None);
    }
    let w = f64::from(width);
    let h = f64::from(height);
    let font_size = (w * 0.075).round();
    let pad = (w * 0.05).round();
    let max_width = w - pad * 2.0;

    let mut svg = svg_open(width, height);
    let mut emit = |block: &TextBlock, origin_y: f64| {
        for (i, line) in block.lines.iter().enumerate() {
            let _ = write!(
                svg,
                r##"<text x="{:.1}" y="{:.1}" font-family="Impact, 'Arial Black', Helvetica, sans-serif" font-size="{font_size}" font-weight="900" fill="#ffffff" stroke="#000000" stroke-width="{:.1}" paint-order="stroke" text-anchor="middle">{}</text>"##,
                w / 2.0,
                origin_y + block.baseline(i),
                font_size * 0.08,
                escape_xml(&line.to_uppercase()),
            );
        }
    };
    if !top.is_empty() {
        let block = TextBlock::layout(top, font_size, 1.1, max_width, true);
        emit(&block, pad);
    }
    if !bottom.is_empty() {
        let block = TextBlock::layout(bottom, font_size, 1.1, max_width, true);
        emit(&block, h - pad - block.height());
    }
    svg.push_str("</svg>");
    Ok(Some(Layer::full(raster.render_svg(&svg)?)))
}

#[cfg(test)]
#[path = "../../tests/unit/render/layers.rs"]
mod tests;
