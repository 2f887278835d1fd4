//! Vector rasterization through `usvg`/`resvg`.
//!
//! Every text and shape layer is described as a small SVG document and rasterized here into a
//! premultiplied [`Surface`]. The font database is loaded once and shared read-only, so repeated
//! renders of the same document are byte-identical.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use resvg::tiny_skia;

use crate::{
    foundation::error::{CarouselError, CarouselResult},
    render::surface::Surface,
};

#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl Rasterizer {
    /// System fonts plus any `.ttf`/`.otf`/`.ttc` files found directly in `font_dirs`.
    pub fn new(font_dirs: &[PathBuf]) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Rasterize an SVG document at its declared pixel size.
    pub fn render_svg(&self, svg: &str) -> CarouselResult<Surface> {
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &opts).context("parse svg document")?;
        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            CarouselError::layout(format!(
                "svg declares unusable size {}x{}",
                size.width(),
                size.height()
            ))
        })?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
        Surface::from_pixmap(pixmap)
    }
}

/// Rotate `src` around its center by `angle_deg`, growing the canvas so no corner is clipped.
pub fn rotate_expanded(src: &Surface, angle_deg: f32) -> CarouselResult<Surface> {
    if angle_deg.abs() < 0.01 {
        return Ok(src.clone());
    }
    let rad = f64::from(angle_deg).to_radians();
    let (w, h) = (f64::from(src.width()), f64::from(src.height()));
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    let out_w = (w * cos + h * sin).ceil() as u32;
    let out_h = (w * sin + h * cos).ceil() as u32;

    let mut out = tiny_skia::Pixmap::new(out_w, out_h)
        .ok_or_else(|| CarouselError::layout("rotated surface has no usable dimensions"))?;
    let source = src.to_pixmap()?;
    let dx = (f64::from(out_w) - w) / 2.0;
    let dy = (f64::from(out_h) - h) / 2.0;
    let xform = tiny_skia::Transform::from_rotate_at(angle_deg, out_w as f32 / 2.0, out_h as f32 / 2.0)
        .pre_translate(dx as f32, dy as f32);
    let paint = tiny_skia::PixmapPaint {
        quality: tiny_skia::FilterQuality::Bilinear,
        ..Default::default()
    };
    out.draw_pixmap(0, 0, source.as_ref(), &paint, xform, None);
    Surface::from_pixmap(out)
}

/// Escape text for inclusion in SVG character data or attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Open an SVG document of `width`x`height` pixels. Pair with `</svg>`.
pub fn svg_open(width: u32, height: u32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        let is_font = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
            .unwrap_or(false);
        if path.is_file() && is_font && db.load_font_file(&path).is_err() {
            tracing::warn!(font = %path.display(), "skipping unreadable font");
        }
    }
}

/// Match the requested family list, then generic families, then any installed face.
fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;
    use usvg::fontdb::Family;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => Family::Serif,
                    usvg::FontFamily::SansSerif => Family::SansSerif,
                    usvg::FontFamily::Cursive => Family::Cursive,
                    usvg::FontFamily::Fantasy => Family::Fantasy,
                    usvg::FontFamily::Monospace => Family::Monospace,
                    usvg::FontFamily::Named(s) => Family::Name(s),
                })
                .collect();
            families.push(Family::SansSerif);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };
            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
