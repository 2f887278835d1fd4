use crate::{
    foundation::{core::Rgb8, error::CarouselResult},
    model::{
        brand::Brand,
        slide::{MockupSlide, ThemeKind},
    },
};

pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";
const LIGHT_BACKGROUND: Rgb8 = Rgb8::new(0xf5, 0xf3, 0xef);

/// Resolved colors and typeface for one slide.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub background: Rgb8,
    /// Bottom stop of a vertical gradient; `None` draws a solid fill.
    pub background_end: Option<Rgb8>,
    pub text: Rgb8,
    pub body: Rgb8,
    pub micro: Rgb8,
    pub accent: Rgb8,
    /// Chrome of the generated phone frame.
    pub device: Rgb8,
    pub font_family: String,
}

impl Theme {
    pub fn resolve(brand: &Brand, kind: ThemeKind) -> Self {
        let c = brand.colors;
        match kind {
            ThemeKind::Dark => Self {
                background: c.primary,
                background_end: Some(c.primary.darken(0.55)),
                text: c.white,
                body: c.white.darken(0.85),
                micro: c.accent,
                accent: c.accent,
                device: Rgb8::new(0x11, 0x11, 0x13),
                font_family: DEFAULT_FONT_FAMILY.into(),
            },
            ThemeKind::Light => Self {
                background: LIGHT_BACKGROUND,
                background_end: None,
                text: c.primary,
                body: c.primary.darken(0.8),
                micro: c.accent.darken(0.8),
                accent: c.accent,
                device: Rgb8::new(0x1c, 0x1c, 0x1e),
                font_family: DEFAULT_FONT_FAMILY.into(),
            },
            ThemeKind::Brand => Self {
                background: c.primary,
                background_end: Some(c.secondary),
                text: c.white,
                body: c.white,
                micro: c.white.darken(0.9),
                accent: c.accent,
                device: Rgb8::new(0x11, 0x11, 0x13),
                font_family: DEFAULT_FONT_FAMILY.into(),
            },
        }
    }

    /// Theme for a mockup slide, with its color and font overrides applied.
    pub fn for_slide(brand: &Brand, slide: &MockupSlide) -> CarouselResult<Self> {
        let mut theme = Self::resolve(brand, slide.mockup_theme);
        if let Some(hex) = non_blank(slide.text_color.as_deref()) {
            let color = Rgb8::parse_hex(hex)?;
            theme.text = color;
            theme.body = color;
        }
        if let Some(hex) = non_blank(slide.micro_color.as_deref()) {
            theme.micro = Rgb8::parse_hex(hex)?;
        }
        if let Some(family) = non_blank(slide.font_family.as_deref()) {
            theme.font_family = family.to_string();
        }
        Ok(theme)
    }

    /// Value for an SVG `font-family` attribute, with sans-serif fallbacks.
    pub fn font_stack(&self) -> String {
        let family = self.font_family.replace(['"', '\'', '<', '>', '&'], "");
        format!("'{family}', Helvetica, Arial, sans-serif")
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/render/theme.rs"]
mod tests;
