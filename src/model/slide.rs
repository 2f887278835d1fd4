use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        core::Vec2,
        error::{CarouselError, CarouselResult},
    },
    layout::canvas::AspectRatio,
};

keyword_enum! {
    /// Which side the inset sits on, or a centered statement.
    pub enum MockupLayout {
        PhoneRight => "phone-right",
        PhoneLeft => "phone-left",
        TextStatement => "text-statement",
    }
    default = PhoneRight;
}

keyword_enum! {
    pub enum ThemeKind {
        Dark => "dark",
        Light => "light",
        Brand => "brand",
    }
    default = Dark;
}

keyword_enum! {
    /// How the slide's image (screenshot, photo or generated background) is placed.
    pub enum ImageUsage {
        Phone => "phone",
        Figure => "figure",
        Background => "background",
        AiBackground => "ai-background",
        NoImage => "none",
    }
    default = Phone;
}

keyword_enum! {
    pub enum SizeTier {
        Small => "small",
        Medium => "medium",
        Large => "large",
    }
    default = Medium;
}

keyword_enum! {
    pub enum HighlightStyle {
        Subtle => "subtle",
        Solid => "solid",
        Off => "none",
    }
    default = Subtle;
}

keyword_enum! {
    /// Anchor points for figure insets.
    pub enum FigureAnchor {
        TopLeft => "top-left",
        TopCenter => "top-center",
        TopRight => "top-right",
        CenterLeft => "center-left",
        CenterRight => "center-right",
        BottomLeft => "bottom-left",
        BottomCenter => "bottom-center",
        BottomRight => "bottom-right",
    }
    default = CenterRight;
}

keyword_enum! {
    /// Anchor points for the brand icon watermark.
    pub enum IconPosition {
        BottomRight => "bottom-right",
        BottomLeft => "bottom-left",
        TopRight => "top-right",
        TopLeft => "top-left",
        MidRight => "mid-right",
    }
    default = BottomRight;
}

keyword_enum! {
    pub enum Quality {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
    default = High;
}

/// Numbers that arrive either as JSON numbers or numeric strings.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer, de::Error as _};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    fn to_f64<E: serde::de::Error>(v: NumOrStr) -> Result<Option<f64>, E> {
        match v {
            NumOrStr::Num(n) => Ok(Some(n)),
            NumOrStr::Str(s) if s.trim().is_empty() => Ok(None),
            NumOrStr::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("'{s}' is not a number"))),
        }
    }

    pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<NumOrStr>::deserialize(d)? {
            Some(v) => to_f64(v),
            None => Ok(None),
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        opt_number(d)?.ok_or_else(|| D::Error::custom("expected a number"))
    }

    pub fn number_f32<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
        number(d).map(|v| v as f32)
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let v = number(d)?;
        if !(0.0..=f64::from(u32::MAX)).contains(&v) {
            return Err(D::Error::custom(format!("{v} is out of range")));
        }
        Ok(v.round() as u32)
    }
}

/// Copy shared by every slide type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideCopy {
    pub micro_label: String,
    pub headline: String,
    pub body: String,
    pub highlight_phrase: Option<String>,
}

impl SlideCopy {
    pub fn highlight(&self) -> Option<&str> {
        self.highlight_phrase
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextElement {
    Micro,
    Headline,
    Body,
}

/// Per-element pixel nudges plus the older single text offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementOffsets {
    #[serde(deserialize_with = "lenient::opt_number")]
    pub micro_offset_x: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub micro_offset_y: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub headline_offset_x: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub headline_offset_y: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub body_offset_x: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub body_offset_y: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub icon_offset_x: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub icon_offset_y: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub text_offset_x: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub text_offset_y: Option<f64>,
}

/// Icon offsets are clamped to this many pixels in each direction.
pub const MAX_ICON_OFFSET: f64 = 500.0;

impl ElementOffsets {
    fn has_per_element(&self) -> bool {
        [
            self.micro_offset_x,
            self.micro_offset_y,
            self.headline_offset_x,
            self.headline_offset_y,
            self.body_offset_x,
            self.body_offset_y,
        ]
        .iter()
        .any(Option::is_some)
    }

    /// Offset for one text element; the legacy text offset applies only when no per-element
    /// value is present at all.
    pub fn for_element(&self, element: TextElement) -> Vec2 {
        if !self.has_per_element() {
            return Vec2::new(
                self.text_offset_x.unwrap_or(0.0),
                self.text_offset_y.unwrap_or(0.0),
            );
        }
        let (x, y) = match element {
            TextElement::Micro => (self.micro_offset_x, self.micro_offset_y),
            TextElement::Headline => (self.headline_offset_x, self.headline_offset_y),
            TextElement::Body => (self.body_offset_x, self.body_offset_y),
        };
        Vec2::new(x.unwrap_or(0.0), y.unwrap_or(0.0))
    }

    pub fn icon(&self) -> Vec2 {
        let clamp = |v: Option<f64>| v.unwrap_or(0.0).clamp(-MAX_ICON_OFFSET, MAX_ICON_OFFSET);
        Vec2::new(clamp(self.icon_offset_x), clamp(self.icon_offset_y))
    }

    fn all(&self) -> [Option<f64>; 10] {
        [
            self.micro_offset_x,
            self.micro_offset_y,
            self.headline_offset_x,
            self.headline_offset_y,
            self.body_offset_x,
            self.body_offset_y,
            self.icon_offset_x,
            self.icon_offset_y,
            self.text_offset_x,
            self.text_offset_y,
        ]
    }
}

fn default_phone_angle() -> f32 {
    -8.0
}

fn default_figure_radius() -> f64 {
    24.0
}

fn default_bg_overlay() -> f32 {
    0.55
}

fn default_headline_size() -> f64 {
    82.0
}

fn default_body_size() -> f64 {
    34.0
}

fn default_video_duration() -> u32 {
    5
}

/// Slide drawn entirely by the local compositor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupSlide {
    #[serde(flatten)]
    pub copy: SlideCopy,
    #[serde(flatten)]
    pub offsets: ElementOffsets,
    #[serde(default)]
    pub mockup_layout: MockupLayout,
    #[serde(default)]
    pub mockup_theme: ThemeKind,
    #[serde(default)]
    pub image_usage: ImageUsage,
    #[serde(default = "default_phone_angle", deserialize_with = "lenient::number_f32")]
    pub phone_angle: f32,
    #[serde(default)]
    pub phone_size: SizeTier,
    #[serde(default)]
    pub highlight_style: HighlightStyle,
    #[serde(default)]
    pub figure_position: FigureAnchor,
    #[serde(default)]
    pub figure_size: SizeTier,
    #[serde(default = "default_figure_radius", deserialize_with = "lenient::number")]
    pub figure_border_radius: f64,
    #[serde(default = "default_bg_overlay", deserialize_with = "lenient::number_f32")]
    pub bg_overlay_opacity: f32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub bg_blur: u32,
    #[serde(default)]
    pub screenshot_image: Option<String>,
    #[serde(default)]
    pub ai_bg_setting: Option<String>,
    #[serde(default)]
    pub ai_bg_mood: Option<String>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default, deserialize_with = "lenient::number_f32")]
    pub overlay_darken: f32,
    #[serde(default = "default_headline_size", deserialize_with = "lenient::number")]
    pub headline_font_size: f64,
    #[serde(default = "default_body_size", deserialize_with = "lenient::number")]
    pub body_font_size: f64,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub micro_color: Option<String>,
}

impl Default for MockupSlide {
    fn default() -> Self {
        Self {
            copy: SlideCopy::default(),
            offsets: ElementOffsets::default(),
            mockup_layout: MockupLayout::default(),
            mockup_theme: ThemeKind::default(),
            image_usage: ImageUsage::default(),
            phone_angle: default_phone_angle(),
            phone_size: SizeTier::default(),
            highlight_style: HighlightStyle::default(),
            figure_position: FigureAnchor::default(),
            figure_size: SizeTier::default(),
            figure_border_radius: default_figure_radius(),
            bg_overlay_opacity: default_bg_overlay(),
            bg_blur: 0,
            screenshot_image: None,
            ai_bg_setting: None,
            ai_bg_mood: None,
            aspect_ratio: AspectRatio::default(),
            font_family: None,
            overlay_darken: 0.0,
            headline_font_size: default_headline_size(),
            body_font_size: default_body_size(),
            text_color: None,
            micro_color: None,
        }
    }
}

/// AI-generated photo with overlaid copy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoSlide {
    #[serde(flatten)]
    pub copy: SlideCopy,
    pub sport: Option<String>,
    pub setting: Option<String>,
    pub action: Option<String>,
    pub mood: Option<String>,
    pub overlay_style: Option<String>,
    pub overlay_placement: Option<String>,
    pub tricky_words: Option<String>,
    pub reference_image: Option<String>,
    pub reference_usage: Option<String>,
    pub reference_instructions: Option<String>,
    pub aspect_ratio: AspectRatio,
}

/// AI-generated typographic slide.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextSlide {
    #[serde(flatten)]
    pub copy: SlideCopy,
    pub background_style: Option<String>,
    pub layout_template: Option<String>,
    pub citation: Option<String>,
    pub tricky_words: Option<String>,
    pub reference_image: Option<String>,
    pub aspect_ratio: AspectRatio,
}

/// Short generated clip, optionally animated from a start frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSlide {
    #[serde(flatten)]
    pub copy: SlideCopy,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub reference_image: Option<String>,
    #[serde(default = "default_video_duration", deserialize_with = "lenient::count")]
    pub duration_secs: u32,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub generate_audio: bool,
}

/// Generated scene with top/bottom caption bands taken from headline and body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemeSlide {
    #[serde(flatten)]
    pub copy: SlideCopy,
    pub scene: Option<String>,
    pub reference_image: Option<String>,
    pub aspect_ratio: AspectRatio,
}

/// One slide of a carousel, keyed by `slideType`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slideType", rename_all = "lowercase")]
pub enum SlideSpec {
    Text(TextSlide),
    Photo(PhotoSlide),
    Mockup(MockupSlide),
    Video(VideoSlide),
    Meme(MemeSlide),
}

/// Supported video lengths in seconds.
pub const VIDEO_DURATION_RANGE: std::ops::RangeInclusive<u32> = 3..=15;

impl SlideSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Photo(_) => "photo",
            Self::Mockup(_) => "mockup",
            Self::Video(_) => "video",
            Self::Meme(_) => "meme",
        }
    }

    pub fn copy(&self) -> &SlideCopy {
        match self {
            Self::Text(s) => &s.copy,
            Self::Photo(s) => &s.copy,
            Self::Mockup(s) => &s.copy,
            Self::Video(s) => &s.copy,
            Self::Meme(s) => &s.copy,
        }
    }

    pub fn aspect(&self) -> AspectRatio {
        match self {
            Self::Text(s) => s.aspect_ratio,
            Self::Photo(s) => s.aspect_ratio,
            Self::Mockup(s) => s.aspect_ratio,
            Self::Video(s) => s.aspect_ratio,
            Self::Meme(s) => s.aspect_ratio,
        }
    }

    /// Asset id of the image this slide must load, if any.
    pub fn reference_image(&self) -> Option<&str> {
        let id = match self {
            Self::Text(s) => s.reference_image.as_deref(),
            Self::Photo(s) => s.reference_image.as_deref(),
            Self::Mockup(s) => s.screenshot_image.as_deref(),
            Self::Video(s) => s.reference_image.as_deref(),
            Self::Meme(s) => s.reference_image.as_deref(),
        };
        id.map(str::trim).filter(|id| !id.is_empty())
    }

    /// Check the fields each slide type needs before any work is scheduled.
    pub fn validate(&self) -> CarouselResult<()> {
        let copy = self.copy();
        match self {
            Self::Text(_) | Self::Photo(_) | Self::Mockup(_) if copy.headline.trim().is_empty() => {
                return Err(CarouselError::validation(format!(
                    "{} slide needs a headline",
                    self.kind()
                )));
            }
            Self::Video(v) => {
                if v.prompt.trim().is_empty() && copy.headline.trim().is_empty() {
                    return Err(CarouselError::validation(
                        "video slide needs a prompt or headline",
                    ));
                }
                if !VIDEO_DURATION_RANGE.contains(&v.duration_secs) {
                    return Err(CarouselError::validation(format!(
                        "video duration {}s is outside {}..={}s",
                        v.duration_secs,
                        VIDEO_DURATION_RANGE.start(),
                        VIDEO_DURATION_RANGE.end()
                    )));
                }
            }
            Self::Meme(m) => {
                let has_scene = m.scene.as_deref().is_some_and(|s| !s.trim().is_empty());
                if !has_scene && copy.headline.trim().is_empty() && copy.body.trim().is_empty() {
                    return Err(CarouselError::validation(
                        "meme slide needs a scene or a caption",
                    ));
                }
            }
            _ => {}
        }

        if let Self::Mockup(m) = self {
            if m.offsets.all().iter().flatten().any(|v| !v.is_finite()) {
                return Err(CarouselError::validation("offsets must be finite numbers"));
            }
            let sizes_ok = [m.headline_font_size, m.body_font_size]
                .iter()
                .all(|v| v.is_finite() && *v > 0.0);
            if !sizes_ok {
                return Err(CarouselError::validation("font sizes must be positive"));
            }
            if !m.phone_angle.is_finite() || !m.figure_border_radius.is_finite() {
                return Err(CarouselError::validation("phone angle and radius must be finite"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/slide.rs"]
mod tests;
