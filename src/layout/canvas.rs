use crate::foundation::{
    core::Rect,
    error::{CarouselError, CarouselResult},
};

/// Height of the reference canvas the vertical safe-zone insets are authored against.
const REFERENCE_HEIGHT: f64 = 1920.0;
const REFERENCE_TOP_INSET: f64 = 120.0;
const REFERENCE_BOTTOM_INSET: f64 = 200.0;
const SIDE_INSET: u32 = 90;
const CANVAS_WIDTH: u32 = 1080;

/// Supported slide aspect ratios.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AspectRatio {
    #[default]
    Portrait9x16,
    Portrait4x5,
    Square,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 3] = [Self::Portrait9x16, Self::Portrait4x5, Self::Square];

    /// Total: unknown or missing tags fall back to `9:16`.
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "9:16" => Self::Portrait9x16,
            "4:5" => Self::Portrait4x5,
            "1:1" => Self::Square,
            other => {
                if !other.is_empty() {
                    tracing::debug!(tag = other, "unknown aspect ratio, using 9:16");
                }
                Self::default()
            }
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Portrait9x16 => "9:16",
            Self::Portrait4x5 => "4:5",
            Self::Square => "1:1",
        }
    }

    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Portrait9x16 => (CANVAS_WIDTH, 1920),
            Self::Portrait4x5 => (CANVAS_WIDTH, 1350),
            Self::Square => (CANVAS_WIDTH, CANVAS_WIDTH),
        }
    }
}

impl From<String> for AspectRatio {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<AspectRatio> for String {
    fn from(value: AspectRatio) -> Self {
        value.tag().to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SafeZone {
    /// Pixels kept clear of the platform's top overlay.
    pub top: u32,
    /// Pixels kept clear of the caption and action bar at the bottom.
    pub bottom: u32,
    /// Left inset in pixels.
    pub left: u32,
    /// Right inset in pixels.
    pub right: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSpec {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Insets scaled to `height`, inside which copy and figures are placed.
    pub safe_zone: SafeZone,
}

impl CanvasSpec {
    pub fn for_aspect(aspect: AspectRatio) -> Self {
        let (width, height) = aspect.dimensions();
        let scale = f64::from(height) / REFERENCE_HEIGHT;
        Self {
            width,
            height,
            safe_zone: SafeZone {
                top: (REFERENCE_TOP_INSET * scale).round() as u32,
                bottom: (REFERENCE_BOTTOM_INSET * scale).round() as u32,
                left: SIDE_INSET,
                right: SIDE_INSET,
            },
        }
    }

    /// Interior rectangle left after removing the safe-zone insets.
    pub fn usable_rect(&self) -> CarouselResult<Rect> {
        let sz = self.safe_zone;
        let horizontal = sz.left.saturating_add(sz.right);
        let vertical = sz.top.saturating_add(sz.bottom);
        if self.width <= horizontal || self.height <= vertical {
            return Err(CarouselError::layout(format!(
                "safe zone leaves no usable area on a {}x{} canvas",
                self.width, self.height
            )));
        }
        Ok(Rect::new(
            f64::from(sz.left),
            f64::from(sz.top),
            f64::from(self.width - sz.right),
            f64::from(self.height - sz.bottom),
        ))
    }
}

/// Map an aspect-ratio tag to its canvas and safe zone.
pub fn resolve_canvas(tag: &str) -> CanvasSpec {
    CanvasSpec::for_aspect(AspectRatio::parse(tag))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/canvas.rs"]
mod tests;
