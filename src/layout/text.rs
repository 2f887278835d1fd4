//! Approximate text layout.
//!
//! Widths are estimated from a fixed average glyph advance instead of real font metrics. Wrap
//! points therefore depend only on character counts, which keeps layouts stable across machines
//! with different installed fonts.

use crate::foundation::core::Point;

/// Average glyph advance as a fraction of the font size.
pub const REGULAR_GLYPH_RATIO: f64 = 0.52;
pub const BOLD_GLYPH_RATIO: f64 = 0.56;

/// Horizontal padding added on each side of a highlight bar.
pub const HIGHLIGHT_PAD_X: f64 = 6.0;
/// Highlight bar height as a multiple of the font size.
pub const HIGHLIGHT_HEIGHT_RATIO: f64 = 1.2;

pub fn glyph_ratio(bold: bool) -> f64 {
    if bold {
        BOLD_GLYPH_RATIO
    } else {
        REGULAR_GLYPH_RATIO
    }
}

pub fn estimate_width(text: &str, font_size: f64, bold: bool) -> f64 {
    text.chars().count() as f64 * font_size * glyph_ratio(bold)
}

/// Greedy word wrap.
///
/// Explicit `\n` breaks are kept; an empty paragraph produces an empty line. A word wider than
/// `max_width` is placed alone on its own line and never split.
pub fn wrap(text: &str, font_size: f64, max_width: f64, bold: bool) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut any_word = false;
        for word in paragraph.split_whitespace() {
            any_word = true;
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate_chars = current.chars().count() + 1 + word.chars().count();
            let candidate_width = candidate_chars as f64 * font_size * glyph_ratio(bold);
            if candidate_width <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if any_word {
            lines.push(current);
        } else {
            lines.push(String::new());
        }
    }
    lines
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Wrapped lines, top to bottom. Empty strings are blank lines.
    pub lines: Vec<String>,
    /// Font size in pixels.
    pub font_size: f64,
    /// Line advance as a multiple of `font_size`.
    pub line_height: f64,
    /// Width the lines were wrapped to.
    pub max_width: f64,
    /// Whether widths were estimated with the bold glyph ratio.
    pub bold: bool,
}

impl TextBlock {
    pub fn layout(text: &str, font_size: f64, line_height: f64, max_width: f64, bold: bool) -> Self {
        Self {
            lines: wrap(text, font_size, max_width, bold),
            font_size,
            line_height,
            max_width,
            bold,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_advance(&self) -> f64 {
        self.font_size * self.line_height
    }

    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_advance()
    }

    /// Top edge of line `index`, relative to the block origin.
    pub fn line_top(&self, index: usize) -> f64 {
        index as f64 * self.line_advance()
    }

    /// Alphabetic baseline of line `index`, relative to the block origin.
    pub fn baseline(&self, index: usize) -> f64 {
        self.line_top(index) + self.line_advance() * 0.5 + self.font_size * 0.35
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct HighlightRegion {
    pub line: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bars behind the first case-insensitive match of `phrase` on each line of `block`.
///
/// A phrase that was split by wrapping matches no single line and yields nothing for it.
pub fn highlight_regions(
    block: &TextBlock,
    phrase: Option<&str>,
    origin: Point,
) -> Vec<HighlightRegion> {
    let Some(phrase) = phrase.map(str::trim).filter(|p| !p.is_empty()) else {
        return Vec::new();
    };
    let needle: Vec<char> = phrase.chars().flat_map(char::to_lowercase).collect();
    let height = block.font_size * HIGHLIGHT_HEIGHT_RATIO;
    let ratio = block.font_size * glyph_ratio(block.bold);

    let mut out = Vec::new();
    for (index, line) in block.lines.iter().enumerate() {
        let Some((start, len)) = find_folded(line, &needle) else {
            continue;
        };
        out.push(HighlightRegion {
            line: index,
            x: origin.x + start as f64 * ratio - HIGHLIGHT_PAD_X,
            y: origin.y + block.line_top(index) + (block.line_advance() - height) / 2.0,
            width: len as f64 * ratio + HIGHLIGHT_PAD_X * 2.0,
            height,
        });
    }
    out
}

/// First match of the lowercased `needle` in `line`, as (start, length) in `line`'s own chars.
///
/// Characters whose lowercase form is longer than one char still count once.
fn find_folded(line: &str, needle: &[char]) -> Option<(usize, usize)> {
    let folded: Vec<(char, usize)> = line
        .chars()
        .enumerate()
        .flat_map(|(i, c)| c.to_lowercase().map(move |l| (l, i)))
        .collect();
    if needle.is_empty() || needle.len() > folded.len() {
        return None;
    }
    let at = folded
        .windows(needle.len())
        .position(|w| w.iter().map(|&(c, _)| c).eq(needle.iter().copied()))?;
    let start = folded[at].1;
    let end = folded[at + needle.len() - 1].1;
    Some((start, end - start + 1))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
