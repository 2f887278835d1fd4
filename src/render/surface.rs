use std::io::Cursor;

use anyhow::Context;
use resvg::tiny_skia;

use crate::{
    assets::decode::unpremultiply_rgba8_in_place,
    foundation::{
        core::Rgba8Premul,
        error::{CarouselError, CarouselResult},
    },
};

/// Owned premultiplied RGBA8 bitmap, row-major, no padding.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn byte_len(width: u32, height: u32) -> CarouselResult<usize> {
    if width == 0 || height == 0 {
        return Err(CarouselError::layout(format!(
            "surface dimensions must be non-zero, got {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| CarouselError::layout("surface size overflow"))
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> CarouselResult<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn filled(width: u32, height: u32, color: Rgba8Premul) -> CarouselResult<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: color.to_array().repeat(len / 4),
        })
    }

    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> CarouselResult<Self> {
        let len = byte_len(width, height)?;
        if data.len() != len {
            return Err(CarouselError::layout(format!(
                "surface buffer has {} bytes, expected {len}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Resample to exactly `width`x`height`.
    ///
    /// Filtering runs on premultiplied values so transparent edges do not bleed color.
    pub fn resized(&self, width: u32, height: u32) -> CarouselResult<Self> {
        byte_len(width, height)?;
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let buf = self.as_image_buffer()?;
        let out = image::imageops::resize(&buf, width, height, image::imageops::FilterType::Triangle);
        Self::from_premul(width, height, out.into_raw())
    }

    pub fn cropped(&self, x: u32, y: u32, width: u32, height: u32) -> CarouselResult<Self> {
        byte_len(width, height)?;
        if x.saturating_add(width) > self.width || y.saturating_add(height) > self.height {
            return Err(CarouselError::layout(format!(
                "crop {width}x{height}+{x}+{y} exceeds {}x{}",
                self.width, self.height
            )));
        }
        let buf = self.as_image_buffer()?;
        let out = image::imageops::crop_imm(&buf, x, y, width, height).to_image();
        Self::from_premul(width, height, out.into_raw())
    }

    /// Scale to cover `width`x`height`, then center-crop.
    pub fn cover(&self, width: u32, height: u32) -> CarouselResult<Self> {
        byte_len(width, height)?;
        let scale = f64::max(
            f64::from(width) / f64::from(self.width),
            f64::from(height) / f64::from(self.height),
        );
        let sw = ((f64::from(self.width) * scale).ceil() as u32).max(width);
        let sh = ((f64::from(self.height) * scale).ceil() as u32).max(height);
        let scaled = self.resized(sw, sh)?;
        scaled.cropped((sw - width) / 2, (sh - height) / 2, width, height)
    }

    /// Largest size with this surface's aspect ratio that fits in `max_w`x`max_h`.
    pub fn fit_within(&self, max_w: u32, max_h: u32) -> CarouselResult<Self> {
        byte_len(max_w, max_h)?;
        let scale = f64::min(
            f64::from(max_w) / f64::from(self.width),
            f64::from(max_h) / f64::from(self.height),
        );
        let w = ((f64::from(self.width) * scale).round() as u32).clamp(1, max_w);
        let h = ((f64::from(self.height) * scale).round() as u32).clamp(1, max_h);
        self.resized(w, h)
    }

    pub fn encode_png(&self) -> CarouselResult<Vec<u8>> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| CarouselError::layout("surface buffer does not match its dimensions"))?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }

    pub(crate) fn from_pixmap(pixmap: tiny_skia::Pixmap) -> CarouselResult<Self> {
        let (w, h) = (pixmap.width(), pixmap.height());
        Self::from_premul(w, h, pixmap.take())
    }

    pub(crate) fn to_pixmap(&self) -> CarouselResult<tiny_skia::Pixmap> {
        let size = tiny_skia::IntSize::from_wh(self.width, self.height)
            .ok_or_else(|| CarouselError::layout("invalid pixmap size"))?;
        tiny_skia::Pixmap::from_vec(self.data.clone(), size)
            .ok_or_else(|| CarouselError::layout("pixmap rejected surface buffer"))
    }

    fn as_image_buffer(&self) -> CarouselResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| CarouselError::layout("surface buffer does not match its dimensions"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
