use crate::{
    foundation::error::{CarouselError, CarouselResult},
    render::surface::Surface,
};

pub type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel, with `opacity` applied to the source.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Composite `src` onto `dst` with its top-left corner at (`left`, `top`).
///
/// Parts of `src` outside `dst` are clipped; a fully off-canvas source is a no-op.
pub fn over_at(
    dst: &mut Surface,
    src: &Surface,
    left: i64,
    top: i64,
    opacity: f32,
) -> CarouselResult<()> {
    if dst.width() == 0 || dst.height() == 0 {
        return Err(CarouselError::layout("composite target has no usable dimensions"));
    }
    let dw = i64::from(dst.width());
    let dh = i64::from(dst.height());
    let sw = i64::from(src.width());
    let sh = i64::from(src.height());

    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = (left + sw).min(dw);
    let y1 = (top + sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let src_data = src.data();
    let dst_data = dst.data_mut();
    let run = ((x1 - x0) * 4) as usize;
    for y in y0..y1 {
        let sy = y - top;
        let s_start = ((sy * sw + (x0 - left)) * 4) as usize;
        let d_start = ((y * dw + x0) * 4) as usize;
        let s_row = &src_data[s_start..s_start + run];
        let d_row = &mut dst_data[d_start..d_start + run];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Multiply every pixel by the coverage of a rounded rectangle spanning the whole surface.
///
/// Edges are antialiased over one pixel.
pub fn round_corners(surface: &mut Surface, radius: f64) {
    let w = f64::from(surface.width());
    let h = f64::from(surface.height());
    let r = radius.clamp(0.0, w.min(h) / 2.0);
    if r <= 0.0 {
        return;
    }

    let width = surface.width() as usize;
    let data = surface.data_mut();
    for (i, px) in data.chunks_exact_mut(4).enumerate() {
        let x = (i % width) as f64 + 0.5;
        let y = (i / width) as f64 + 0.5;
        let cx = x.clamp(r, w - r);
        let cy = y.clamp(r, h - r);
        let (dx, dy) = (x - cx, y - cy);
        if dx == 0.0 && dy == 0.0 {
            continue;
        }
        let dist = (dx * dx + dy * dy).sqrt();
        let coverage = (r - dist + 0.5).clamp(0.0, 1.0);
        if coverage >= 1.0 {
            continue;
        }
        let cov = (coverage * 255.0).round() as u16;
        for c in px.iter_mut() {
            *c = mul_div255(u16::from(*c), cov);
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((x as u32) * (y as u32) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
