use crate::{
    foundation::error::{CarouselError, CarouselResult},
    render::surface::Surface,
};

/// Largest blur radius accepted; larger requests are clamped.
pub const MAX_BLUR_RADIUS: u32 = 64;

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Separable gaussian blur of a premultiplied surface, with sigma = radius / 2.
///
/// Edges clamp to the nearest pixel, so a uniform surface is unchanged.
pub fn blur_surface(src: &Surface, radius: u32) -> CarouselResult<Surface> {
    let radius = radius.min(MAX_BLUR_RADIUS);
    if radius == 0 {
        return Ok(src.clone());
    }
    let sigma = (radius as f32 / 2.0).max(0.5);
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let (w, h) = (src.width(), src.height());
    let mut tmp = vec![0u8; src.data().len()];
    let mut out = vec![0u8; src.data().len()];
    pass(src.data(), &mut tmp, w, h, &kernel, Axis::Horizontal);
    pass(&tmp, &mut out, w, h, &kernel, Axis::Vertical);
    Surface::from_premul(w, h, out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CarouselResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CarouselError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| (-f64::from(i * i) / denom).exp())
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(CarouselError::layout("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i32;
    let (w, h) = (width as i32, height as i32);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i32 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + d).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + d).clamp(0, h - 1)),
                };
                let idx = ((sy * w + sx) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out_idx + c] = (((a + 32768) >> 16).min(255)) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
