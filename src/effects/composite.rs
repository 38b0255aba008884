use image::{RgbImage, RgbaImage};

use crate::foundation::core::{IRect, Rgb8};
use crate::foundation::error::{StoryError, StoryResult};

/// Linear interpolation of one channel with an 8-bit weight `t` in `0..=255`.
pub fn lerp_u8(a: u8, b: u8, t: u8) -> u8 {
    let t = u32::from(t);
    let it = 255 - t;
    ((u32::from(a) * it + u32::from(b) * t + 127) / 255) as u8
}

/// Quantize a blend factor in `[0, 1]` to an 8-bit weight.
pub fn factor_to_u8(f: f32) -> u8 {
    let f = if f.is_finite() { f.clamp(0.0, 1.0) } else { 0.0 };
    (f * 255.0).round() as u8
}

/// `out = a * (1 - f) + b * f` per channel. Both images must share dimensions.
pub fn blend(a: &RgbImage, b: &RgbImage, f: f32) -> StoryResult<RgbImage> {
    if a.dimensions() != b.dimensions() {
        return Err(StoryError::invalid_input(format!(
            "blend expects equal-sized images, got {:?} and {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    let t = factor_to_u8(f);
    let mut out = a.clone();
    for (d, s) in out.pixels_mut().zip(b.pixels()) {
        for c in 0..3 {
            d[c] = lerp_u8(d[c], s[c], t);
        }
    }
    Ok(out)
}

/// Blend every pixel toward a solid color. Equivalent to blending with a flat overlay.
pub fn blend_solid(a: &RgbImage, color: Rgb8, f: f32) -> RgbImage {
    let t = factor_to_u8(f);
    let rgb = [color.r, color.g, color.b];
    let mut out = a.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            px[c] = lerp_u8(px[c], rgb[c], t);
        }
    }
    out
}

/// Fill `rect` (clipped) with a solid color.
pub fn fill_rect(dst: &mut RgbImage, rect: IRect, color: Rgb8) {
    let Some((x0, y0, x1, y1)) = clip(dst, rect) else {
        return;
    };
    let px = color.to_pixel();
    for y in y0..y1 {
        for x in x0..x1 {
            dst.put_pixel(x, y, px);
        }
    }
}

/// Fill `rect` with a 50% checkerboard stipple, leaving every other pixel untouched.
pub fn stipple_rect(dst: &mut RgbImage, rect: IRect, color: Rgb8) {
    let Some((x0, y0, x1, y1)) = clip(dst, rect) else {
        return;
    };
    let px = color.to_pixel();
    for y in y0..y1 {
        for x in x0..x1 {
            if (x + y) % 2 == 0 {
                dst.put_pixel(x, y, px);
            }
        }
    }
}

/// Draw a rectangle outline of `width` pixels, centered on the rectangle edges.
pub fn outline_rect(dst: &mut RgbImage, rect: IRect, color: Rgb8, width: i32) {
    let width = width.max(1);
    let lo = width / 2;
    let hi = width - lo;
    let edges = [
        IRect::new(rect.x1 - lo, rect.y1 - lo, rect.x2 + hi, rect.y1 + hi),
        IRect::new(rect.x1 - lo, rect.y2 - lo, rect.x2 + hi, rect.y2 + hi),
        IRect::new(rect.x1 - lo, rect.y1 - lo, rect.x1 + hi, rect.y2 + hi),
        IRect::new(rect.x2 - lo, rect.y1 - lo, rect.x2 + hi, rect.y2 + hi),
    ];
    for edge in edges {
        fill_rect(dst, edge, color);
    }
}

/// Copy `src` onto `dst` with its top-left corner at `(x, y)`, honoring straight alpha.
pub fn draw_rgba(dst: &mut RgbImage, src: &RgbaImage, x: i32, y: i32) {
    let rect = IRect::new(x, y, x + src.width() as i32, y + src.height() as i32);
    let Some((x0, y0, x1, y1)) = clip(dst, rect) else {
        return;
    };
    for dy in y0..y1 {
        for dx in x0..x1 {
            let s = src.get_pixel((dx as i32 - x) as u32, (dy as i32 - y) as u32);
            let a = s[3];
            if a == 0 {
                continue;
            }
            let d = dst.get_pixel_mut(dx, dy);
            for c in 0..3 {
                d[c] = lerp_u8(d[c], s[c], a);
            }
        }
    }
}

fn clip(dst: &RgbImage, rect: IRect) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.x1.max(0);
    let y0 = rect.y1.max(0);
    let x1 = rect.x2.min(dst.width() as i32);
    let y1 = rect.y2.min(dst.height() as i32);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
