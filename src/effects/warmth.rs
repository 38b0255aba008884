use std::borrow::Cow;

use image::RgbImage;

use crate::effects::composite::blend_solid;
use crate::foundation::core::Rgb8;

/// Lower bound of the warmth scale (fully blue).
pub const WARMTH_MIN: i32 = -100;
/// Upper bound of the warmth scale (fully red).
pub const WARMTH_MAX: i32 = 100;

/// Shift the color temperature of `image`.
///
/// `warmth == 0` borrows the input untouched. Positive values blend toward red and negative
/// values toward blue, at factor `|warmth| / 100`. Values outside `[-100, 100]` are clamped.
pub fn apply_warmth(image: &RgbImage, warmth: i32) -> Cow<'_, RgbImage> {
    let warmth = warmth.clamp(WARMTH_MIN, WARMTH_MAX);
    if warmth == 0 {
        return Cow::Borrowed(image);
    }
    let overlay = if warmth < 0 { Rgb8::BLUE } else { Rgb8::RED };
    let factor = warmth.unsigned_abs() as f32 / 100.0;
    Cow::Owned(blend_solid(image, overlay, factor))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/warmth.rs"]
mod tests;
