use std::fmt;
use std::str::FromStr;

use image::RgbImage;

use crate::effects::blur::gaussian_blur;
use crate::effects::composite::{blend, fill_rect};
use crate::foundation::core::{IRect, Rgb8};
use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::rng::Rng64;

/// Weight of the noise overlay in the final blend, independent of blur.
pub const NOISE_OVERLAY_WEIGHT: f32 = 0.3;

/// Shape of the primitives scattered over the noise overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoisePattern {
    /// Full-width bars at random heights.
    Horizontal,
    /// Full-height bars at random columns.
    Vertical,
    /// Unfilled circles at random centers.
    Circular,
}

impl NoisePattern {
    /// Short code used in scripts (`HL`, `VL`, `CL`).
    pub fn code(self) -> &'static str {
        match self {
            Self::Horizontal => "HL",
            Self::Vertical => "VL",
            Self::Circular => "CL",
        }
    }
}

impl FromStr for NoisePattern {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hl" | "horizontal" => Ok(Self::Horizontal),
            "vl" | "vertical" => Ok(Self::Vertical),
            "cl" | "circular" => Ok(Self::Circular),
            _ => Err(StoryError::invalid_pattern(format!(
                "unrecognized noise pattern \"{s}\" (expected HL, VL or CL)"
            ))),
        }
    }
}

impl fmt::Display for NoisePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl serde::Serialize for NoisePattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> serde::Deserialize<'de> for NoisePattern {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable noise effect parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "NoiseConfigDef", into = "NoiseConfigDef")]
pub struct NoiseConfig {
    randomness: u8,
    pattern: NoisePattern,
    blur: u8,
}

#[derive(Clone, Copy, serde::Serialize, serde::Deserialize)]
struct NoiseConfigDef {
    randomness: i64,
    pattern: NoisePattern,
    #[serde(default)]
    blur: i64,
}

impl TryFrom<NoiseConfigDef> for NoiseConfig {
    type Error = StoryError;

    fn try_from(def: NoiseConfigDef) -> Result<Self, Self::Error> {
        Self::new(def.randomness, def.pattern, def.blur)
    }
}

impl From<NoiseConfig> for NoiseConfigDef {
    fn from(cfg: NoiseConfig) -> Self {
        Self {
            randomness: i64::from(cfg.randomness),
            pattern: cfg.pattern,
            blur: i64::from(cfg.blur),
        }
    }
}

impl NoiseConfig {
    /// Validate and build a config. `randomness` and `blur` must lie in `[0, 100]`.
    pub fn new(randomness: i64, pattern: NoisePattern, blur: i64) -> StoryResult<Self> {
        if !(0..=100).contains(&randomness) || !(0..=100).contains(&blur) {
            return Err(StoryError::invalid_input(format!(
                "randomness and blur must be between 0 and 100, got {randomness} and {blur}"
            )));
        }
        Ok(Self {
            randomness: randomness as u8,
            pattern,
            blur: blur as u8,
        })
    }

    /// Build from a pattern code such as `"HL"`.
    pub fn parse(randomness: i64, pattern: &str, blur: i64) -> StoryResult<Self> {
        Self::new(randomness, pattern.parse()?, blur)
    }

    /// Density control in `[0, 100]`.
    pub fn randomness(&self) -> u8 {
        self.randomness
    }

    /// Primitive shape.
    pub fn pattern(&self) -> NoisePattern {
        self.pattern
    }

    /// Blur strength in `[0, 100]`.
    pub fn blur(&self) -> u8 {
        self.blur
    }

    /// Number of primitives drawn per refresh, at least one.
    pub fn element_count(&self) -> u32 {
        (u32::from(self.randomness) * 10 / 100).max(1)
    }

    /// Gaussian standard deviation applied to the overlay.
    pub fn blur_sigma(&self) -> f32 {
        f32::from(self.blur) / 10.0
    }
}

/// Build the black canvas with randomized primitives, before blur.
pub fn noise_overlay(width: u32, height: u32, config: &NoiseConfig, rng: &mut Rng64) -> RgbImage {
    let mut overlay = RgbImage::new(width, height);
    let (w, h) = (width as i32, height as i32);
    if w == 0 || h == 0 {
        return overlay;
    }

    for _ in 0..config.element_count() {
        match config.pattern {
            NoisePattern::Horizontal => {
                let y = rng.range_inclusive(0, h - 1);
                let thickness = rng.range_inclusive(1, 7);
                let color = random_grain(rng);
                fill_rect(&mut overlay, IRect::new(0, y, w + 1, y + thickness + 1), color);
            }
            NoisePattern::Vertical => {
                let x = rng.range_inclusive(0, w - 1);
                let thickness = rng.range_inclusive(1, 7);
                let color = random_grain(rng);
                fill_rect(&mut overlay, IRect::new(x, 0, x + thickness + 1, h + 1), color);
            }
            NoisePattern::Circular => {
                let radius = rng.range_inclusive(5, 20);
                let cx = rng.range_inclusive(0, w);
                let cy = rng.range_inclusive(0, h);
                let color = random_grain(rng);
                circle_outline(&mut overlay, cx, cy, radius, color);
            }
        }
    }
    overlay
}

/// Overlay procedural grain on `image`.
///
/// The overlay is blurred with sigma `blur / 10` when `blur > 0`, then blended in at a fixed
/// 30% weight. Output varies with `rng`; only structure is stable.
#[tracing::instrument(level = "trace", skip(image, rng))]
pub fn apply_noise(image: &RgbImage, config: &NoiseConfig, rng: &mut Rng64) -> StoryResult<RgbImage> {
    let (w, h) = image.dimensions();
    let mut overlay = noise_overlay(w, h, config, rng);
    if config.blur > 0 {
        overlay = gaussian_blur(&overlay, config.blur_sigma())?;
    }
    blend(image, &overlay, NOISE_OVERLAY_WEIGHT)
}

fn random_grain(rng: &mut Rng64) -> Rgb8 {
    Rgb8::new(rng.channel(100, 200), rng.channel(100, 200), rng.channel(100, 200))
}

// Midpoint circle, one pixel wide.
fn circle_outline(dst: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Rgb8) {
    let px = color.to_pixel();
    let (w, h) = (dst.width() as i32, dst.height() as i32);
    let mut plot = |x: i32, y: i32| {
        if (0..w).contains(&x) && (0..h).contains(&y) {
            dst.put_pixel(x as u32, y as u32, px);
        }
    };

    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    while x >= y {
        for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            plot(cx + dx, cy + dy);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/noise.rs"]
mod tests;
