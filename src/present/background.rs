use image::RgbImage;

use crate::assets::decode::scale_rgb;
use crate::effects::noise::{NoiseConfig, apply_noise};
use crate::effects::warmth::apply_warmth;
use crate::foundation::core::{Rgb8, SurfaceSize};
use crate::foundation::error::StoryResult;
use crate::foundation::rng::Rng64;

/// Background pipeline: `noise(warmth(scale(base)))` at the current surface size.
///
/// `clean` caches the warmth-adjusted frame so noise refreshes never compound.
#[derive(Debug)]
pub(crate) struct Background {
    base: RgbImage,
    scaled: RgbImage,
    warmth: i32,
    noise: Option<NoiseConfig>,
    clean: RgbImage,
    frame: RgbImage,
}

impl Background {
    pub(crate) fn new(
        base: RgbImage,
        size: SurfaceSize,
        warmth: i32,
        noise: Option<NoiseConfig>,
        rng: &mut Rng64,
    ) -> StoryResult<Self> {
        let scaled = scale_rgb(&base, size.width, size.height);
        let mut bg = Self {
            base,
            clean: scaled.clone(),
            frame: scaled.clone(),
            scaled,
            warmth,
            noise,
        };
        bg.rebuild(rng)?;
        Ok(bg)
    }

    pub(crate) fn solid(color: Rgb8, size: SurfaceSize) -> RgbImage {
        RgbImage::from_pixel(size.width, size.height, color.to_pixel())
    }

    pub(crate) fn frame(&self) -> &RgbImage {
        &self.frame
    }

    pub(crate) fn warmth(&self) -> i32 {
        self.warmth
    }

    pub(crate) fn noise(&self) -> Option<&NoiseConfig> {
        self.noise.as_ref()
    }

    pub(crate) fn set_base(&mut self, base: RgbImage, rng: &mut Rng64) -> StoryResult<()> {
        let (w, h) = self.scaled.dimensions();
        self.scaled = scale_rgb(&base, w, h);
        self.base = base;
        self.rebuild(rng)
    }

    pub(crate) fn resize(&mut self, size: SurfaceSize, rng: &mut Rng64) -> StoryResult<()> {
        self.scaled = scale_rgb(&self.base, size.width, size.height);
        self.rebuild(rng)
    }

    pub(crate) fn set_warmth(&mut self, warmth: i32, rng: &mut Rng64) -> StoryResult<()> {
        self.warmth = warmth;
        self.rebuild(rng)
    }

    pub(crate) fn set_noise(
        &mut self,
        noise: Option<NoiseConfig>,
        rng: &mut Rng64,
    ) -> StoryResult<()> {
        self.noise = noise;
        self.refresh_noise(rng)
    }

    /// Regenerate the grain from the clean frame.
    pub(crate) fn refresh_noise(&mut self, rng: &mut Rng64) -> StoryResult<()> {
        self.frame = match &self.noise {
            Some(cfg) => apply_noise(&self.clean, cfg, rng)?,
            None => self.clean.clone(),
        };
        Ok(())
    }

    fn rebuild(&mut self, rng: &mut Rng64) -> StoryResult<()> {
        self.clean = apply_warmth(&self.scaled, self.warmth).into_owned();
        self.refresh_noise(rng)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/present/background.rs"]
mod tests;
