use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::effects::noise::NoiseConfig;
use crate::effects::warmth::{WARMTH_MAX, WARMTH_MIN};
use crate::foundation::core::{Rgb8, SurfaceSize};
use crate::foundation::error::{StoryError, StoryResult};
use crate::store::choice::DEFAULT_STORE_FILE;

/// Construction parameters for a [`crate::Presenter`].
///
/// JSON fields are all optional:
///
/// ```json
/// {"width": 800, "height": 600, "background_color": "#fff", "warmth": 0,
///  "noise": {"randomness": 20, "pattern": "HL", "blur": 0}, "store_path": "gamedata.json"}
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresenterConfig {
    pub width: u32,
    pub height: u32,
    /// Takes precedence over `background_color` when set.
    pub background_image: Option<PathBuf>,
    pub background_color: Rgb8,
    /// Initial color temperature in `[-100, 100]`.
    pub warmth: i32,
    pub noise: Option<NoiseConfig>,
    pub store_path: PathBuf,
    /// Fixed seed for the grain generator; random when absent.
    pub seed: Option<u64>,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        let size = SurfaceSize::default();
        Self {
            width: size.width,
            height: size.height,
            background_image: None,
            background_color: Rgb8::WHITE,
            warmth: 0,
            noise: None,
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            seed: None,
        }
    }
}

impl PresenterConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> StoryResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| StoryError::invalid_input(format!("parse presenter config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StoryError::invalid_input(format!(
                "open presenter config JSON '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check ranges that serde cannot.
    pub fn validate(&self) -> StoryResult<()> {
        self.size()?;
        if !(WARMTH_MIN..=WARMTH_MAX).contains(&self.warmth) {
            return Err(StoryError::invalid_input(format!(
                "warmth must be between {WARMTH_MIN} and {WARMTH_MAX}, got {}",
                self.warmth
            )));
        }
        Ok(())
    }

    pub fn size(&self) -> StoryResult<SurfaceSize> {
        SurfaceSize::new(self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/present/config.rs"]
mod tests;
