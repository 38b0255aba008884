//! Pure image transforms applied to the background: color temperature and procedural grain.

pub mod blur;
pub mod composite;
pub mod noise;
pub mod warmth;
