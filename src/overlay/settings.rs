use serde_json::Value;

use crate::foundation::core::Point;
use crate::foundation::error::{StoryError, StoryResult};

/// Placement of an image or animation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSettings {
    pub width: u32,
    pub height: u32,
    pub position: Point,
}

impl ImageSettings {
    /// Validated settings; the scale must be non-zero.
    pub fn new(width: u32, height: u32, position: Point) -> StoryResult<Self> {
        if width == 0 || height == 0 {
            return Err(StoryError::resource_settings(format!(
                "image scale must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            position,
        })
    }

    /// Parse `[[w, h], [x, y]]` or `{"scale": [w, h], "position": [x, y]}`.
    pub fn from_json(v: &Value) -> StoryResult<Self> {
        let (scale, position) = match v {
            Value::Array(items) if items.len() == 2 => (&items[0], &items[1]),
            Value::Object(map) => (
                map.get("scale").unwrap_or(&Value::Null),
                map.get("position").unwrap_or(&Value::Null),
            ),
            _ => {
                return Err(StoryError::resource_settings(
                    "image settings must be [scale, position]",
                ));
            }
        };
        let (w, h) = pair_u32(scale, "scale")?;
        let (x, y) = pair_i32(position, "position")?;
        Self::new(w, h, Point { x, y })
    }
}

/// Playback settings for an audio track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioSettings {
    volume: u8,
    pub looping: bool,
}

impl AudioSettings {
    /// `volume` must lie in `[0, 100]`.
    pub fn new(volume: i64, looping: bool) -> StoryResult<Self> {
        Ok(Self {
            volume: validate_volume(volume)?,
            looping,
        })
    }

    /// Volume in `[0, 100]`.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Parse a bare volume integer or `{"volume": n, "loop": bool}`.
    pub fn from_json(v: &Value) -> StoryResult<Self> {
        match v {
            Value::Number(_) => Self::new(int(v, "volume")?, false),
            Value::Object(map) => {
                let volume = int(map.get("volume").unwrap_or(&Value::Null), "volume")?;
                let looping = match map.get("loop") {
                    None => false,
                    Some(Value::Bool(b)) => *b,
                    Some(_) => {
                        return Err(StoryError::resource_settings("audio loop must be a boolean"));
                    }
                };
                Self::new(volume, looping)
            }
            _ => Err(StoryError::resource_settings(
                "audio settings must be an integer volume between 0 and 100",
            )),
        }
    }
}

/// Settings for a video layer and its soundtrack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoSettings {
    volume: u8,
    pub image: ImageSettings,
}

impl VideoSettings {
    pub fn new(volume: i64, image: ImageSettings) -> StoryResult<Self> {
        Ok(Self {
            volume: validate_volume(volume)?,
            image,
        })
    }

    /// Volume in `[0, 100]`.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Parse `[volume, [w, h], [x, y]]` or `{"volume": n, "scale": [w, h], "position": [x, y]}`.
    pub fn from_json(v: &Value) -> StoryResult<Self> {
        match v {
            Value::Array(items) if items.len() == 3 => {
                let volume = int(&items[0], "video volume")?;
                let image = ImageSettings::from_json(&Value::Array(items[1..].to_vec()))?;
                Self::new(volume, image)
            }
            Value::Object(map) => {
                let volume = int(map.get("volume").unwrap_or(&Value::Null), "video volume")?;
                Self::new(volume, ImageSettings::from_json(v)?)
            }
            _ => Err(StoryError::resource_settings(
                "video settings must be [volume, scale, position]",
            )),
        }
    }
}

fn validate_volume(volume: i64) -> StoryResult<u8> {
    if !(0..=100).contains(&volume) {
        return Err(StoryError::resource_settings(format!(
            "volume must be an integer between 0 and 100, got {volume}"
        )));
    }
    Ok(volume as u8)
}

fn int(v: &Value, what: &str) -> StoryResult<i64> {
    v.as_i64()
        .ok_or_else(|| StoryError::resource_settings(format!("{what} must be an integer")))
}

fn pair(v: &Value, what: &str) -> StoryResult<(i64, i64)> {
    match v.as_array().map(Vec::as_slice) {
        Some([a, b]) => Ok((int(a, what)?, int(b, what)?)),
        _ => Err(StoryError::resource_settings(format!(
            "{what} must be a pair of integers"
        ))),
    }
}

fn pair_u32(v: &Value, what: &str) -> StoryResult<(u32, u32)> {
    let (a, b) = pair(v, what)?;
    let conv = |n: i64| {
        u32::try_from(n)
            .map_err(|_| StoryError::resource_settings(format!("{what} out of range: {n}")))
    };
    Ok((conv(a)?, conv(b)?))
}

fn pair_i32(v: &Value, what: &str) -> StoryResult<(i32, i32)> {
    let (a, b) = pair(v, what)?;
    let conv = |n: i64| {
        i32::try_from(n)
            .map_err(|_| StoryError::resource_settings(format!("{what} out of range: {n}")))
    };
    Ok((conv(a)?, conv(b)?))
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/settings.rs"]
mod tests;
