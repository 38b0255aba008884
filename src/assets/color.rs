use std::str::FromStr;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{StoryError, StoryResult};

const NAMED: &[(&str, Rgb8)] = &[
    ("white", Rgb8::WHITE),
    ("black", Rgb8::BLACK),
    ("red", Rgb8::RED),
    ("green", Rgb8::new(0, 128, 0)),
    ("blue", Rgb8::BLUE),
    ("yellow", Rgb8::YELLOW),
    ("gray", Rgb8::new(190, 190, 190)),
    ("grey", Rgb8::new(190, 190, 190)),
    ("orange", Rgb8::new(255, 165, 0)),
    ("purple", Rgb8::new(160, 32, 240)),
    ("cyan", Rgb8::new(0, 255, 255)),
    ("magenta", Rgb8::new(255, 0, 255)),
    ("pink", Rgb8::new(255, 192, 203)),
    ("brown", Rgb8::new(165, 42, 42)),
];

/// Parse `#RGB`, `#RRGGBB` or a named color (case-insensitive).
pub fn parse_color(s: &str) -> StoryResult<Rgb8> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).map_err(StoryError::invalid_input);
    }
    let lower = s.to_ascii_lowercase();
    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, c)| *c)
        .ok_or_else(|| StoryError::invalid_input(format!("unknown color \"{s}\"")))
}

fn parse_hex(s: &str) -> Result<Rgb8, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    match s.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, ch) in s.char_indices() {
                let nib = hex_byte(&ch.to_string())?;
                out[i] = nib * 17;
            }
            Ok(Rgb8::new(out[0], out[1], out[2]))
        }
        6 => Ok(Rgb8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        _ => Err("hex color must be #RGB or #RRGGBB (case-insensitive)".to_owned()),
    }
}

impl FromStr for Rgb8 {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}

impl serde::Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b))
    }
}

impl<'de> serde::Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Arr([u8; 3]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => parse_color(&s).map_err(serde::de::Error::custom),
            Repr::Arr([r, g, b]) => Ok(Rgb8::new(r, g, b)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
