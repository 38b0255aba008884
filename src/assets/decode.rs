use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::imageops::FilterType;
use image::{AnimationDecoder, ImageFormat, ImageReader, RgbImage, RgbaImage};

use crate::foundation::error::{StoryError, StoryResult};

/// Open a background image and convert it to RGB.
///
/// Any failure is reported as [`StoryError::InvalidInput`]: the path is caller input.
pub fn open_background(path: &Path) -> StoryResult<RgbImage> {
    let img = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| {
            StoryError::invalid_input(format!(
                "invalid background image address '{}': {e}",
                path.display()
            ))
        })?
        .decode()
        .map_err(|e| {
            StoryError::invalid_input(format!(
                "invalid background image address '{}': {e}",
                path.display()
            ))
        })?;
    Ok(img.to_rgb8())
}

/// Decode a still PNG or JPEG overlay.
pub fn open_still(path: &Path) -> StoryResult<RgbaImage> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| {
            StoryError::resource_load(format!("cannot open image file '{}': {e}", path.display()))
        })?;
    match reader.format() {
        Some(ImageFormat::Png | ImageFormat::Jpeg) => {}
        other => {
            return Err(StoryError::resource_settings(format!(
                "file format {other:?} not supported for still images (png, jpg, jpeg)"
            )));
        }
    }
    let img = reader.decode().map_err(|e| {
        StoryError::resource_load(format!("cannot decode image file '{}': {e}", path.display()))
    })?;
    Ok(img.to_rgba8())
}

/// Decode every frame of a GIF.
///
/// When the animation cannot be decoded the file is read as a single still frame instead.
pub fn open_animation(path: &Path) -> StoryResult<Vec<RgbaImage>> {
    match decode_gif_frames(path) {
        Ok(frames) if !frames.is_empty() => Ok(frames),
        Ok(_) | Err(_) => {
            tracing::debug!(path = %path.display(), "animation decode failed; using a single frame");
            let img = image::open(path).map_err(|e| {
                StoryError::resource_load(format!(
                    "cannot open image file '{}': {e}",
                    path.display()
                ))
            })?;
            Ok(vec![img.to_rgba8()])
        }
    }
}

fn decode_gif_frames(path: &Path) -> StoryResult<Vec<RgbaImage>> {
    let f = File::open(path)?;
    let decoder = GifDecoder::new(BufReader::new(f))
        .map_err(|e| StoryError::resource_load(format!("gif header: {e}")))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| StoryError::resource_load(format!("gif frames: {e}")))?;
    Ok(frames.into_iter().map(|f| f.into_buffer()).collect())
}

/// Resample to an exact size with a Lanczos filter. Same-size input is returned as is.
pub fn scale_rgba(img: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img;
    }
    image::imageops::resize(&img, width, height, FilterType::Lanczos3)
}

/// RGB flavor of [`scale_rgba`].
pub fn scale_rgb(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    image::imageops::resize(img, width, height, FilterType::Lanczos3)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
