//! Decoding of colors, images and ffmpeg-backed media.

pub mod color;
pub mod decode;
pub mod media;
