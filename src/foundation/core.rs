use crate::foundation::error::{StoryError, StoryResult};

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure red, the warm overlay color.
    pub const RED: Self = Self::new(255, 0, 0);
    /// Pure blue, the cold overlay color.
    pub const BLUE: Self = Self::new(0, 0, 255);
    /// Option highlight outline color.
    pub const YELLOW: Self = Self::new(255, 255, 0);

    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert into an `image` pixel.
    pub fn to_pixel(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }
}

impl From<image::Rgb<u8>> for Rgb8 {
    fn from(px: image::Rgb<u8>) -> Self {
        Self::new(px[0], px[1], px[2])
    }
}

/// Dimensions of the visible surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Create a validated size; both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> StoryResult<Self> {
        if width == 0 || height == 0 {
            return Err(StoryError::invalid_input(format!(
                "surface size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub(crate) fn w(self) -> i32 {
        self.width as i32
    }

    pub(crate) fn h(self) -> i32 {
        self.height as i32
    }
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Integer rectangle given by two corners, `(x1, y1)` inclusive to `(x2, y2)` exclusive.
///
/// Coordinates may lie outside the surface; drawing clips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IRect {
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Bottom edge.
    pub y2: i32,
}

impl IRect {
    /// Construct from corners.
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width, never negative.
    pub fn width(self) -> i32 {
        (self.x2 - self.x1).max(0)
    }

    /// Height, never negative.
    pub fn height(self) -> i32 {
        (self.y2 - self.y1).max(0)
    }

    /// Shrink every side by `pad`.
    pub fn inset(self, pad: i32) -> Self {
        Self::new(self.x1 + pad, self.y1 + pad, self.x2 - pad, self.y2 - pad)
    }

    /// Return `true` when `(x, y)` lies inside.
    pub fn contains(self, x: i32, y: i32) -> bool {
        self.x1 <= x && x < self.x2 && self.y1 <= y && y < self.y2
    }
}

/// Integer position on the surface (top-left anchor).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
}

impl Point {
    /// Construct a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
