// Core pixel types shared by every stage.
// Visual: a PixelBuffer is one captured layer of the map; alpha 0 means nothing was drawn there.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Straight (non-premultiplied) RGBA color, each channel nominally in [0,1].
/// Channels may exceed 1.0 after additive compositing; nothing here clamps implicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// True when something was drawn here (alpha > 0).
    #[inline]
    pub fn is_painted(&self) -> bool {
        self.a > 0.0
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Every channel clamped into [0,1].
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }
}

impl Add for Rgba {
    type Output = Rgba;

    fn add(self, rhs: Rgba) -> Rgba {
        Rgba::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl AddAssign for Rgba {
    fn add_assign(&mut self, rhs: Rgba) {
        *self = *self + rhs;
    }
}

impl From<[f32; 4]> for Rgba {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Rgba::new(r, g, b, a)
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// Width × height of a buffer or of the final map, in pixels.
/// In configuration either `{ "width": .., "height": .. }` or a square preset like `"512"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SizeSetting")]
pub struct OutputSize {
    pub width: usize,
    pub height: usize,
}

impl OutputSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn square(side: usize) -> Self {
        Self { width: side, height: side }
    }

    #[inline]
    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Square texture presets offered by the capture tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureSize {
    #[serde(rename = "128")]
    S128,
    #[serde(rename = "256")]
    S256,
    #[serde(rename = "512")]
    S512,
    #[serde(rename = "1024")]
    S1024,
    #[serde(rename = "2048")]
    S2048,
}

impl TextureSize {
    pub const fn side(self) -> usize {
        match self {
            TextureSize::S128 => 128,
            TextureSize::S256 => 256,
            TextureSize::S512 => 512,
            TextureSize::S1024 => 1024,
            TextureSize::S2048 => 2048,
        }
    }
}

impl From<TextureSize> for OutputSize {
    fn from(t: TextureSize) -> Self {
        OutputSize::square(t.side())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeSetting {
    Preset(TextureSize),
    Explicit { width: usize, height: usize },
}

impl From<SizeSetting> for OutputSize {
    fn from(setting: SizeSetting) -> Self {
        match setting {
            SizeSetting::Preset(preset) => preset.into(),
            SizeSetting::Explicit { width, height } => OutputSize::new(width, height),
        }
    }
}

/// Row-major RGBA raster. `pixels.len() == width * height` always holds.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// A fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    pub fn filled(width: usize, height: usize, color: Rgba) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgba>) -> Result<Self, Error> {
        if pixels.len() != width * height {
            return Err(Error::BufferLength {
                size: OutputSize::new(width, height),
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> OutputSize {
        OutputSize::new(self.width, self.height)
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Row-major index of (x, y); out-of-range coordinates are an error, never clamped.
    pub fn index_of(&self, x: usize, y: usize) -> Result<usize, Error> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds { x, y, size: self.size() });
        }
        Ok(y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Rgba, Error> {
        let idx = self.index_of(x, y)?;
        Ok(self.pixels[idx])
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgba) -> Result<(), Error> {
        let idx = self.index_of(x, y)?;
        self.pixels[idx] = color;
        Ok(())
    }

    /// New buffer of the same size with `f` applied to every pixel.
    pub fn map(&self, f: impl Fn(Rgba) -> Rgba) -> PixelBuffer {
        PixelBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|&p| f(p)).collect(),
        }
    }

    /// Same-size buffer over `pixels`, which must come from iterating this buffer.
    pub(crate) fn with_pixels(&self, pixels: Vec<Rgba>) -> PixelBuffer {
        debug_assert_eq!(pixels.len(), self.pixels.len());
        PixelBuffer { width: self.width, height: self.height, pixels }
    }

    /// Number of pixels with alpha > 0.
    pub fn painted_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_painted()).count()
    }

    /// Copy with every channel clamped into [0,1].
    /// Visual: tames the super-saturated spots additive blending can produce.
    pub fn clamped(&self) -> PixelBuffer {
        self.map(Rgba::clamped)
    }
}
