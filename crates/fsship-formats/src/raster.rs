//! RGBA rasters and PNG encoding
//!
//! Rows are stored top to bottom, the same order PNG scanlines use. Ship
//! space grows upward, so row 0 of a raster shows the highest ship row.

use crate::types::RgbaColor;
use ::image::codecs::png::PngEncoder;
use ::image::imageops::FilterType;
use ::image::{ExtendedColorType, ImageEncoder, ImageFormat};
use std::fmt;
use thiserror::Error;

/// Errors from the PNG codec boundary
#[derive(Debug, Error)]
pub enum ImageError {
    /// Encoder or decoder failure
    #[error("PNG codec error: {0}")]
    Codec(#[from] ::image::ImageError),

    /// Zero-sized or oversized raster
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

/// Dimensions of a raster, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageSize {
    /// Create a size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Largest size with this aspect ratio that fits in `max`
    ///
    /// Never enlarges. Dimensions are rounded and kept at least 1.
    pub fn shrink_to_fit(self, max: Self) -> Self {
        if self.width == 0 || self.height == 0 {
            return self;
        }

        let factor = (f64::from(max.width) / f64::from(self.width))
            .min(f64::from(max.height) / f64::from(self.height))
            .min(1.0);

        let scale = |value: u32| ((f64::from(value) * factor).round() as u32).max(1);
        Self::new(scale(self.width), scale(self.height))
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// RGBA raster with rows stored top to bottom
#[derive(Clone, PartialEq, Eq)]
pub struct RgbaImage {
    size: ImageSize,
    pixels: Vec<RgbaColor>,
}

impl RgbaImage {
    /// Create a raster filled with one color
    pub fn new(size: ImageSize, fill: RgbaColor) -> Self {
        let len = size.width as usize * size.height as usize;
        Self {
            size,
            pixels: vec![fill; len],
        }
    }

    /// Wrap existing pixels
    ///
    /// Returns `None` if `pixels` does not hold exactly `width * height` entries.
    pub fn from_pixels(size: ImageSize, pixels: Vec<RgbaColor>) -> Option<Self> {
        (pixels.len() == size.width as usize * size.height as usize)
            .then_some(Self { size, pixels })
    }

    /// Raster dimensions
    pub const fn size(&self) -> ImageSize {
        self.size
    }

    /// All pixels, row by row from the top
    pub fn pixels(&self) -> &[RgbaColor] {
        &self.pixels
    }

    /// Pixel at `(x, y)` counted from the top-left corner
    pub fn get(&self, x: u32, y: u32) -> Option<RgbaColor> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrite the pixel at `(x, y)`; out-of-range coordinates are ignored
    pub fn set(&mut self, x: u32, y: u32, color: RgbaColor) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.size.width && y < self.size.height)
            .then(|| y as usize * self.size.width as usize + x as usize)
    }

    fn to_buffer(&self) -> Result<::image::RgbaImage, ImageError> {
        let bytes = self
            .pixels
            .iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect::<Vec<u8>>();

        ::image::RgbaImage::from_raw(self.size.width, self.size.height, bytes).ok_or(
            ImageError::InvalidDimensions {
                width: self.size.width,
                height: self.size.height,
            },
        )
    }

    fn from_buffer(buffer: &::image::RgbaImage) -> Self {
        let pixels = buffer
            .pixels()
            .map(|p| RgbaColor::new(p.0[0], p.0[1], p.0[2], p.0[3]))
            .collect();

        Self {
            size: ImageSize::new(buffer.width(), buffer.height()),
            pixels,
        }
    }

    /// Encode as an RGBA PNG
    pub fn encode_png(&self) -> Result<Vec<u8>, ImageError> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(ImageError::InvalidDimensions {
                width: self.size.width,
                height: self.size.height,
            });
        }

        let buffer = self.to_buffer()?;
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            buffer.as_raw(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )?;

        Ok(out)
    }

    /// Decode a PNG of any color type into RGBA
    pub fn decode_png(data: &[u8]) -> Result<Self, ImageError> {
        let decoded = ::image::load_from_memory_with_format(data, ImageFormat::Png)?;
        Ok(Self::from_buffer(&decoded.to_rgba8()))
    }

    /// Bilinear resize to exactly `size`
    pub fn resize(&self, size: ImageSize) -> Result<Self, ImageError> {
        if size == self.size {
            return Ok(self.clone());
        }
        if size.width == 0 || size.height == 0 {
            return Err(ImageError::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }

        let resized = ::image::imageops::resize(
            &self.to_buffer()?,
            size.width,
            size.height,
            FilterType::Triangle,
        );
        Ok(Self::from_buffer(&resized))
    }
}

impl fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RgbaImage")
            .field("size", &self.size)
            .field("pixels", &self.pixels.len())
            .finish()
    }
}
