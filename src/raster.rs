//! Owned 8-bit raster images and pixel rectangles.
//!
//! [`RasterImage`] is the pixel currency of the crate: the encoder consumes
//! one, the downsampler produces one per level, tiles are cropped out of one
//! and decoded tiles are composited back into one. Pixels are stored
//! row-major with interleaved channels, 8 bits per sample, 1 (grayscale) or
//! 3 (RGB) channels.

use image::DynamicImage;

use crate::error::RasterError;

// =============================================================================
// Rect
// =============================================================================

/// An axis-aligned pixel rectangle, used for region-of-interest decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge in pixels
    pub x: u32,

    /// Top edge in pixels
    pub y: u32,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom edge.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the rectangle covers zero pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with another rectangle, or `None` if they don't overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

// =============================================================================
// RasterImage
// =============================================================================

/// A decoded raster image.
///
/// The pixel buffer length is always exactly
/// `width * height * channels`, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl RasterImage {
    /// Create a raster from an existing pixel buffer.
    ///
    /// # Errors
    ///
    /// - `UnsupportedChannels` if `channels` is not 1 or 3
    /// - `SizeMismatch` if the buffer length is not `width * height * channels`
    pub fn from_vec(
        width: u32,
        height: u32,
        channels: u8,
        data: Vec<u8>,
    ) -> Result<Self, RasterError> {
        if channels != 1 && channels != 3 {
            return Err(RasterError::UnsupportedChannels(channels));
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(RasterError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Create a zero-filled raster.
    pub fn zeroed(width: u32, height: u32, channels: u8) -> Result<Self, RasterError> {
        let len = width as usize * height as usize * channels as usize;
        Self::from_vec(width, height, channels, vec![0u8; len])
    }

    /// Convert a decoded [`DynamicImage`] into a raster.
    ///
    /// Grayscale images stay single-channel; everything else becomes RGB8.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => Self {
                width: gray.width(),
                height: gray.height(),
                channels: 1,
                data: gray.as_raw().clone(),
            },
            other => {
                let rgb = other.to_rgb8();
                Self {
                    width: rgb.width(),
                    height: rgb.height(),
                    channels: 3,
                    data: rgb.into_raw(),
                }
            }
        }
    }

    /// Convert into a [`DynamicImage`] for export.
    ///
    /// Returns `None` only if the channel/buffer invariant was somehow
    /// violated, which `from_vec` makes impossible.
    pub fn into_dynamic(self) -> Option<DynamicImage> {
        match self.channels {
            1 => image::GrayImage::from_raw(self.width, self.height, self.data)
                .map(DynamicImage::ImageLuma8),
            3 => image::RgbImage::from_raw(self.width, self.height, self.data)
                .map(DynamicImage::ImageRgb8),
            _ => None,
        }
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of interleaved channels (1 or 3).
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// The raw pixel buffer.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes per pixel row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// One pixel row.
    ///
    /// # Panics
    /// Panics if `y` is out of bounds.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.row_bytes();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// One pixel's samples.
    ///
    /// # Panics
    /// Panics if `x` or `y` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        &self.data[start..start + c]
    }

    /// Copy a sub-rectangle out into a new raster.
    ///
    /// The rectangle must lie fully inside the image; callers derive it from
    /// a [`crate::pyramid::Level`]'s tile grid, which guarantees that.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> RasterImage {
        debug_assert!(x + width <= self.width && y + height <= self.height);

        let c = self.channels as usize;
        let src_stride = self.row_bytes();
        let dst_stride = width as usize * c;

        let mut data = Vec::with_capacity(dst_stride * height as usize);
        for row in 0..height as usize {
            let start = (y as usize + row) * src_stride + x as usize * c;
            data.extend_from_slice(&self.data[start..start + dst_stride]);
        }

        Self {
            width,
            height,
            channels: self.channels,
            data,
        }
    }

    /// Copy `src` into this raster with its top-left corner at `(x, y)`.
    ///
    /// `src` must have the same channel count and fit fully inside this
    /// raster; the compositing paths guarantee both.
    pub fn blit(&mut self, src: &RasterImage, x: u32, y: u32) {
        debug_assert_eq!(self.channels, src.channels);
        debug_assert!(x + src.width <= self.width && y + src.height <= self.height);

        let c = self.channels as usize;
        let dst_stride = self.row_bytes();
        let src_stride = src.row_bytes();

        for row in 0..src.height as usize {
            let dst_start = (y as usize + row) * dst_stride + x as usize * c;
            let src_start = row * src_stride;
            self.data[dst_start..dst_start + src_stride]
                .copy_from_slice(&src.data[src_start..src_start + src_stride]);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
