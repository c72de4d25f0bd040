//! JPEG tile codec.
//!
//! Tiles are cropped to their valid pixels before encoding, so edge tiles
//! are encoded at their exact (smaller) size and decode back without any
//! padding. Encoding is deterministic: the same pixels and quality always
//! produce the same bytes, which is what makes whole containers
//! reproducible.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageReader};

use crate::error::TileError;
use crate::raster::RasterImage;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// Encode / Decode
// =============================================================================

/// Encode one tile as a JPEG stream at the given quality.
///
/// Quality is clamped to the valid range.
pub fn encode_tile(tile: &RasterImage, quality: u8) -> Result<Bytes, TileError> {
    let quality = clamp_quality(quality);

    let color_type = match tile.channels() {
        1 => ExtendedColorType::L8,
        _ => ExtendedColorType::Rgb8,
    };

    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);

    encoder
        .encode(tile.data(), tile.width(), tile.height(), color_type)
        .map_err(|e| TileError::Encode {
            message: e.to_string(),
        })?;

    Ok(Bytes::from(output))
}

/// Decode one tile's JPEG stream back into a raster.
///
/// The result is normalized to `channels` (1 or 3) regardless of what the
/// JPEG decoder hands back, so compositing never mixes pixel formats.
pub fn decode_tile(data: &[u8], channels: u8) -> Result<RasterImage, TileError> {
    let reader = ImageReader::with_format(Cursor::new(data), image::ImageFormat::Jpeg);

    let img = reader.decode().map_err(|e| TileError::Decode {
        message: e.to_string(),
    })?;

    let raster = match channels {
        1 => {
            let gray = img.into_luma8();
            RasterImage::from_vec(gray.width(), gray.height(), 1, gray.into_raw())
        }
        _ => {
            let rgb = img.into_rgb8();
            RasterImage::from_vec(rgb.width(), rgb.height(), 3, rgb.into_raw())
        }
    };

    raster.map_err(|e| TileError::Decode {
        message: e.to_string(),
    })
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate a JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    quality >= MIN_JPEG_QUALITY && quality <= MAX_JPEG_QUALITY
}

/// Clamp quality to the valid range.
///
/// Values below 1 become 1, values above 100 become 100.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
