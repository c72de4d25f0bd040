//! Container header serialization and parsing.
//!
//! The header is a fixed 28-byte block at the start of every container; see
//! the [module docs](crate::container) for the byte layout. Parsing
//! validates every field before the geometry is trusted anywhere else.

use crate::error::HeaderError;
use crate::io::{read_u16_le, read_u32_le};
use crate::pyramid::MAX_LEVELS;

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes identifying a container file.
pub const MAGIC: [u8; 4] = *b"MRJP";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 28;

// =============================================================================
// DownsampleKernel
// =============================================================================

/// The filter used to generate coarser pyramid levels.
///
/// Recorded in the header so the kernel is a versioned format parameter:
/// readers reject ids they don't know instead of mis-rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DownsampleKernel {
    /// 2x2 box (mean) filter with `(sum + 2) / 4` rounding
    Box2x2 = 1,
}

impl DownsampleKernel {
    /// Parse a kernel id from the header.
    pub fn from_id(id: u8) -> Result<Self, HeaderError> {
        match id {
            1 => Ok(DownsampleKernel::Box2x2),
            other => Err(HeaderError::UnknownKernel(other)),
        }
    }

    /// The id stored in the header.
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }
}

// =============================================================================
// Header
// =============================================================================

/// Parsed container header.
///
/// Carries everything needed to recompute the pyramid geometry and locate
/// the tile index; the index itself is parsed separately because its size
/// depends on these fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Format version
    pub version: u16,

    /// Downsample kernel used at encode time
    pub kernel: DownsampleKernel,

    /// Channel count (1 or 3)
    pub channels: u8,

    /// JPEG quality used at encode time (1-100)
    pub quality: u8,

    /// Tile edge length in pixels
    pub tile_size: u32,

    /// Level 0 width in pixels
    pub width: u32,

    /// Level 0 height in pixels
    pub height: u32,

    /// Number of pyramid levels
    pub level_count: u32,
}

impl Header {
    /// Serialize to the fixed 28-byte representation.
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6] = self.kernel.id();
        bytes[7] = self.channels;
        bytes[8] = self.quality;
        // bytes 9..12 reserved
        bytes[12..16].copy_from_slice(&self.tile_size.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.width.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.height.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.level_count.to_le_bytes());
        bytes
    }

    /// Parse and validate a header from raw bytes.
    ///
    /// # Errors
    ///
    /// - `FileTooSmall` if fewer than [`HEADER_SIZE`] bytes are available
    /// - `InvalidMagic` / `InvalidVersion` if the file is not a container
    ///   (or from a future format revision)
    /// - `UnknownKernel`, `InvalidChannels`, `InvalidQuality` on field
    ///   violations
    /// - `Layout` if the recorded level count is 0 or above [`MAX_LEVELS`]
    ///
    /// Dimension and tile-size zeroes are reported when the caller feeds the
    /// fields into [`crate::pyramid::PyramidLayout::compute_with_level_count`].
    pub fn parse(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() < HEADER_SIZE {
            return Err(HeaderError::FileTooSmall {
                required: HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(HeaderError::InvalidMagic(magic));
        }

        let version = read_u16_le(&bytes[4..6]);
        if version != FORMAT_VERSION {
            return Err(HeaderError::InvalidVersion(version));
        }

        let kernel = DownsampleKernel::from_id(bytes[6])?;

        let channels = bytes[7];
        if channels != 1 && channels != 3 {
            return Err(HeaderError::InvalidChannels(channels));
        }

        let quality = bytes[8];
        if quality == 0 || quality > 100 {
            return Err(HeaderError::InvalidQuality(quality));
        }

        let tile_size = read_u32_le(&bytes[12..16]);
        let width = read_u32_le(&bytes[16..20]);
        let height = read_u32_le(&bytes[20..24]);

        let level_count = read_u32_le(&bytes[24..28]);
        if level_count == 0 || level_count > MAX_LEVELS {
            return Err(HeaderError::Layout(
                crate::error::LayoutError::InvalidLevelCount {
                    requested: level_count,
                    max: MAX_LEVELS,
                },
            ));
        }

        Ok(Header {
            version,
            kernel,
            channels,
            quality,
            tile_size,
            width,
            height,
            level_count,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
