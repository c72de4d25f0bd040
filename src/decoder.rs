//! Container decoder.
//!
//! A [`Decoder`] is an open, validated container handle. Opening parses the
//! header and the full tile index up front, so every later operation knows
//! exactly which byte range each tile occupies; decode calls then read and
//! JPEG-decode only the tiles they need.
//!
//! Tile-level failures abort the call that hit them but leave the handle
//! usable; the caller may retry a different level or region.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::container::{Header, TileIndex, HEADER_SIZE};
use crate::error::{DecodeError, TileError};
use crate::io::{FileRangeReader, MemoryRangeReader, RangeReader};
use crate::pyramid::{Level, PyramidLayout};
use crate::raster::{RasterImage, Rect};
use crate::tile::cache::{TileCache, TileCacheKey};
use crate::tile::jpeg;

// =============================================================================
// Decoder
// =============================================================================

/// An open container handle.
///
/// Generic over the [`RangeReader`] so the same decoder works on local files
/// and in-memory buffers. The handle is read-only and internally
/// synchronized; concurrent decodes against one handle are safe.
///
/// # Example
///
/// ```no_run
/// use mrj::{Decoder, Rect};
///
/// let decoder = Decoder::open(std::path::Path::new("image.mrj")).unwrap();
/// let thumbnail = decoder.decode_level(decoder.level_count() - 1).unwrap();
/// let detail = decoder.decode_region(0, Rect::new(100, 100, 512, 512)).unwrap();
/// # let _ = (thumbnail, detail);
/// ```
pub struct Decoder<R: RangeReader> {
    reader: R,
    header: Header,
    layout: PyramidLayout,
    index: TileIndex,
    cache: TileCache,
}

impl Decoder<FileRangeReader> {
    /// Open a container file.
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let reader = FileRangeReader::open(path)?;
        Self::open_with_reader(reader)
    }
}

impl Decoder<MemoryRangeReader> {
    /// Open a container held in memory.
    pub fn open_bytes(data: impl Into<bytes::Bytes>) -> Result<Self, DecodeError> {
        Self::open_with_reader(MemoryRangeReader::new(data, "memory"))
    }
}

impl<R: RangeReader> Decoder<R> {
    /// Open a container behind any [`RangeReader`].
    ///
    /// Parses and validates the header and the complete tile index; a
    /// corrupt or truncated container is rejected here, before any tile
    /// data is touched.
    pub fn open_with_reader(reader: R) -> Result<Self, DecodeError> {
        Self::open_with_reader_and_cache(reader, TileCache::new())
    }

    /// Open with an explicitly sized decoded-tile cache.
    pub fn open_with_reader_and_cache(reader: R, cache: TileCache) -> Result<Self, DecodeError> {
        let file_size = reader.size();
        if file_size < HEADER_SIZE as u64 {
            return Err(DecodeError::Header(
                crate::error::HeaderError::FileTooSmall {
                    required: HEADER_SIZE as u64,
                    actual: file_size,
                },
            ));
        }

        let header_bytes = reader.read_exact_at(0, HEADER_SIZE)?;
        let header = Header::parse(&header_bytes)?;

        let layout = PyramidLayout::compute_with_level_count(
            header.width,
            header.height,
            header.tile_size,
            header.level_count,
        )
        .map_err(crate::error::HeaderError::Layout)?;

        // The file must hold the full index the geometry implies
        let index_len = TileIndex::byte_len(&layout);
        let index_end = HEADER_SIZE as u64 + index_len;
        if index_end > file_size {
            return Err(DecodeError::Header(crate::error::HeaderError::Truncated {
                required: index_end,
                actual: file_size,
            }));
        }

        let index_bytes = reader.read_exact_at(HEADER_SIZE as u64, index_len as usize)?;
        let index = TileIndex::parse(&index_bytes, &layout, file_size)?;

        debug!(
            container = reader.identifier(),
            width = header.width,
            height = header.height,
            levels = header.level_count,
            tile_size = header.tile_size,
            "container opened"
        );

        Ok(Self {
            reader,
            header,
            layout,
            index,
            cache,
        })
    }

    /// The parsed container header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The pyramid geometry.
    #[inline]
    pub fn layout(&self) -> &PyramidLayout {
        &self.layout
    }

    /// Number of pyramid levels.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.layout.level_count()
    }

    /// Dimensions of the full-resolution level.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.layout.dimensions()
    }

    /// Metadata for one level.
    pub fn level_info(&self, level: usize) -> Option<&Level> {
        self.layout.get_level(level)
    }

    /// Decode one full level into a raster.
    ///
    /// # Errors
    ///
    /// - `InvalidLevel` if `level` is outside `[0, level_count)`
    /// - `Tile` if any tile's JPEG stream fails to decode or has the wrong
    ///   dimensions
    /// - `Io` on read failures
    pub fn decode_level(&self, level: usize) -> Result<RasterImage, DecodeError> {
        let info = *self.level(level)?;

        let mut output = RasterImage::zeroed(info.width, info.height, self.header.channels)
            .expect("level dimensions are non-zero");

        for tile_y in 0..info.tiles_y {
            for tile_x in 0..info.tiles_x {
                let tile = self.decode_tile(level, tile_x, tile_y)?;
                output.blit(&tile, tile_x * info.tile_size, tile_y * info.tile_size);
            }
        }

        Ok(output)
    }

    /// Decode only the part of a level covered by `region`.
    ///
    /// Reads and decodes just the tiles overlapping the rectangle; this is
    /// the operation that makes the tiled layout worth having.
    ///
    /// # Errors
    ///
    /// - `InvalidLevel` if `level` is outside `[0, level_count)`
    /// - `EmptyRegion` / `RegionOutOfBounds` for degenerate rectangles
    /// - `Tile` / `Io` as in [`decode_level`](Self::decode_level)
    pub fn decode_region(&self, level: usize, region: Rect) -> Result<RasterImage, DecodeError> {
        let info = *self.level(level)?;

        if region.is_empty() {
            return Err(DecodeError::EmptyRegion {
                width: region.width,
                height: region.height,
            });
        }

        let (tiles_x, tiles_y) = info.tiles_overlapping(&region).ok_or(
            DecodeError::RegionOutOfBounds {
                level,
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                level_width: info.width,
                level_height: info.height,
            },
        )?;

        let mut output = RasterImage::zeroed(region.width, region.height, self.header.channels)
            .expect("region dimensions are non-zero");

        for tile_y in tiles_y {
            for tile_x in tiles_x.clone() {
                let tile_rect = info
                    .tile_rect(tile_x, tile_y)
                    .expect("tile coordinates from tiles_overlapping");
                let overlap = tile_rect
                    .intersect(&region)
                    .expect("tiles_overlapping only yields intersecting tiles");

                let tile = self.decode_tile(level, tile_x, tile_y)?;

                // Crop the overlap out of the tile, then place it relative
                // to the region origin
                let part = tile.crop(
                    overlap.x - tile_rect.x,
                    overlap.y - tile_rect.y,
                    overlap.width,
                    overlap.height,
                );
                output.blit(&part, overlap.x - region.x, overlap.y - region.y);
            }
        }

        Ok(output)
    }

    /// Decode a single tile, consulting the decoded-tile cache first.
    ///
    /// # Errors
    ///
    /// - `InvalidLevel` if `level` is outside `[0, level_count)`
    /// - `TileOutOfBounds` if the coordinates are outside the level's grid
    /// - `Tile` with `SizeMismatch` if the decoded tile contradicts the layout
    pub fn decode_tile(
        &self,
        level: usize,
        tile_x: u32,
        tile_y: u32,
    ) -> Result<Arc<RasterImage>, DecodeError> {
        let info = *self.level(level)?;

        let tile_error = |source: TileError| DecodeError::Tile {
            level,
            tile_x,
            tile_y,
            source,
        };

        let (expected_w, expected_h) = info.tile_dimensions(tile_x, tile_y).ok_or(
            DecodeError::TileOutOfBounds {
                level,
                tile_x,
                tile_y,
                tiles_x: info.tiles_x,
                tiles_y: info.tiles_y,
            },
        )?;

        let key = TileCacheKey::new(level as u32, tile_x, tile_y);
        if let Some(cached) = self.cache.get(&key) {
            trace!(level, tile_x, tile_y, "tile cache hit");
            return Ok(cached);
        }

        let tile_index = info
            .tile_index(tile_x, tile_y)
            .expect("checked by tile_dimensions above");
        let entry = self
            .index
            .get(level, tile_index)
            .expect("index entry count matches the layout");

        let data = self
            .reader
            .read_exact_at(entry.offset, entry.length as usize)?;
        let tile = jpeg::decode_tile(&data, self.header.channels).map_err(tile_error)?;

        if (tile.width(), tile.height()) != (expected_w, expected_h) {
            return Err(tile_error(TileError::SizeMismatch {
                expected_width: expected_w,
                expected_height: expected_h,
                actual_width: tile.width(),
                actual_height: tile.height(),
            }));
        }

        let tile = Arc::new(tile);
        self.cache.put(key, tile.clone());
        Ok(tile)
    }

    /// Snapshot of container metadata, for tooling and the `info` command.
    pub fn info(&self) -> ContainerInfo {
        ContainerInfo {
            version: self.header.version,
            channels: self.header.channels,
            quality: self.header.quality,
            tile_size: self.header.tile_size,
            width: self.header.width,
            height: self.header.height,
            levels: self
                .layout
                .levels()
                .iter()
                .map(|level| LevelInfo {
                    level: level.level_index,
                    width: level.width,
                    height: level.height,
                    tiles_x: level.tiles_x,
                    tiles_y: level.tiles_y,
                    downsample: level.downsample,
                    compressed_bytes: self
                        .index
                        .level_compressed_bytes(level.level_index)
                        .unwrap_or(0),
                })
                .collect(),
        }
    }

    fn level(&self, level: usize) -> Result<&Level, DecodeError> {
        self.layout
            .get_level(level)
            .ok_or(DecodeError::InvalidLevel {
                requested: level,
                level_count: self.layout.level_count(),
            })
    }
}

// =============================================================================
// ContainerInfo
// =============================================================================

/// Serializable container metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    /// Format version
    pub version: u16,

    /// Channel count (1 or 3)
    pub channels: u8,

    /// JPEG quality used at encode time
    pub quality: u8,

    /// Tile edge length in pixels
    pub tile_size: u32,

    /// Level 0 width in pixels
    pub width: u32,

    /// Level 0 height in pixels
    pub height: u32,

    /// Per-level metadata, finest-first
    pub levels: Vec<LevelInfo>,
}

/// Serializable metadata for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    /// Level index (0 = full resolution)
    pub level: usize,

    /// Level width in pixels
    pub width: u32,

    /// Level height in pixels
    pub height: u32,

    /// Number of tiles in X direction
    pub tiles_x: u32,

    /// Number of tiles in Y direction
    pub tiles_y: u32,

    /// Downsample factor relative to level 0
    pub downsample: u32,

    /// Total compressed tile bytes in this level
    pub compressed_bytes: u64,
}

// =============================================================================
// Tests
// =============================================================================
