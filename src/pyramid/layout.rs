//! Pyramid level and tile grid geometry.
//!
//! All geometry derives from four numbers: the level 0 width and height, the
//! tile size, and the level count. Level `i` measures
//! `max(1, width >> i)` by `max(1, height >> i)`; each level is covered by a
//! row-major grid of `tile_size`-square tiles, with the rightmost column and
//! bottom row cropped to the image edge.
//!
//! Because both the writer and the reader recompute this geometry from the
//! header fields, the tile index on disk needs no per-level metadata beyond
//! the (offset, length) pairs.

use crate::error::LayoutError;
use crate::raster::Rect;

// =============================================================================
// Constants
// =============================================================================

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Maximum number of levels a container may declare (safety limit).
pub const MAX_LEVELS: u32 = 32;

/// Maximum total number of tiles across all levels (safety limit).
///
/// Keeps every tile index in u32 range and the serialized tile index well
/// inside u64 byte arithmetic, whatever a header claims.
pub const MAX_TOTAL_TILES: u64 = u32::MAX as u64;

// =============================================================================
// Level
// =============================================================================

/// A single level in the image pyramid.
///
/// Level 0 is the highest resolution (full size), with higher levels being
/// progressively smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    /// Index of this level in the pyramid (0 = highest resolution)
    pub level_index: usize,

    /// Level width in pixels
    pub width: u32,

    /// Level height in pixels
    pub height: u32,

    /// Tile edge length in pixels
    pub tile_size: u32,

    /// Number of tiles in X direction
    pub tiles_x: u32,

    /// Number of tiles in Y direction
    pub tiles_y: u32,

    /// Downsample factor relative to level 0 (1 for level 0, 2 for level 1, ...)
    pub downsample: u32,
}

impl Level {
    /// Total number of tiles in this level.
    ///
    /// Widened to u64 because the factors come straight from header fields;
    /// [`PyramidLayout::compute`] rejects grids above [`MAX_TOTAL_TILES`].
    #[inline]
    pub fn tile_count(&self) -> u64 {
        self.tiles_x as u64 * self.tiles_y as u64
    }

    /// Row-major index of a tile, or `None` if the coordinates are out of bounds.
    pub fn tile_index(&self, tile_x: u32, tile_y: u32) -> Option<u32> {
        if tile_x >= self.tiles_x || tile_y >= self.tiles_y {
            return None;
        }
        Some(tile_y * self.tiles_x + tile_x)
    }

    /// Pixel dimensions of a specific tile.
    ///
    /// Edge tiles may be smaller than `tile_size`.
    pub fn tile_dimensions(&self, tile_x: u32, tile_y: u32) -> Option<(u32, u32)> {
        if tile_x >= self.tiles_x || tile_y >= self.tiles_y {
            return None;
        }

        let w = if tile_x == self.tiles_x - 1 {
            // Last column - may be partial
            let remainder = self.width % self.tile_size;
            if remainder == 0 {
                self.tile_size
            } else {
                remainder
            }
        } else {
            self.tile_size
        };

        let h = if tile_y == self.tiles_y - 1 {
            // Last row - may be partial
            let remainder = self.height % self.tile_size;
            if remainder == 0 {
                self.tile_size
            } else {
                remainder
            }
        } else {
            self.tile_size
        };

        Some((w, h))
    }

    /// The pixel rectangle a tile covers within this level.
    pub fn tile_rect(&self, tile_x: u32, tile_y: u32) -> Option<Rect> {
        let (w, h) = self.tile_dimensions(tile_x, tile_y)?;
        Some(Rect::new(
            tile_x * self.tile_size,
            tile_y * self.tile_size,
            w,
            h,
        ))
    }

    /// Inclusive tile coordinate ranges `(tx0..=tx1, ty0..=ty1)` overlapping
    /// a pixel rectangle.
    ///
    /// Returns `None` if the rectangle is empty or extends outside the level.
    pub fn tiles_overlapping(&self, region: &Rect) -> Option<(std::ops::RangeInclusive<u32>, std::ops::RangeInclusive<u32>)> {
        if region.is_empty() || region.right() > self.width || region.bottom() > self.height {
            return None;
        }

        let tx0 = region.x / self.tile_size;
        let ty0 = region.y / self.tile_size;
        let tx1 = (region.right() - 1) / self.tile_size;
        let ty1 = (region.bottom() - 1) / self.tile_size;

        Some((tx0..=tx1, ty0..=ty1))
    }
}

// =============================================================================
// PyramidLayout
// =============================================================================

/// The full level/tile geometry of a pyramid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidLayout {
    tile_size: u32,
    levels: Vec<Level>,
}

impl PyramidLayout {
    /// Compute the layout for a source raster.
    ///
    /// Produces exactly `max_level + 1` levels; level `i` measures
    /// `max(1, width >> i)` by `max(1, height >> i)`.
    ///
    /// # Errors
    ///
    /// - `InvalidDimension` if `width` or `height` is 0
    /// - `InvalidTileSize` if `tile_size` is 0
    /// - `InvalidLevelCount` if `max_level + 1` exceeds [`MAX_LEVELS`]
    /// - `TileGridTooLarge` if the levels together exceed
    ///   [`MAX_TOTAL_TILES`] tiles
    pub fn compute(
        width: u32,
        height: u32,
        tile_size: u32,
        max_level: u32,
    ) -> Result<Self, LayoutError> {
        if width == 0 || height == 0 {
            return Err(LayoutError::InvalidDimension { width, height });
        }
        if tile_size == 0 {
            return Err(LayoutError::InvalidTileSize(tile_size));
        }
        if max_level >= MAX_LEVELS {
            return Err(LayoutError::InvalidLevelCount {
                requested: max_level.saturating_add(1),
                max: MAX_LEVELS,
            });
        }
        let level_count = max_level + 1;

        let levels: Vec<Level> = (0..level_count as usize)
            .map(|i| {
                let level_width = (width >> i).max(1);
                let level_height = (height >> i).max(1);
                Level {
                    level_index: i,
                    width: level_width,
                    height: level_height,
                    tile_size,
                    tiles_x: level_width.div_ceil(tile_size),
                    tiles_y: level_height.div_ceil(tile_size),
                    downsample: 1 << i,
                }
            })
            .collect();

        // Header fields are untrusted; a huge image with a tiny tile size
        // must be rejected here, before any index arithmetic
        let total_tiles = levels
            .iter()
            .fold(0u64, |acc, level| acc.saturating_add(level.tile_count()));
        if total_tiles > MAX_TOTAL_TILES {
            return Err(LayoutError::TileGridTooLarge {
                total_tiles,
                max: MAX_TOTAL_TILES,
            });
        }

        Ok(Self { tile_size, levels })
    }

    /// Same as [`compute`](Self::compute), taking a level count instead of a
    /// maximum level index. Used when reconstructing from a parsed header.
    pub fn compute_with_level_count(
        width: u32,
        height: u32,
        tile_size: u32,
        level_count: u32,
    ) -> Result<Self, LayoutError> {
        if level_count == 0 {
            return Err(LayoutError::InvalidLevelCount {
                requested: 0,
                max: MAX_LEVELS,
            });
        }
        Self::compute(width, height, tile_size, level_count - 1)
    }

    /// Tile edge length in pixels.
    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Number of levels.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// All levels, finest-first.
    #[inline]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// A level by index.
    pub fn get_level(&self, level: usize) -> Option<&Level> {
        self.levels.get(level)
    }

    /// The full-resolution level.
    pub fn base_level(&self) -> &Level {
        // compute() guarantees at least one level
        &self.levels[0]
    }

    /// Dimensions of the full-resolution level.
    pub fn dimensions(&self) -> (u32, u32) {
        let base = self.base_level();
        (base.width, base.height)
    }

    /// Total number of tiles across all levels.
    ///
    /// At most [`MAX_TOTAL_TILES`]; `compute` rejects anything larger.
    pub fn total_tile_count(&self) -> u64 {
        self.levels.iter().map(Level::tile_count).sum()
    }

    /// Find the best level for a given downsample factor.
    ///
    /// Returns the index of the level with the largest downsample that does
    /// not exceed the requested factor; factors below 1.0 map to level 0.
    /// This is how a viewer picks a resolution for a zoom value.
    pub fn best_level_for_downsample(&self, downsample: f64) -> usize {
        self.levels
            .iter()
            .rev()
            .find(|l| (l.downsample as f64) <= downsample)
            .map(|l| l.level_index)
            .unwrap_or(0)
    }
}

// =============================================================================
// Tests
// =============================================================================
