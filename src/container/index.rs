//! The random-access tile index.
//!
//! One (offset, length) entry per tile, every level finest-first, tiles in
//! row-major order. The entry count is fully determined by the pyramid
//! geometry, so the index occupies a fixed region right behind the header
//! and is validated against the actual file size at open time; truncated or
//! rearranged containers are rejected before any tile is read.

use crate::error::HeaderError;
use crate::io::{read_u32_le, read_u64_le};
use crate::pyramid::PyramidLayout;

use super::HEADER_SIZE;

/// Size of one index entry in bytes (offset u64 + length u32).
pub const TILE_ENTRY_SIZE: usize = 12;

// =============================================================================
// TileEntry
// =============================================================================

/// Location of one compressed tile within the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileEntry {
    /// Absolute file offset of the tile's JPEG stream
    pub offset: u64,

    /// Byte length of the tile's JPEG stream
    pub length: u32,
}

// =============================================================================
// TileIndex
// =============================================================================

/// Parsed tile index for every level of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileIndex {
    per_level: Vec<Vec<TileEntry>>,
}

impl TileIndex {
    /// Byte length of the serialized index for a layout.
    ///
    /// u64 throughout: the tile counts come from header fields, and the
    /// layout caps them, so this cannot overflow.
    pub fn byte_len(layout: &PyramidLayout) -> u64 {
        layout.total_tile_count() * TILE_ENTRY_SIZE as u64
    }

    /// File offset where tile data begins for a layout.
    pub fn data_start(layout: &PyramidLayout) -> u64 {
        HEADER_SIZE as u64 + Self::byte_len(layout)
    }

    /// Build an index from per-level entry tables.
    ///
    /// Used by the writer; entry tables must match the layout's tile counts.
    pub fn from_entries(per_level: Vec<Vec<TileEntry>>) -> Self {
        Self { per_level }
    }

    /// Parse the index region of a container.
    ///
    /// `bytes` must be exactly the index region (header excluded);
    /// `file_size` is used to reject entries pointing outside the file.
    ///
    /// # Errors
    ///
    /// - `Truncated` if `bytes` is shorter than the layout demands
    /// - `IndexOutOfBounds` if an entry falls outside the file or in front
    ///   of the tile data region
    /// - `NonMonotonicIndex` if offsets do not strictly increase
    pub fn parse(
        bytes: &[u8],
        layout: &PyramidLayout,
        file_size: u64,
    ) -> Result<Self, HeaderError> {
        let expected_len = Self::byte_len(layout);
        if (bytes.len() as u64) < expected_len {
            return Err(HeaderError::Truncated {
                required: HEADER_SIZE as u64 + expected_len,
                actual: HEADER_SIZE as u64 + bytes.len() as u64,
            });
        }

        let data_start = Self::data_start(layout);
        let mut per_level = Vec::with_capacity(layout.level_count());
        let mut cursor = 0usize;
        let mut previous_end = data_start;

        for level in layout.levels() {
            let mut entries = Vec::with_capacity(level.tile_count() as usize);

            for tile_index in 0..level.tile_count() {
                let offset = read_u64_le(&bytes[cursor..cursor + 8]);
                let length = read_u32_le(&bytes[cursor + 8..cursor + 12]);
                cursor += TILE_ENTRY_SIZE;

                let end = offset.checked_add(length as u64);
                let in_bounds =
                    offset >= data_start && end.map_or(false, |end| end <= file_size);
                if !in_bounds {
                    return Err(HeaderError::IndexOutOfBounds {
                        level: level.level_index,
                        tile_index,
                        offset,
                        length,
                        file_size,
                    });
                }

                // Tiles are laid out back to back in index order
                if offset < previous_end {
                    return Err(HeaderError::NonMonotonicIndex {
                        level: level.level_index,
                        tile_index,
                    });
                }
                previous_end = offset + length as u64;

                entries.push(TileEntry { offset, length });
            }

            per_level.push(entries);
        }

        Ok(Self { per_level })
    }

    /// Serialize to the on-disk representation.
    pub fn serialize(&self) -> Vec<u8> {
        let count: usize = self.per_level.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(count * TILE_ENTRY_SIZE);

        for entries in &self.per_level {
            for entry in entries {
                bytes.extend_from_slice(&entry.offset.to_le_bytes());
                bytes.extend_from_slice(&entry.length.to_le_bytes());
            }
        }

        bytes
    }

    /// Location of a specific tile, or `None` if out of range.
    pub fn get(&self, level: usize, tile_index: u32) -> Option<TileEntry> {
        self.per_level.get(level)?.get(tile_index as usize).copied()
    }

    /// Total compressed tile bytes for one level.
    pub fn level_compressed_bytes(&self, level: usize) -> Option<u64> {
        Some(
            self.per_level
                .get(level)?
                .iter()
                .map(|e| e.length as u64)
                .sum(),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
