//! Sequential container writer with index backfill.
//!
//! The header is fully known before the first tile is encoded, so it is
//! written immediately; the index region is zero-filled, tile data is
//! appended behind it, and [`ContainerWriter::finish`] seeks back once to
//! write the real index. Atomicity for file output (temp path + rename) is
//! the encoder's job, not this writer's.

use std::io::{Seek, SeekFrom, Write};

use crate::error::EncodeError;
use crate::pyramid::PyramidLayout;

use super::{Header, TileEntry, TileIndex, HEADER_SIZE};

/// Writes one container front to back.
///
/// Tiles must be appended in index order: every level finest-first, tiles in
/// row-major order within each level. The writer tracks how many tiles have
/// been appended and refuses to finish early.
pub struct ContainerWriter<W: Write + Seek> {
    inner: W,
    layout: PyramidLayout,
    entries: Vec<Vec<TileEntry>>,
    position: u64,
    tiles_written: u64,
}

impl<W: Write + Seek> ContainerWriter<W> {
    /// Start a container: write the header and reserve the index region.
    pub fn new(mut inner: W, header: Header, layout: PyramidLayout) -> Result<Self, EncodeError> {
        inner.write_all(&header.serialize())?;

        // Zero-fill the index region; finish() backfills it
        let index_len = TileIndex::byte_len(&layout);
        inner.write_all(&vec![0u8; index_len as usize])?;

        let position = HEADER_SIZE as u64 + index_len;
        let entries = layout
            .levels()
            .iter()
            .map(|level| Vec::with_capacity(level.tile_count() as usize))
            .collect();

        Ok(Self {
            inner,
            layout,
            entries,
            position,
            tiles_written: 0,
        })
    }

    /// Append one compressed tile and record its index entry.
    ///
    /// `level`, `tile_x`, `tile_y` must follow the index order; this is a
    /// programming error, not an input error, so it is only debug-asserted.
    pub fn append_tile(
        &mut self,
        level: usize,
        tile_x: u32,
        tile_y: u32,
        data: &[u8],
    ) -> Result<(), EncodeError> {
        debug_assert!(level < self.layout.level_count());
        debug_assert_eq!(
            self.layout
                .get_level(level)
                .and_then(|l| l.tile_index(tile_x, tile_y)),
            Some(self.entries[level].len() as u32),
            "tiles must be appended in row-major index order"
        );

        self.inner.write_all(data)?;
        self.entries[level].push(TileEntry {
            offset: self.position,
            length: data.len() as u32,
        });
        self.position += data.len() as u64;
        self.tiles_written += 1;

        Ok(())
    }

    /// Backfill the tile index and return the underlying writer.
    ///
    /// # Errors
    ///
    /// `MissingTiles` if not every tile of every level was appended.
    pub fn finish(mut self) -> Result<W, EncodeError> {
        let expected = self.layout.total_tile_count();
        if self.tiles_written != expected {
            return Err(EncodeError::MissingTiles {
                expected,
                written: self.tiles_written,
            });
        }

        let index = TileIndex::from_entries(self.entries);
        self.inner.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        self.inner.write_all(&index.serialize())?;
        self.inner.flush()?;

        Ok(self.inner)
    }

    /// Total bytes written so far (header + index + tile data).
    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.position
    }
}

// =============================================================================
// Tests
// =============================================================================
