//! The on-disk container format.
//!
//! A container holds every level of the pyramid as independently compressed
//! JPEG tiles behind a fixed header and a random-access tile index. All
//! multi-byte integers are little-endian.
//!
//! # Byte Layout
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes "MRJP"
//! 4       2     Format version (currently 1)
//! 6       1     Downsample kernel id (1 = 2x2 box mean)
//! 7       1     Channel count (1 or 3)
//! 8       1     JPEG quality used at encode time (1-100)
//! 9       3     Reserved, must be zero
//! 12      4     Tile size in pixels
//! 16      4     Level 0 width
//! 20      4     Level 0 height
//! 24      4     Level count (1-32)
//! 28      ...   Tile index (12 bytes per tile: offset u64, length u32)
//! ...     ...   Concatenated tile JPEG streams
//! ```
//!
//! The tile index covers every level, finest-first (level 0 first), tiles in
//! row-major order within each level. Offsets are absolute file positions
//! and strictly increasing file-wide; tile data follows the index in the
//! same order. Since the index size is fully determined by the header
//! fields, the writer reserves the header + index region up front, appends
//! tile data behind it, and backfills the index once all offsets are known.

mod header;
mod index;
mod writer;

pub use header::{DownsampleKernel, Header, FORMAT_VERSION, HEADER_SIZE, MAGIC};
pub use index::{TileEntry, TileIndex, TILE_ENTRY_SIZE};
pub use writer::ContainerWriter;
