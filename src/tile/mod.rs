//! Per-tile compression and caching.
//!
//! Every tile is an independent baseline JPEG stream, which is what makes
//! sparse access work: the decoder can fetch and decode one tile without
//! touching its siblings.
//!
//! - [`jpeg`] encodes/decodes single tiles at a configurable quality
//! - [`cache`] keeps recently decoded tiles so repeated region decodes on
//!   one handle don't re-pay the JPEG cost

pub mod cache;
pub mod jpeg;

pub use cache::{TileCache, TileCacheKey, DEFAULT_TILE_CACHE_CAPACITY};
pub use jpeg::{
    clamp_quality, decode_tile, encode_tile, is_valid_quality, DEFAULT_JPEG_QUALITY,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
