//! # mrj
//!
//! A tiled multi-resolution JPEG image pyramid codec.
//!
//! This library encodes a raster image into a container holding the image at
//! several resolutions, each split into independently compressed JPEG tiles,
//! and decodes any level or any rectangular region of a level without
//! touching the rest of the file. That sparse-access property is the point:
//! a viewer showing one screen of a huge image needs a handful of tiles at
//! one resolution, not the whole thing.
//!
//! ## Features
//!
//! - **Random-access container format**: fixed header plus per-tile offset
//!   index, so a single tile read is one range read
//! - **Region-of-interest decode**: fetch only the tiles a rectangle touches
//! - **Atomic encode**: containers are written to a temp path and renamed,
//!   so readers never see a partial file
//! - **Deterministic output**: same pixels and parameters, same bytes
//! - **Decoded-tile caching**: repeated region decodes on one handle are
//!   LRU-cached
//!
//! ## Architecture
//!
//! - [`raster`] - owned 8-bit raster images and pixel rectangles
//! - [`pyramid`] - level geometry and box-filter downsampling
//! - [`container`] - the on-disk format: header, tile index, writer
//! - [`tile`] - per-tile JPEG codec and the decoded-tile cache
//! - [`encoder`] / [`decoder`] - the two halves of the codec
//! - [`io`] - the `RangeReader` seam over files and memory
//! - [`source`] - source image decoding (PNG/TIFF/JPEG/JPEG 2000)
//! - [`config`] - CLI types for the `mrj` binary
//!
//! ## Example
//!
//! ```no_run
//! use mrj::{Decoder, Encoder, Rect, decode_source_image};
//! use std::path::Path;
//!
//! // Encode a source image into a container
//! let image = decode_source_image(Path::new("scene.png")).unwrap();
//! Encoder::new()
//!     .with_quality(75)
//!     .encode(&image, Path::new("scene.mrj"))
//!     .unwrap();
//!
//! // Pull a 512x512 detail out of the full-resolution level
//! let decoder = Decoder::open(Path::new("scene.mrj")).unwrap();
//! let detail = decoder.decode_region(0, Rect::new(1024, 1024, 512, 512)).unwrap();
//! # let _ = detail;
//! ```

pub mod config;
pub mod container;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod io;
pub mod pyramid;
pub mod raster;
pub mod source;
pub mod tile;

// Re-export commonly used types
pub use container::{
    ContainerWriter, DownsampleKernel, Header, TileEntry, TileIndex, FORMAT_VERSION, HEADER_SIZE,
    MAGIC, TILE_ENTRY_SIZE,
};
pub use decoder::{ContainerInfo, Decoder, LevelInfo};
pub use encoder::{EncodeReport, Encoder, DEFAULT_MAX_LEVEL};
pub use error::{
    DecodeError, EncodeError, HeaderError, LayoutError, RasterError, SourceError, TileError,
};
pub use io::{FileRangeReader, MemoryRangeReader, RangeReader};
pub use pyramid::{
    downsample_box2x2, Level, PyramidLayout, DEFAULT_TILE_SIZE, MAX_LEVELS, MAX_TOTAL_TILES,
};
pub use raster::{RasterImage, Rect};
pub use source::decode_source_image;
pub use tile::{
    clamp_quality, is_valid_quality, TileCache, TileCacheKey, DEFAULT_JPEG_QUALITY,
    DEFAULT_TILE_CACHE_CAPACITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
