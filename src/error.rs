use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while computing a pyramid layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Source image has a zero dimension
    #[error("Invalid image dimensions: {width}x{height} (both must be non-zero)")]
    InvalidDimension { width: u32, height: u32 },

    /// Tile size is zero
    #[error("Invalid tile size: {0} (must be non-zero)")]
    InvalidTileSize(u32),

    /// Requested level count is zero or exceeds the format cap
    #[error("Invalid level count: {requested} (must be between 1 and {max})")]
    InvalidLevelCount { requested: u32, max: u32 },

    /// Tile grid is too large to index
    #[error("Tile grid too large: {total_tiles} tiles (limit {max})")]
    TileGridTooLarge { total_tiles: u64, max: u64 },
}

/// Errors that can occur when parsing a container header or tile index
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Invalid magic bytes (not "MRJP")
    #[error("Invalid magic bytes: expected \"MRJP\", got {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported format version
    #[error("Unsupported format version: expected 1, got {0}")]
    InvalidVersion(u16),

    /// Unknown downsample kernel id
    #[error("Unknown downsample kernel id: {0}")]
    UnknownKernel(u8),

    /// Channel count is not 1 or 3
    #[error("Invalid channel count: {0} (must be 1 or 3)")]
    InvalidChannels(u8),

    /// Recorded JPEG quality is outside 1-100
    #[error("Invalid JPEG quality: {0} (must be between 1 and 100)")]
    InvalidQuality(u8),

    /// File is too small to contain the fixed header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// File ends before the tile index does
    #[error("Truncated container: index needs {required} bytes, file has {actual}")]
    Truncated { required: u64, actual: u64 },

    /// A tile index entry points outside the file
    #[error(
        "Tile index entry out of bounds: level {level} tile {tile_index} \
         (offset {offset}, length {length}, file size {file_size})"
    )]
    IndexOutOfBounds {
        level: usize,
        tile_index: u64,
        offset: u64,
        length: u32,
        file_size: u64,
    },

    /// Tile offsets are not strictly increasing
    #[error("Tile index not monotonic at level {level} tile {tile_index}")]
    NonMonotonicIndex { level: usize, tile_index: u64 },

    /// Header geometry does not describe a valid pyramid
    #[error("Invalid header geometry: {0}")]
    Layout(#[from] LayoutError),
}

/// Errors from JPEG-encoding or JPEG-decoding a single tile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Underlying JPEG encoder failed
    #[error("JPEG encode failed: {message}")]
    Encode { message: String },

    /// Underlying JPEG decoder failed
    #[error("JPEG decode failed: {message}")]
    Decode { message: String },

    /// Decoded tile does not have the dimensions the layout demands
    #[error(
        "Tile is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}"
    )]
    SizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Errors that can occur while encoding a container
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pyramid layout could not be computed from the source image
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// A tile failed to encode; the whole container write is aborted
    #[error("Tile ({tile_x}, {tile_y}) at level {level}: {source}")]
    Tile {
        level: usize,
        tile_x: u32,
        tile_y: u32,
        source: TileError,
    },

    /// The writer was finished before every tile was appended
    #[error("Incomplete container: expected {expected} tiles, got {written}")]
    MissingTiles { expected: u64, written: u64 },

    /// I/O error while writing the container
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while opening or decoding a container
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Header or tile index is corrupt
    #[error("Corrupt header: {0}")]
    Header(#[from] HeaderError),

    /// Requested level is outside the container's level range
    #[error("Invalid level: {requested} (container has {level_count} levels)")]
    InvalidLevel { requested: usize, level_count: usize },

    /// Requested region has a zero dimension
    #[error("Empty region: {width}x{height}")]
    EmptyRegion { width: u32, height: u32 },

    /// Requested region extends outside the level
    #[error(
        "Region {x},{y} {width}x{height} out of bounds for level {level} \
         ({level_width}x{level_height})"
    )]
    RegionOutOfBounds {
        level: usize,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        level_width: u32,
        level_height: u32,
    },

    /// Requested tile coordinates are outside the level's grid
    #[error(
        "Tile ({tile_x}, {tile_y}) out of bounds for level {level} \
         ({tiles_x}x{tiles_y} tiles)"
    )]
    TileOutOfBounds {
        level: usize,
        tile_x: u32,
        tile_y: u32,
        tiles_x: u32,
        tiles_y: u32,
    },

    /// A tile failed to decode; this call is aborted but the handle stays valid
    #[error("Tile ({tile_x}, {tile_y}) at level {level}: {source}")]
    Tile {
        level: usize,
        tile_x: u32,
        tile_y: u32,
        source: TileError,
    },

    /// I/O error while reading the container
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from decoding a source image into a raster
#[derive(Debug, Error)]
pub enum SourceError {
    /// File extension is not one of the supported source formats
    #[error(
        "Unsupported source format: {path:?} (expected png, tif, tiff, jpg, jpeg, jp2, j2k or jpx)"
    )]
    UnsupportedFormat { path: PathBuf },

    /// Underlying decoder failed
    #[error("Failed to decode {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    /// I/O error while reading the source file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from constructing a raster image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// Pixel buffer length does not match width * height * channels
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Channel count is not 1 or 3
    #[error("Unsupported channel count: {0} (must be 1 or 3)")]
    UnsupportedChannels(u8),
}
