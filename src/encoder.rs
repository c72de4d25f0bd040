//! Container encoder.
//!
//! The encode pipeline is: compute the layout, tile level 0 straight from
//! the source raster, then repeatedly downsample the previous level and tile
//! that, JPEG-encoding every tile independently and appending it through
//! [`ContainerWriter`]. Any tile failure aborts the whole write.
//!
//! File output is atomic: the container is written to a temporary sibling
//! path and renamed into place only after a successful finish, so a crash or
//! a failed tile never leaves a partial container visible.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::container::{ContainerWriter, DownsampleKernel, Header, FORMAT_VERSION};
use crate::error::EncodeError;
use crate::pyramid::{downsample_box2x2, PyramidLayout, DEFAULT_TILE_SIZE};
use crate::raster::RasterImage;
use crate::tile::jpeg::{self, DEFAULT_JPEG_QUALITY};

/// Default maximum level index (level 0 plus five reduced levels).
pub const DEFAULT_MAX_LEVEL: u32 = 5;

// =============================================================================
// Encoder
// =============================================================================

/// Encodes rasters into pyramid containers.
///
/// # Example
///
/// ```no_run
/// use mrj::{Encoder, RasterImage};
///
/// let image = RasterImage::zeroed(600, 400, 3).unwrap();
/// let encoder = Encoder::new();
/// encoder.encode(&image, std::path::Path::new("out/image.mrj")).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    quality: u8,
    tile_size: u32,
    max_level: u32,
}

/// Summary of a finished encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    /// Number of pyramid levels written
    pub level_count: usize,

    /// Number of tiles written across all levels
    pub tile_count: u64,

    /// Total container size in bytes
    pub container_bytes: u64,
}

impl Encoder {
    /// Create an encoder with default parameters (quality 75, 256px tiles,
    /// levels 0 through 5).
    pub fn new() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
            tile_size: DEFAULT_TILE_SIZE,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }

    /// Set the JPEG quality (clamped to 1-100).
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = jpeg::clamp_quality(quality);
        self
    }

    /// Set the tile edge length in pixels.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the maximum level index (the container gets `max_level + 1` levels).
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    /// Encode to a file, atomically.
    ///
    /// The container is written to `<path>.tmp` and renamed over `path` on
    /// success; on any failure the temporary file is removed and `path` is
    /// left untouched.
    pub fn encode(&self, image: &RasterImage, path: &Path) -> Result<EncodeReport, EncodeError> {
        let tmp_path = temp_sibling(path);

        let result = (|| -> Result<EncodeReport, EncodeError> {
            let file = File::create(&tmp_path)?;
            let (report, writer) = self.encode_to_writer(image, BufWriter::new(file))?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            Ok(report)
        })();

        match result {
            Ok(report) => {
                fs::rename(&tmp_path, path)?;
                info!(
                    path = %path.display(),
                    levels = report.level_count,
                    tiles = report.tile_count,
                    bytes = report.container_bytes,
                    "container written"
                );
                Ok(report)
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                Err(e)
            }
        }
    }

    /// Encode to an in-memory buffer.
    pub fn encode_to_vec(&self, image: &RasterImage) -> Result<Vec<u8>, EncodeError> {
        let (_, cursor) = self.encode_to_writer(image, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Encode to any seekable writer.
    pub fn encode_to_writer<W: Write + Seek>(
        &self,
        image: &RasterImage,
        writer: W,
    ) -> Result<(EncodeReport, W), EncodeError> {
        let layout = PyramidLayout::compute(
            image.width(),
            image.height(),
            self.tile_size,
            self.max_level,
        )?;

        let header = Header {
            version: FORMAT_VERSION,
            kernel: DownsampleKernel::Box2x2,
            channels: image.channels(),
            quality: self.quality,
            tile_size: self.tile_size,
            width: image.width(),
            height: image.height(),
            level_count: layout.level_count() as u32,
        };

        let mut writer = ContainerWriter::new(writer, header, layout.clone())?;

        // Level 0 is tiled straight from the source; each later level is a
        // downsample of the previous one, built lazily so only one reduced
        // raster is alive at a time.
        let mut reduced: Option<RasterImage> = None;

        for level in layout.levels() {
            let raster = reduced.as_ref().unwrap_or(image);
            debug_assert_eq!((raster.width(), raster.height()), (level.width, level.height));

            debug!(
                level = level.level_index,
                width = level.width,
                height = level.height,
                tiles_x = level.tiles_x,
                tiles_y = level.tiles_y,
                "encoding level"
            );

            for tile_y in 0..level.tiles_y {
                for tile_x in 0..level.tiles_x {
                    let (tile_w, tile_h) = level
                        .tile_dimensions(tile_x, tile_y)
                        .expect("tile coordinates from the level's own grid");
                    let tile = raster.crop(
                        tile_x * level.tile_size,
                        tile_y * level.tile_size,
                        tile_w,
                        tile_h,
                    );

                    let bytes =
                        jpeg::encode_tile(&tile, self.quality).map_err(|source| {
                            EncodeError::Tile {
                                level: level.level_index,
                                tile_x,
                                tile_y,
                                source,
                            }
                        })?;

                    writer.append_tile(level.level_index, tile_x, tile_y, &bytes)?;
                }
            }

            if level.level_index + 1 < layout.level_count() {
                reduced = Some(downsample_box2x2(raster));
            }
        }

        let report = EncodeReport {
            level_count: layout.level_count(),
            tile_count: layout.total_tile_count(),
            container_bytes: writer.bytes_written(),
        };

        let inner = writer.finish()?;
        Ok((report, inner))
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Temporary sibling path used for atomic writes (`foo.mrj` -> `foo.mrj.tmp`).
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

// =============================================================================
// Tests
// =============================================================================
