//! CLI configuration for the `mrj` tool.
//!
//! Three subcommands cover the codec surface:
//! - `encode` builds a container from a source image
//! - `export` decodes one level (or region) of a container to PNG
//! - `info` prints container metadata as text or JSON
//!
//! Every option can also be set through an environment variable with the
//! `MRJ_` prefix (`MRJ_QUALITY`, `MRJ_OUTPUT_DIR`, ...). Each subcommand
//! config has a `validate()` that runs before any work starts.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::encoder::DEFAULT_MAX_LEVEL;
use crate::pyramid::{DEFAULT_TILE_SIZE, MAX_LEVELS};
use crate::raster::Rect;
use crate::tile::jpeg::DEFAULT_JPEG_QUALITY;

// =============================================================================
// Default Values
// =============================================================================

/// Default output directory for encode/export.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Smallest accepted tile edge length.
pub const MIN_TILE_SIZE: u32 = 16;

/// Largest accepted tile edge length.
pub const MAX_TILE_SIZE: u32 = 4096;

// =============================================================================
// CLI
// =============================================================================

/// mrj - a tiled multi-resolution JPEG image pyramid codec.
#[derive(Parser, Debug, Clone)]
#[command(name = "mrj")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Encode a source image into a pyramid container
    Encode(EncodeConfig),

    /// Decode one level or region of a container to a PNG
    Export(ExportConfig),

    /// Print container metadata
    Info(InfoConfig),
}

// =============================================================================
// Encode
// =============================================================================

/// Configuration for `mrj encode`.
#[derive(clap::Args, Debug, Clone)]
pub struct EncodeConfig {
    /// Source image (png, tif, tiff, jpg, jpeg, jp2, j2k, jpx).
    pub input: PathBuf,

    /// JPEG quality for tile encoding (1-100).
    #[arg(short, long, default_value_t = DEFAULT_JPEG_QUALITY, env = "MRJ_QUALITY")]
    pub quality: u8,

    /// Output directory for the container.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, env = "MRJ_OUTPUT_DIR")]
    pub output: PathBuf,

    /// Highest level index to generate (the container gets this many
    /// reduced levels plus level 0).
    #[arg(long, default_value_t = DEFAULT_MAX_LEVEL, env = "MRJ_MAX_LEVEL")]
    pub max_level: u32,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "MRJ_TILE_SIZE")]
    pub tile_size: u32,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl EncodeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.quality == 0 || self.quality > 100 {
            return Err("quality must be between 1 and 100".to_string());
        }

        if self.max_level >= MAX_LEVELS {
            return Err(format!(
                "max_level must be below {} (got {})",
                MAX_LEVELS, self.max_level
            ));
        }

        if self.tile_size < MIN_TILE_SIZE || self.tile_size > MAX_TILE_SIZE {
            return Err(format!(
                "tile_size must be between {} and {} (got {})",
                MIN_TILE_SIZE, MAX_TILE_SIZE, self.tile_size
            ));
        }

        Ok(())
    }

    /// The container path this encode will produce.
    pub fn container_path(&self) -> PathBuf {
        let stem = self
            .input
            .file_stem()
            .unwrap_or_else(|| self.input.as_os_str());
        self.output.join(stem).with_extension("mrj")
    }
}

// =============================================================================
// Export
// =============================================================================

/// Configuration for `mrj export`.
#[derive(clap::Args, Debug, Clone)]
pub struct ExportConfig {
    /// Container file to decode.
    pub container: PathBuf,

    /// Pyramid level to decode (0 = full resolution).
    #[arg(short, long, default_value_t = 0, env = "MRJ_LEVEL")]
    pub level: u32,

    /// Output directory for the PNG.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, env = "MRJ_OUTPUT_DIR")]
    pub output: PathBuf,

    /// Decode only this region of the level, as `x,y,width,height`.
    #[arg(long)]
    pub region: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ExportConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.level >= MAX_LEVELS {
            return Err(format!(
                "level must be below {} (got {})",
                MAX_LEVELS, self.level
            ));
        }

        // Region bounds against the container are checked at decode time;
        // here we only check the syntax
        self.parse_region().map(|_| ())
    }

    /// Parse the `--region` argument, if present.
    pub fn parse_region(&self) -> Result<Option<Rect>, String> {
        let Some(ref spec) = self.region else {
            return Ok(None);
        };

        let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!(
                "region must be x,y,width,height (got {:?})",
                spec
            ));
        }

        let mut values = [0u32; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .parse()
                .map_err(|_| format!("invalid region component {:?}", part))?;
        }

        let rect = Rect::new(values[0], values[1], values[2], values[3]);
        if rect.is_empty() {
            return Err(format!("region must be non-empty (got {:?})", spec));
        }

        Ok(Some(rect))
    }

    /// The PNG path this export will produce.
    pub fn export_path(&self) -> PathBuf {
        let stem = self
            .container
            .file_stem()
            .unwrap_or_else(|| self.container.as_os_str());

        let mut name = stem.to_os_string();
        name.push(format!("_l{}", self.level));
        if self.region.is_some() {
            name.push("_region");
        }
        name.push(".png");

        self.output.join(name)
    }
}

// =============================================================================
// Info
// =============================================================================

/// Output format for `mrj info`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoFormat {
    /// Human-readable table
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Configuration for `mrj info`.
#[derive(clap::Args, Debug, Clone)]
pub struct InfoConfig {
    /// Container file to inspect.
    pub container: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = InfoFormat::Text)]
    pub format: InfoFormat,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
