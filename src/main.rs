//! mrj - a tiled multi-resolution JPEG image pyramid codec.
//!
//! This binary dispatches the `encode`, `export` and `info` subcommands.

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mrj::{
    config::{Cli, Command, EncodeConfig, ExportConfig, InfoConfig, InfoFormat},
    decode_source_image, Decoder, Encoder,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Encode(config) => run_encode(config),
        Command::Export(config) => run_export(config),
        Command::Info(config) => run_info(config),
    }
}

// =============================================================================
// Encode Command
// =============================================================================

fn run_encode(config: EncodeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Reading source image {}", config.input.display());
    let image = match decode_source_image(&config.input) {
        Ok(image) => image,
        Err(e) => {
            error!("Failed to read source image: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "  {}x{} pixels, {} channel(s)",
        image.width(),
        image.height(),
        image.channels()
    );

    if let Err(e) = fs::create_dir_all(&config.output) {
        error!(
            "Failed to create output directory {}: {}",
            config.output.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let container_path = config.container_path();
    let encoder = Encoder::new()
        .with_quality(config.quality)
        .with_tile_size(config.tile_size)
        .with_max_level(config.max_level);

    match encoder.encode(&image, &container_path) {
        Ok(report) => {
            info!(
                "Wrote {} ({} levels, {} tiles, {} bytes)",
                container_path.display(),
                report.level_count,
                report.tile_count,
                report.container_bytes
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Encoding failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Export Command
// =============================================================================

fn run_export(config: ExportConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    // validate() already proved the syntax
    let region = match config.parse_region() {
        Ok(region) => region,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let decoder = match Decoder::open(&config.container) {
        Ok(decoder) => decoder,
        Err(e) => {
            error!("Failed to open {}: {}", config.container.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let level = config.level as usize;
    let result = match region {
        Some(rect) => decoder.decode_region(level, rect),
        None => decoder.decode_level(level),
    };

    let raster = match result {
        Ok(raster) => raster,
        Err(e) => {
            error!("Decoding failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = fs::create_dir_all(&config.output) {
        error!(
            "Failed to create output directory {}: {}",
            config.output.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let export_path = config.export_path();
    let (width, height) = (raster.width(), raster.height());

    let Some(dynamic) = raster.into_dynamic() else {
        error!("Decoded raster has an unexpected pixel layout");
        return ExitCode::FAILURE;
    };

    match dynamic.save(&export_path) {
        Ok(()) => {
            info!(
                "Wrote {} ({}x{} pixels)",
                export_path.display(),
                width,
                height
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to write {}: {}", export_path.display(), e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: InfoConfig) -> ExitCode {
    init_logging(config.verbose);

    let decoder = match Decoder::open(&config.container) {
        Ok(decoder) => decoder,
        Err(e) => {
            eprintln!("Failed to open {}: {}", config.container.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let info = decoder.info();

    match config.format {
        InfoFormat::Json => match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize metadata: {}", e);
                return ExitCode::FAILURE;
            }
        },
        InfoFormat::Text => {
            println!("Container: {}", config.container.display());
            println!(
                "  {}x{} pixels, {} channel(s), quality {}, {}px tiles, version {}",
                info.width, info.height, info.channels, info.quality, info.tile_size, info.version
            );
            println!();
            println!("  Level      Size         Tiles    Compressed");
            println!("  ─────────────────────────────────────────────");
            for level in &info.levels {
                println!(
                    "  {:<5} {:>6}x{:<6} {:>4}x{:<4} {:>10} B",
                    level.level,
                    level.width,
                    level.height,
                    level.tiles_x,
                    level.tiles_y,
                    level.compressed_bytes
                );
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Logging
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose { "mrj=debug" } else { "mrj=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
