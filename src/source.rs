//! Source image decoding.
//!
//! The encoder doesn't care where pixels come from; this module is the
//! black-box collaborator that turns a source file into a [`RasterImage`].
//! PNG, TIFF and JPEG go through the `image` crate; JPEG 2000 code streams
//! go through `jpeg2k`.

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::SourceError;
use crate::raster::RasterImage;

/// Decode a source image file into a raster.
///
/// The format is chosen by file extension: `png`, `tif`/`tiff`,
/// `jpg`/`jpeg` via the `image` crate, `jp2`/`j2k`/`jpx` via `jpeg2k`.
/// Grayscale sources stay single-channel; everything else becomes RGB8.
pub fn decode_source_image(path: &Path) -> Result<RasterImage, SourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let dynamic = match extension.as_str() {
        "png" | "tif" | "tiff" | "jpg" | "jpeg" => decode_with_image(path)?,
        "jp2" | "j2k" | "jpx" => decode_with_jpeg2k(path)?,
        _ => {
            return Err(SourceError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    let raster = RasterImage::from_dynamic(&dynamic);
    debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        channels = raster.channels(),
        "source decoded"
    );

    Ok(raster)
}

fn decode_with_image(path: &Path) -> Result<DynamicImage, SourceError> {
    image::ImageReader::open(path)?
        .decode()
        .map_err(|e| SourceError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn decode_with_jpeg2k(path: &Path) -> Result<DynamicImage, SourceError> {
    let jp2 = jpeg2k::Image::from_file(path).map_err(|e| SourceError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    (&jp2).try_into().map_err(|e: jpeg2k::error::Error| {
        SourceError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })
}
