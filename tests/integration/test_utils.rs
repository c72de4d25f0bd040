//! Shared helpers for integration tests.
//!
//! Everything here is deterministic: the same call always produces the same
//! raster and, through the encoder, the same container bytes. Most tests
//! run entirely in memory via [`encode_to_memory`] / [`open_memory`]; only
//! the atomicity tests need a real directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use mrj::{Decoder, Encoder, MemoryRangeReader, RangeReader, RasterImage};

// =============================================================================
// Raster Builders
// =============================================================================

/// A deterministic smooth gradient raster.
///
/// Smooth content keeps JPEG error small, which makes round-trip error
/// bounds meaningful.
pub fn gradient_raster(width: u32, height: u32, channels: u8) -> RasterImage {
    let mut data = Vec::with_capacity(width as usize * height as usize * channels as usize);
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let value = (x as f64 / width.max(1) as f64) * 128.0
                    + (y as f64 / height.max(1) as f64) * 96.0
                    + c as f64 * 10.0;
                data.push(value as u8);
            }
        }
    }
    RasterImage::from_vec(width, height, channels, data).expect("valid test raster")
}

/// A raster with a distinct constant value per tile of the given grid.
///
/// Useful for checking that tiles end up in the right place: any tile
/// mix-up changes whole blocks of pixels, far beyond JPEG error.
pub fn per_tile_raster(width: u32, height: u32, tile_size: u32) -> RasterImage {
    let mut data = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let tile_x = x / tile_size;
            let tile_y = y / tile_size;
            data.push((40 + (tile_x * 5 + tile_y * 11) * 17 % 200) as u8);
        }
    }
    RasterImage::from_vec(width, height, 1, data).expect("valid test raster")
}

// =============================================================================
// Container Builders
// =============================================================================

/// Encode a raster into an in-memory container.
pub fn encode_to_memory(
    image: &RasterImage,
    quality: u8,
    tile_size: u32,
    max_level: u32,
) -> Vec<u8> {
    Encoder::new()
        .with_quality(quality)
        .with_tile_size(tile_size)
        .with_max_level(max_level)
        .encode_to_vec(image)
        .expect("encode should succeed")
}

/// Open an in-memory container.
pub fn open_memory(bytes: Vec<u8>) -> Decoder<MemoryRangeReader> {
    Decoder::open_bytes(bytes).expect("container should open")
}

// =============================================================================
// Tracking Range Reader
// =============================================================================

/// A range reader that records every read request.
///
/// This is how the sparse-access tests verify that a region decode fetches
/// only the tiles it needs.
pub struct TrackingReader {
    data: Bytes,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(u64, usize)>>>,
}

impl TrackingReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Bytes::from(data),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle to the counters that stays usable after the reader is moved
    /// into a decoder.
    pub fn tracker(&self) -> ReadTracker {
        ReadTracker {
            request_count: self.request_count.clone(),
            requests: self.requests.clone(),
        }
    }
}

/// Shared view of a [`TrackingReader`]'s counters.
#[derive(Clone)]
pub struct ReadTracker {
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(u64, usize)>>>,
}

impl ReadTracker {
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(u64, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

impl RangeReader for TrackingReader {
    fn read_exact_at(&self, offset: u64, len: usize) -> std::io::Result<Bytes> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((offset, len));

        if offset as usize + len > self.data.len() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "range out of bounds",
            ));
        }
        Ok(self.data.slice(offset as usize..offset as usize + len))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        "tracking"
    }
}

// =============================================================================
// Comparison Helpers
// =============================================================================

/// Mean absolute per-sample difference between two same-shaped rasters.
pub fn mean_abs_diff(a: &RasterImage, b: &RasterImage) -> f64 {
    assert_eq!(a.width(), b.width());
    assert_eq!(a.height(), b.height());
    assert_eq!(a.channels(), b.channels());

    let total: u64 = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| (x as i64 - y as i64).unsigned_abs())
        .sum();
    total as f64 / a.data().len() as f64
}
