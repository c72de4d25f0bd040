//! I/O layer for container access.
//!
//! The decoder never needs a whole container in memory: it reads the fixed
//! header, the tile index, and then individual tile byte ranges on demand.
//! The [`RangeReader`] trait is the seam that makes this work against local
//! files and in-memory buffers alike.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

use bytes::Bytes;

/// Trait for reading byte ranges from an immutable resource.
///
/// A finished container file never changes, so implementations only need
/// read access. Implementations must be usable from multiple threads;
/// interior locking around a shared cursor is fine.
pub trait RangeReader: Send + Sync {
    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Returns an error if the range is out of bounds or if the read fails.
    fn read_exact_at(&self, offset: u64, len: usize) -> std::io::Result<Bytes>;

    /// Get the total size of the resource in bytes.
    fn size(&self) -> u64;

    /// Get a unique identifier for this resource (for logging).
    fn identifier(&self) -> &str;
}

// =============================================================================
// FileRangeReader
// =============================================================================

/// [`RangeReader`] over a local file.
///
/// The file cursor is shared, so positioned reads take a lock for the
/// duration of the seek + read pair. Tile decode work happens outside the
/// lock, which is what keeps concurrent region decodes on one handle cheap.
#[derive(Debug)]
pub struct FileRangeReader {
    file: Mutex<File>,
    size: u64,
    identifier: String,
}

impl FileRangeReader {
    /// Open a file for range reads.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            file: Mutex::new(file),
            size,
            identifier: path.display().to_string(),
        })
    }
}

impl RangeReader for FileRangeReader {
    fn read_exact_at(&self, offset: u64, len: usize) -> std::io::Result<Bytes> {
        let in_bounds = offset
            .checked_add(len as u64)
            .map_or(false, |end| end <= self.size);
        if !in_bounds {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "range out of bounds: {} bytes at offset {} in {} ({} bytes)",
                    len, offset, self.identifier, self.size
                ),
            ));
        }

        let mut buf = vec![0u8; len];
        {
            let mut file = self.file.lock().expect("file lock poisoned");
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut buf)?;
        }

        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// MemoryRangeReader
// =============================================================================

/// [`RangeReader`] over an in-memory buffer.
///
/// Mainly used by tests, but also handy when a container arrives as bytes
/// (embedded resources, memory-mapped data already sliced out).
#[derive(Debug, Clone)]
pub struct MemoryRangeReader {
    data: Bytes,
    identifier: String,
}

impl MemoryRangeReader {
    /// Wrap a byte buffer.
    pub fn new(data: impl Into<Bytes>, identifier: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            identifier: identifier.into(),
        }
    }
}

impl RangeReader for MemoryRangeReader {
    fn read_exact_at(&self, offset: u64, len: usize) -> std::io::Result<Bytes> {
        let in_bounds = offset
            .checked_add(len as u64)
            .map_or(false, |end| end <= self.data.len() as u64);
        if !in_bounds {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "range out of bounds: {} bytes at offset {} in {} ({} bytes)",
                    len,
                    offset,
                    self.identifier,
                    self.data.len()
                ),
            ));
        }

        Ok(self.data.slice(offset as usize..offset as usize + len))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// Endian Helper Functions
// =============================================================================
//
// All multi-byte values in a container are little-endian. These helpers are
// used by the header and index parsers.

/// Read a little-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_le(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

/// Read a little-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a little-endian u64 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 8 bytes.
#[inline]
pub fn read_u64_le(bytes: &[u8]) -> u64 {
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}
