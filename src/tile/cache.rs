//! Cache for decoded tiles.
//!
//! Decoding a JPEG tile costs far more than compositing it, and region
//! decodes of a panning viewer hit the same tiles over and over. This module
//! provides a size-bounded LRU of decoded rasters, keyed by tile coordinate,
//! owned by one open container handle.
//!
//! # Size-Based Eviction
//!
//! The cache tracks the total decoded size in bytes and evicts
//! least-recently-used entries when the capacity is exceeded. An entry cap
//! bounds the LRU bookkeeping itself.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::raster::RasterImage;

/// Default cache capacity: 64MB of decoded pixels.
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 64 * 1024 * 1024;

/// Default maximum number of entries (to bound LRU overhead)
const DEFAULT_MAX_ENTRIES: usize = 4096;

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for decoded tiles.
///
/// The cache lives inside one container handle, so the key is just the tile
/// coordinate; no file identity or quality is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCacheKey {
    /// Pyramid level (0 = highest resolution)
    pub level: u32,

    /// Tile X coordinate (0-indexed from left)
    pub tile_x: u32,

    /// Tile Y coordinate (0-indexed from top)
    pub tile_y: u32,
}

impl TileCacheKey {
    /// Create a new cache key.
    pub fn new(level: u32, tile_x: u32, tile_y: u32) -> Self {
        Self {
            level,
            tile_x,
            tile_y,
        }
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

/// LRU cache of decoded tiles with a byte-size budget.
///
/// Entries are `Arc`-shared, so a cache hit is a pointer clone and evicting
/// an entry another caller still holds is harmless.
pub struct TileCache {
    state: Mutex<CacheState>,
    max_size: usize,
}

struct CacheState {
    entries: LruCache<TileCacheKey, Arc<RasterImage>>,
    current_size: usize,
}

impl TileCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Create a cache with the given byte capacity.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a cache with the given byte capacity and entry cap.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let max_entries = NonZeroUsize::new(max_entries.max(1)).unwrap();
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(max_entries),
                current_size: 0,
            }),
            max_size,
        }
    }

    /// Get a decoded tile, marking it recently used.
    pub fn get(&self, key: &TileCacheKey) -> Option<Arc<RasterImage>> {
        let mut state = self.state.lock().expect("cache lock poisoned");
        state.entries.get(key).cloned()
    }

    /// Store a decoded tile.
    ///
    /// If the cache is over budget after insertion, least-recently-used
    /// entries are evicted until it fits again.
    pub fn put(&self, key: TileCacheKey, tile: Arc<RasterImage>) {
        let tile_size = tile.data().len();
        let mut state = self.state.lock().expect("cache lock poisoned");

        state.current_size += tile_size;

        // push returns the previous value under this key, or the entry the
        // entry cap displaced; both leave the size accounting exact
        if let Some((_, displaced)) = state.entries.push(key, tile) {
            let displaced_size = displaced.data().len();
            state.current_size = state.current_size.saturating_sub(displaced_size);
        }

        // Evict until we're back under the byte budget
        while state.current_size > self.max_size {
            match state.entries.pop_lru() {
                Some((_, evicted)) => {
                    state.current_size = state.current_size.saturating_sub(evicted.data().len());
                }
                None => break,
            }
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut state = self.state.lock().expect("cache lock poisoned");
        state.entries.clear();
        state.current_size = 0;
    }

    /// Number of cached tiles.
    pub fn len(&self) -> usize {
        self.state.lock().expect("cache lock poisoned").entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total decoded bytes currently cached.
    pub fn size(&self) -> usize {
        self.state.lock().expect("cache lock poisoned").current_size
    }

    /// Byte capacity.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
