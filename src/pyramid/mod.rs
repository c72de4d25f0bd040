//! Pyramid geometry and level generation.
//!
//! A container stores the same image at several resolutions. Level 0 is the
//! full-size original; each subsequent level halves both dimensions (with a
//! floor of 1 pixel). Every level is split into fixed-size tiles so a reader
//! can fetch one region at one resolution without touching the rest of the
//! file.
//!
//! - [`layout`] computes the level/tile geometry for a source size
//! - [`downsample`] produces each coarser level from the previous one

pub mod downsample;
pub mod layout;

pub use downsample::downsample_box2x2;
pub use layout::{Level, PyramidLayout, DEFAULT_TILE_SIZE, MAX_LEVELS, MAX_TOTAL_TILES};
