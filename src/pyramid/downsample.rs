//! 2x2 box-mean downsampling.
//!
//! Each coarser pyramid level is produced from the previous one by averaging
//! disjoint 2x2 pixel blocks per channel, with integer rounding
//! `(sum + 2) / 4`. The destination measures `max(1, w / 2)` by
//! `max(1, h / 2)`; when a source dimension is odd the trailing row/column
//! is dropped, and when it is 1 the single row/column is sampled twice
//! (clamp-to-edge), which keeps 1-pixel levels stable.
//!
//! The kernel id stored in the container header (1 = this filter) versions
//! the choice, so a different kernel can be introduced without breaking
//! existing files.

use crate::raster::RasterImage;

/// Downsample a raster by a factor of 2 with a 2x2 box (mean) filter.
pub fn downsample_box2x2(src: &RasterImage) -> RasterImage {
    let src_w = src.width();
    let src_h = src.height();
    let dst_w = (src_w / 2).max(1);
    let dst_h = (src_h / 2).max(1);
    let channels = src.channels() as usize;

    let mut data = Vec::with_capacity(dst_w as usize * dst_h as usize * channels);

    for y in 0..dst_h {
        let sy0 = 2 * y;
        let sy1 = (2 * y + 1).min(src_h - 1);
        let row0 = src.row(sy0);
        let row1 = src.row(sy1);

        for x in 0..dst_w {
            let sx0 = 2 * x as usize * channels;
            let sx1 = (2 * x + 1).min(src_w - 1) as usize * channels;

            for c in 0..channels {
                let sum = row0[sx0 + c] as u32
                    + row0[sx1 + c] as u32
                    + row1[sx0 + c] as u32
                    + row1[sx1 + c] as u32;
                data.push(((sum + 2) / 4) as u8);
            }
        }
    }

    RasterImage::from_vec(dst_w, dst_h, src.channels(), data)
        .expect("buffer length matches dimensions")
}
