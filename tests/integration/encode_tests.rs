//! Encoder integration tests: container structure, determinism, atomicity.

use std::fs;

use mrj::{
    Encoder, Header, LayoutError, PyramidLayout, RasterImage, TileIndex, EncodeError, HEADER_SIZE,
};

use super::test_utils::{encode_to_memory, gradient_raster};

#[test]
fn test_container_structure_is_self_consistent() {
    let image = gradient_raster(600, 400, 3);
    let bytes = encode_to_memory(&image, 75, 256, 2);

    let header = Header::parse(&bytes).unwrap();
    assert_eq!(header.width, 600);
    assert_eq!(header.height, 400);
    assert_eq!(header.level_count, 3);
    assert_eq!(header.tile_size, 256);
    assert_eq!(header.channels, 3);

    let layout = PyramidLayout::compute(600, 400, 256, 2).unwrap();
    let index_region = &bytes[HEADER_SIZE..HEADER_SIZE + TileIndex::byte_len(&layout) as usize];
    let index = TileIndex::parse(index_region, &layout, bytes.len() as u64).unwrap();

    // Every tile is a complete JPEG stream exactly where the index says
    for level in layout.levels() {
        for tile in 0..level.tile_count() as u32 {
            let entry = index.get(level.level_index, tile).unwrap();
            let data = &bytes[entry.offset as usize..(entry.offset + entry.length as u64) as usize];
            assert_eq!(&data[0..2], &[0xFF, 0xD8], "SOI marker");
            assert_eq!(&data[data.len() - 2..], &[0xFF, 0xD9], "EOI marker");
        }
    }

    // The last tile ends exactly at the end of the file
    let last_level = layout.levels().last().unwrap();
    let last = index
        .get(last_level.level_index, last_level.tile_count() as u32 - 1)
        .unwrap();
    assert_eq!(last.offset + last.length as u64, bytes.len() as u64);
}

#[test]
fn test_encoding_is_byte_identical_across_runs() {
    let image = gradient_raster(300, 200, 3);

    let a = encode_to_memory(&image, 75, 128, 2);
    let b = encode_to_memory(&image, 75, 128, 2);
    assert_eq!(a, b);

    // Different parameters must produce different containers
    let c = encode_to_memory(&image, 50, 128, 2);
    assert_ne!(a, c);
}

#[test]
fn test_quality_affects_compressed_size() {
    let image = gradient_raster(256, 256, 3);

    let high = encode_to_memory(&image, 95, 256, 0);
    let low = encode_to_memory(&image, 10, 256, 0);
    assert!(
        high.len() > low.len(),
        "quality 95 ({} bytes) should out-size quality 10 ({} bytes)",
        high.len(),
        low.len()
    );
}

#[test]
fn test_encode_zero_dimension_fails_with_layout_error() {
    let image = RasterImage::from_vec(0, 0, 1, vec![]).unwrap();
    let result = Encoder::new().encode_to_vec(&image);
    assert!(matches!(
        result,
        Err(EncodeError::Layout(LayoutError::InvalidDimension { .. }))
    ));
}

#[test]
fn test_encode_file_is_atomic() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("scene.mrj");

    let image = gradient_raster(100, 100, 3);
    let report = Encoder::new()
        .with_max_level(1)
        .encode(&image, &path)
        .unwrap();

    assert_eq!(report.container_bytes, fs::metadata(&path).unwrap().len());

    // Only the container itself remains; no temp files
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["scene.mrj".to_string()]);
}

#[test]
fn test_failed_encode_leaves_directory_clean() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("broken.mrj");

    let image = RasterImage::from_vec(0, 0, 1, vec![]).unwrap();
    assert!(Encoder::new().encode(&image, &path).is_err());

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_encode_overwrites_existing_container() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("scene.mrj");

    let small = gradient_raster(40, 40, 1);
    let large = gradient_raster(200, 200, 1);

    Encoder::new().with_max_level(0).encode(&large, &path).unwrap();
    let large_len = fs::metadata(&path).unwrap().len();

    Encoder::new().with_max_level(0).encode(&small, &path).unwrap();
    let small_len = fs::metadata(&path).unwrap().len();

    assert!(small_len < large_len);
    let header = Header::parse(&fs::read(&path).unwrap()).unwrap();
    assert_eq!((header.width, header.height), (40, 40));
}

#[test]
fn test_single_pixel_image_encodes() {
    let image = RasterImage::from_vec(1, 1, 3, vec![200, 100, 50]).unwrap();
    let bytes = encode_to_memory(&image, 90, 256, 3);

    let header = Header::parse(&bytes).unwrap();
    assert_eq!((header.width, header.height), (1, 1));
    assert_eq!(header.level_count, 4); // all levels are 1x1
}
