//! Region-of-interest decode tests: equivalence with full decode and
//! sparse access behavior.

use mrj::{DecodeError, Decoder, Rect};

use super::test_utils::{encode_to_memory, gradient_raster, open_memory, TrackingReader};

#[test]
fn test_region_equals_full_level_subrect() {
    let image = gradient_raster(300, 220, 3);
    let decoder = open_memory(encode_to_memory(&image, 75, 64, 1));

    for level in 0..2usize {
        let full = decoder.decode_level(level).unwrap();

        let rects = [
            Rect::new(0, 0, full.width(), full.height()), // whole level
            Rect::new(0, 0, 1, 1),                        // single pixel
            Rect::new(10, 10, 40, 30),                    // inside one tile
            Rect::new(50, 50, 100, 80),                   // spans tile boundaries
            Rect::new(full.width() - 7, full.height() - 5, 7, 5), // bottom-right corner
        ];

        for rect in rects {
            let region = decoder.decode_region(level, rect).unwrap();
            assert_eq!((region.width(), region.height()), (rect.width, rect.height));

            let expected = full.crop(rect.x, rect.y, rect.width, rect.height);
            assert_eq!(region, expected, "level {} rect {:?}", level, rect);
        }
    }
}

#[test]
fn test_region_decode_reads_only_needed_tiles() {
    // 512x512 with 64px tiles: 64 tiles at level 0
    let image = gradient_raster(512, 512, 1);
    let bytes = encode_to_memory(&image, 75, 64, 0);
    let container_size = bytes.len();

    let reader = TrackingReader::new(bytes);
    let tracker = reader.tracker();
    let decoder = Decoder::open_with_reader(reader).unwrap();

    let reads_after_open = tracker.request_count();

    // A 100x100 rect starting at (30, 30) touches a 3x3 tile block
    decoder.decode_region(0, Rect::new(30, 30, 100, 100)).unwrap();
    let tile_reads = tracker.request_count() - reads_after_open;
    assert_eq!(tile_reads, 9, "expected 9 tile reads, got {}", tile_reads);

    // And those reads together cover a small fraction of the container
    let bytes_read: usize = tracker
        .requests()
        .into_iter()
        .skip(reads_after_open)
        .map(|(_, len)| len)
        .sum();
    assert!(
        bytes_read < container_size / 4,
        "read {} of {} container bytes",
        bytes_read,
        container_size
    );

    // A rect within a single tile costs one read
    decoder.decode_region(0, Rect::new(256, 256, 10, 10)).unwrap();
    let tile_reads = tracker.request_count() - reads_after_open - 9;
    assert_eq!(tile_reads, 1);
}

#[test]
fn test_repeated_region_decode_hits_cache() {
    let image = gradient_raster(256, 256, 1);
    let bytes = encode_to_memory(&image, 75, 64, 0);

    let reader = TrackingReader::new(bytes);
    let tracker = reader.tracker();
    let decoder = Decoder::open_with_reader(reader).unwrap();

    let rect = Rect::new(10, 10, 200, 200);
    let first = decoder.decode_region(0, rect).unwrap();
    let reads_after_first = tracker.request_count();

    let second = decoder.decode_region(0, rect).unwrap();
    assert_eq!(first, second);
    // Every tile came from the decoded-tile cache; no further reads
    assert_eq!(tracker.request_count(), reads_after_first);
}

#[test]
fn test_region_on_coarse_level() {
    let image = gradient_raster(600, 400, 3);
    let decoder = open_memory(encode_to_memory(&image, 75, 256, 2));

    // Level 2 is 150x100, a single tile
    let region = decoder.decode_region(2, Rect::new(20, 30, 60, 40)).unwrap();
    assert_eq!((region.width(), region.height()), (60, 40));

    let full = decoder.decode_level(2).unwrap();
    assert_eq!(region, full.crop(20, 30, 60, 40));
}

#[test]
fn test_empty_region_is_rejected() {
    let decoder = open_memory(encode_to_memory(&gradient_raster(64, 64, 1), 75, 32, 0));

    for rect in [Rect::new(0, 0, 0, 10), Rect::new(5, 5, 10, 0)] {
        let result = decoder.decode_region(0, rect);
        assert!(
            matches!(result, Err(DecodeError::EmptyRegion { .. })),
            "rect {:?}",
            rect
        );
    }
}

#[test]
fn test_out_of_bounds_region_is_rejected() {
    let decoder = open_memory(encode_to_memory(&gradient_raster(64, 64, 1), 75, 32, 0));

    let cases = [
        Rect::new(60, 0, 10, 10),  // spills right
        Rect::new(0, 60, 10, 10),  // spills down
        Rect::new(64, 0, 1, 1),    // starts past the edge
        Rect::new(0, 0, 65, 64),   // too wide
    ];

    for rect in cases {
        let result = decoder.decode_region(0, rect);
        assert!(
            matches!(result, Err(DecodeError::RegionOutOfBounds { .. })),
            "rect {:?}",
            rect
        );
    }
}

#[test]
fn test_region_on_invalid_level() {
    let decoder = open_memory(encode_to_memory(&gradient_raster(64, 64, 1), 75, 32, 0));
    let result = decoder.decode_region(3, Rect::new(0, 0, 4, 4));
    assert!(matches!(result, Err(DecodeError::InvalidLevel { .. })));
}
