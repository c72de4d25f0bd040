//! Decoder integration tests: round trips, level selection, edge tiles.

use mrj::{Decoder, DecodeError, RasterImage};

use super::test_utils::{
    encode_to_memory, gradient_raster, mean_abs_diff, open_memory, per_tile_raster,
};

#[test]
fn test_level_zero_round_trip_within_jpeg_error() {
    let image = gradient_raster(300, 200, 3);
    let decoder = open_memory(encode_to_memory(&image, 90, 128, 2));

    let decoded = decoder.decode_level(0).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (300, 200));

    // Lossy codec: assert closeness, not equality
    let error = mean_abs_diff(&image, &decoded);
    assert!(error < 4.0, "mean error {} too high for quality 90", error);
}

#[test]
fn test_every_level_has_halved_dimensions() {
    let image = gradient_raster(600, 400, 1);
    let decoder = open_memory(encode_to_memory(&image, 75, 256, 2));

    assert_eq!(decoder.level_count(), 3);

    let l0 = decoder.decode_level(0).unwrap();
    assert_eq!((l0.width(), l0.height()), (600, 400));

    let l1 = decoder.decode_level(1).unwrap();
    assert_eq!((l1.width(), l1.height()), (300, 200));

    let l2 = decoder.decode_level(2).unwrap();
    assert_eq!((l2.width(), l2.height()), (150, 100));
}

#[test]
fn test_coarse_level_approximates_downsampled_source() {
    // A solid image downsamples to itself, so every level should stay near
    // the constant regardless of JPEG loss
    let image = RasterImage::from_vec(256, 256, 1, vec![99; 256 * 256]).unwrap();
    let decoder = open_memory(encode_to_memory(&image, 75, 64, 3));

    for level in 0..4 {
        let decoded = decoder.decode_level(level).unwrap();
        let expected =
            RasterImage::from_vec(decoded.width(), decoded.height(), 1, vec![99; decoded.data().len()])
                .unwrap();
        let error = mean_abs_diff(&expected, &decoded);
        assert!(error < 2.0, "level {} drifted by {}", level, error);
    }
}

#[test]
fn test_tiles_compose_in_correct_positions() {
    // Distinct per-tile values: any misplaced tile shifts whole blocks
    let image = per_tile_raster(256, 192, 64);
    let decoder = open_memory(encode_to_memory(&image, 95, 64, 0));

    let decoded = decoder.decode_level(0).unwrap();

    // Probe the center of each tile; JPEG on flat blocks is near-exact
    for tile_y in 0..3 {
        for tile_x in 0..4 {
            let x = tile_x * 64 + 32;
            let y = tile_y * 64 + 32;
            let expected = image.pixel(x, y)[0] as i32;
            let actual = decoded.pixel(x, y)[0] as i32;
            assert!(
                (expected - actual).abs() <= 2,
                "tile ({}, {}): expected {}, got {}",
                tile_x,
                tile_y,
                expected,
                actual
            );
        }
    }
}

#[test]
fn test_edge_tiles_decode_exact_pixel_counts() {
    // 600x400 with 256px tiles: right column is 88px wide, bottom row 144px
    let image = gradient_raster(600, 400, 3);
    let decoder = open_memory(encode_to_memory(&image, 75, 256, 0));

    let edge = decoder.decode_tile(0, 2, 1).unwrap();
    assert_eq!((edge.width(), edge.height()), (88, 144));

    let interior = decoder.decode_tile(0, 0, 0).unwrap();
    assert_eq!((interior.width(), interior.height()), (256, 256));

    // The composited level is exactly the nominal size, no padding
    let full = decoder.decode_level(0).unwrap();
    assert_eq!((full.width(), full.height()), (600, 400));
}

#[test]
fn test_edge_pixels_survive_round_trip() {
    // The very last row/column must carry image data, not padding artifacts
    let image = gradient_raster(130, 70, 1);
    let decoder = open_memory(encode_to_memory(&image, 95, 64, 0));
    let decoded = decoder.decode_level(0).unwrap();

    let w = image.width() - 1;
    let h = image.height() - 1;
    for (x, y) in [(w, 0), (0, h), (w, h), (w - 1, h - 1)] {
        let expected = image.pixel(x, y)[0] as i32;
        let actual = decoded.pixel(x, y)[0] as i32;
        assert!(
            (expected - actual).abs() < 24,
            "pixel ({}, {}): expected {}, got {}",
            x,
            y,
            expected,
            actual
        );
    }
}

#[test]
fn test_invalid_level_is_rejected() {
    let decoder = open_memory(encode_to_memory(&gradient_raster(64, 64, 1), 75, 32, 1));

    let result = decoder.decode_level(5);
    assert!(matches!(
        result,
        Err(DecodeError::InvalidLevel {
            requested: 5,
            level_count: 2
        })
    ));
}

#[test]
fn test_tile_out_of_bounds_is_rejected() {
    let decoder = open_memory(encode_to_memory(&gradient_raster(64, 64, 1), 75, 32, 0));

    let result = decoder.decode_tile(0, 2, 0);
    assert!(matches!(result, Err(DecodeError::TileOutOfBounds { .. })));
}

#[test]
fn test_handle_survives_failed_call() {
    let decoder = open_memory(encode_to_memory(&gradient_raster(64, 64, 1), 75, 32, 1));

    assert!(decoder.decode_level(9).is_err());
    // The handle is still good for valid requests
    let raster = decoder.decode_level(1).unwrap();
    assert_eq!((raster.width(), raster.height()), (32, 32));
}

#[test]
fn test_grayscale_container_decodes_single_channel() {
    let decoder = open_memory(encode_to_memory(&gradient_raster(50, 50, 1), 75, 32, 0));
    let decoded = decoder.decode_level(0).unwrap();
    assert_eq!(decoded.channels(), 1);
}

#[test]
fn test_decode_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("scene.mrj");

    let image = gradient_raster(120, 90, 3);
    mrj::Encoder::new()
        .with_tile_size(64)
        .with_max_level(1)
        .encode(&image, &path)
        .unwrap();

    let decoder = Decoder::open(&path).unwrap();
    let decoded = decoder.decode_level(0).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (120, 90));
    assert!(mean_abs_diff(&image, &decoded) < 8.0);
}

#[test]
fn test_open_missing_file_is_io_error() {
    let result = Decoder::open(std::path::Path::new("/nonexistent/missing.mrj"));
    assert!(matches!(result, Err(DecodeError::Io(_))));
}
