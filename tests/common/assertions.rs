//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use quanthuff::rendering::read_png;
use quanthuff_codec::PixelVolume;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a PNG written by the service.
pub fn load_png(path: &Path) -> PixelVolume {
    let file = File::open(path).unwrap_or_else(|e| panic!("Cannot open {}: {e}", path.display()));
    read_png(BufReader::new(file)).expect("Output should be a valid PNG")
}

/// Assert two volumes share dimensions.
pub fn assert_same_shape(actual: &PixelVolume, expected: &PixelVolume) {
    assert_eq!(
        (actual.width(), actual.height(), actual.channels()),
        (expected.width(), expected.height(), expected.channels()),
        "Decoded image has the wrong shape"
    );
}

/// Assert every channel of every pixel is within `tolerance` of the original.
pub fn assert_close(actual: &PixelVolume, expected: &PixelVolume, tolerance: u8) {
    assert_same_shape(actual, expected);
    for x in 0..expected.width() {
        for y in 0..expected.height() {
            let a = actual.pixel(x, y);
            let e = expected.pixel(x, y);
            for c in 0..e.len() {
                assert!(
                    a[c].abs_diff(e[c]) <= tolerance,
                    "Pixel ({x}, {y}) channel {c}: got {}, expected {} (tolerance {tolerance})",
                    a[c],
                    e[c]
                );
            }
        }
    }
}

/// Assert the file at `path` starts with the artifact magic.
pub fn assert_artifact(path: &Path) {
    let bytes = std::fs::read(path).expect("Artifact should exist");
    assert!(
        bytes.starts_with(b"QHUF"),
        "Expected artifact magic, got {:?}",
        &bytes[..4.min(bytes.len())]
    );
}
