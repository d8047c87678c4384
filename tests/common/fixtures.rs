//! Test fixtures: synthetic images and a scratch directory.

use quanthuff::rendering::write_png;
use quanthuff_codec::PixelVolume;
use std::fs::File;
use std::path::PathBuf;
use tempfile::TempDir;

/// Image sizes that exercise odd and asymmetric dimensions
pub mod sizes {
    pub const SQUARE: (usize, usize) = (16, 16);
    pub const WIDE: (usize, usize) = (24, 6);
    pub const TALL: (usize, usize) = (5, 19);
}

/// Horizontal red ramp, vertical green ramp, constant blue.
pub fn gradient(width: usize, height: usize) -> PixelVolume {
    let span = |n: usize| n.saturating_sub(1).max(1);
    let mut volume = PixelVolume::new(width, height, 3);
    for x in 0..width {
        for y in 0..height {
            let r = (x * 255 / span(width)) as u8;
            let g = (y * 255 / span(height)) as u8;
            volume.set_pixel(x, y, &[r, g, 96]);
        }
    }
    volume
}

/// Four flat quadrants in four distinct colors.
pub fn quadrants(width: usize, height: usize) -> PixelVolume {
    const COLORS: [[u8; 3]; 4] = [[250, 20, 20], [20, 250, 20], [20, 20, 250], [240, 240, 240]];
    let mut volume = PixelVolume::new(width, height, 3);
    for x in 0..width {
        for y in 0..height {
            let quadrant = usize::from(x >= width / 2) + 2 * usize::from(y >= height / 2);
            volume.set_pixel(x, y, &COLORS[quadrant]);
        }
    }
    volume
}

/// A scratch directory that is removed when dropped.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `volume` as a PNG named `name` and return its path.
    pub fn png(&self, name: &str, volume: &PixelVolume) -> PathBuf {
        let path = self.path(name);
        let file = File::create(&path).expect("Failed to create PNG");
        write_png(volume, file).expect("Failed to write PNG");
        path
    }

    /// Write a YAML config file and return its path.
    pub fn config(&self, yaml: &str) -> PathBuf {
        let path = self.path("quanthuff.yaml");
        std::fs::write(&path, yaml).expect("Failed to write config");
        path
    }
}

/// Rewrite a rounded-block artifact so only the first `keep` bytes of its
/// bitstream remain. That strategy has no trailing metadata, so the
/// bitstream is the tail of the file.
pub fn truncate_bitstream(path: &std::path::Path, tree_bytes: usize, keep: usize) {
    // magic, version, strategy, 3 dims, leaf count, symbol bits, tree length
    let offset = 4 + 1 + 1 + 12 + 4 + 1 + 4 + tree_bytes;
    let bytes = std::fs::read(path).expect("Artifact should exist");
    let mut out = bytes[..offset].to_vec();
    out.extend_from_slice(&(keep as u32).to_be_bytes());
    out.extend_from_slice(&bytes[offset + 4..offset + 4 + keep]);
    std::fs::write(path, out).expect("Failed to rewrite artifact");
}
