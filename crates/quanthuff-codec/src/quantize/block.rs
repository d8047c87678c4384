//! 2×2 block-average quantizers.

use super::{Quantized, Quantizer};
use crate::error::Result;
use crate::volume::{PixelVolume, SymbolGrid};

/// Post-averaging treatment of each channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRounding {
    /// Keep the truncated average as is.
    Plain,
    /// Snap to the nearest multiple of ten, half up; 255 becomes 250.
    Decile,
}

/// Averages each non-overlapping 2×2 block into one cell.
///
/// The output grid is `width / 2` × `height / 2` cells with one symbol per
/// channel. An odd last row or column is not covered by any block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockAverage {
    rounding: BlockRounding,
}

impl BlockAverage {
    pub const fn new(rounding: BlockRounding) -> Self {
        Self { rounding }
    }

    pub const fn rounding(&self) -> BlockRounding {
        self.rounding
    }
}

impl Quantizer for BlockAverage {
    fn quantize(&self, volume: &PixelVolume) -> Result<Quantized> {
        let width = volume.width() / 2;
        let height = volume.height() / 2;
        let channels = volume.channels();
        let mut symbols = Vec::with_capacity(width * height * channels);

        for bx in 0..width {
            for by in 0..height {
                let (x, y) = (bx * 2, by * 2);
                for c in 0..channels {
                    let sum = volume.get(x, y, c) as u32
                        + volume.get(x + 1, y, c) as u32
                        + volume.get(x, y + 1, c) as u32
                        + volume.get(x + 1, y + 1, c) as u32;
                    let average = sum / 4;
                    let value = match self.rounding {
                        BlockRounding::Plain => average,
                        BlockRounding::Decile => round_to_decile(average),
                    };
                    symbols.push(value);
                }
            }
        }

        Ok(Quantized {
            grid: SymbolGrid::new(width, height, channels, symbols),
            palette: None,
        })
    }
}

/// Round half up to a multiple of ten, with 255 aliased to 250 so the result
/// stays inside a byte.
#[inline]
pub fn round_to_decile(value: u32) -> u32 {
    if value == 255 {
        250
    } else {
        (value + 5) / 10 * 10
    }
}

/// Write one decoded channel value into all four pixels of its block.
#[inline]
pub(crate) fn replicate(volume: &mut PixelVolume, bx: usize, by: usize, channel: usize, value: u8) {
    let (x, y) = (bx * 2, by * 2);
    volume.set(x, y, channel, value);
    volume.set(x + 1, y, channel, value);
    volume.set(x, y + 1, channel, value);
    volume.set(x + 1, y + 1, channel, value);
}
