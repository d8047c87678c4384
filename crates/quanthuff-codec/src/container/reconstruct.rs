//! Symbol stream → pixel volume.

use super::{Artifact, Metadata};
use crate::bitpack::BitReader;
use crate::error::{CodecError, Result};
use crate::quantize::replicate;
use crate::volume::PixelVolume;

/// Result of decoding an artifact.
///
/// Running out of bitstream is not an error: the volume is returned with
/// every pixel that could be decoded and zeros elsewhere, and the counts say
/// how far decoding got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub volume: PixelVolume,
    pub decoded_symbols: usize,
    pub expected_symbols: usize,
}

impl Decoded {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.decoded_symbols == self.expected_symbols
    }

    /// The volume, or [`CodecError::IncompletePixelData`] if decoding
    /// stopped early.
    pub fn into_complete(self) -> Result<PixelVolume> {
        if self.is_complete() {
            Ok(self.volume)
        } else {
            Err(CodecError::IncompletePixelData {
                decoded: self.decoded_symbols,
                expected: self.expected_symbols,
            })
        }
    }
}

impl Artifact {
    /// Replay the bitstream through the inverse of the artifact's strategy.
    pub fn reconstruct(&self) -> Result<Decoded> {
        let (width, height, channels) = self.output_dimensions();
        let expected = self.expected_symbols();
        let mut volume = PixelVolume::new(width, height, channels);
        let mut reader = BitReader::new(&self.bitstream);

        let decoded = match &self.metadata {
            Metadata::Palette(palette) => {
                self.tree.decode_into(&mut reader, expected, |position, symbol| {
                    let (x, y) = (position / height, position % height);
                    if let Some(color) = palette.get(symbol as usize) {
                        volume.set_pixel(x, y, &color.to_array());
                    }
                })
            }
            Metadata::Implied | Metadata::Dimensions { .. } => {
                let cells_high = height / 2;
                self.tree.decode_into(&mut reader, expected, |position, symbol| {
                    let (cell, channel) = (position / channels, position % channels);
                    let (bx, by) = (cell / cells_high, cell % cells_high);
                    replicate(&mut volume, bx, by, channel, symbol as u8);
                })
            }
        };

        if decoded < expected {
            tracing::warn!(
                decoded,
                expected,
                strategy = %self.strategy,
                "Bitstream ended early; remaining pixels left black"
            );
        }

        Ok(Decoded {
            volume,
            decoded_symbols: decoded,
            expected_symbols: expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::{
        BlockAverage, BlockRounding, OctreeOptions, OctreeQuantizer, Quantizer, Strategy,
    };

    fn checker(width: usize, height: usize) -> PixelVolume {
        let mut volume = PixelVolume::new(width, height, 3);
        for x in 0..width {
            for y in 0..height {
                let value = if (x / 2 + y / 2) % 2 == 0 { 200 } else { 20 };
                volume.set_pixel(x, y, &[value, value / 2, 255 - value]);
            }
        }
        volume
    }

    fn roundtrip(strategy: Strategy, volume: &PixelVolume) -> Decoded {
        let quantized = match strategy {
            Strategy::RoundedBlockAverage => BlockAverage::new(BlockRounding::Decile).quantize(volume),
            Strategy::PlainBlockAverage => BlockAverage::new(BlockRounding::Plain).quantize(volume),
            Strategy::OctreePalette => OctreeQuantizer::default().quantize(volume),
        }
        .unwrap();
        let artifact = Artifact::assemble(strategy, volume, quantized).unwrap();
        Artifact::from_bytes(&artifact.to_bytes().unwrap())
            .unwrap()
            .reconstruct()
            .unwrap()
    }

    #[test]
    fn test_plain_block_replication_is_exact_for_uniform_blocks() {
        let volume = checker(8, 6);
        let decoded = roundtrip(Strategy::PlainBlockAverage, &volume);
        assert!(decoded.is_complete());
        assert_eq!(decoded.volume, volume);
    }

    #[test]
    fn test_rounded_block_snaps_values() {
        let volume = checker(4, 4);
        let decoded = roundtrip(Strategy::RoundedBlockAverage, &volume);
        assert_eq!(decoded.volume.pixel(0, 0), &[200, 100, 60]);
        assert_eq!(decoded.volume.pixel(2, 0), &[20, 10, 240]);
    }

    #[test]
    fn test_odd_edges_stay_zero() {
        let volume = checker(5, 3);
        for strategy in [Strategy::RoundedBlockAverage, Strategy::PlainBlockAverage] {
            let decoded = roundtrip(strategy, &volume);
            assert_eq!(decoded.volume.width(), 5);
            assert_eq!(decoded.volume.height(), 3);
            for y in 0..3 {
                assert_eq!(decoded.volume.pixel(4, y), &[0, 0, 0]);
            }
            for x in 0..5 {
                assert_eq!(decoded.volume.pixel(x, 2), &[0, 0, 0]);
            }
        }
    }

    #[test]
    fn test_octree_palette_lookup() {
        let volume = checker(4, 4);
        let decoded = roundtrip(Strategy::OctreePalette, &volume);
        assert!(decoded.is_complete());
        // Two exact colors fit in the default palette.
        assert_eq!(decoded.volume, volume);
    }

    #[test]
    fn test_truncated_bitstream_is_partial() {
        let mut volume = PixelVolume::new(16, 16, 3);
        for x in 0..16 {
            for y in 0..16 {
                volume.set_pixel(x, y, &[(x * 16) as u8, (y * 16) as u8, 7]);
            }
        }
        let quantized = BlockAverage::new(BlockRounding::Plain)
            .quantize(&volume)
            .unwrap();
        let mut artifact = Artifact::assemble(Strategy::PlainBlockAverage, &volume, quantized).unwrap();
        let keep = artifact.bitstream.len() / 2;
        artifact.bitstream.truncate(keep);

        let decoded = artifact.reconstruct().unwrap();
        assert!(!decoded.is_complete());
        assert!(decoded.decoded_symbols < decoded.expected_symbols);
        assert_eq!(decoded.volume.width(), 16);
        assert_eq!(decoded.volume.height(), 16);
        assert!(matches!(
            decoded.into_complete(),
            Err(CodecError::IncompletePixelData { .. })
        ));
    }

    #[test]
    fn test_empty_volume_roundtrip() {
        let volume = PixelVolume::new(0, 0, 3);
        let decoded = roundtrip(Strategy::OctreePalette, &volume);
        assert_eq!(decoded.expected_symbols, 0);
        assert!(decoded.is_complete());
    }
}
