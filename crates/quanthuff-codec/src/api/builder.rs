//! Codec builder, the primary entry point for the crate.
//!
//! [`Codec`] picks a quantization strategy, carries its options and runs the
//! whole compress or decompress pipeline.

use std::io::{Read, Write};

use crate::container::{Artifact, Decoded};
use crate::error::Result;
use crate::quantize::{
    BlockAverage, BlockRounding, MatchMode, OctreeOptions, OctreeQuantizer, Quantizer, Strategy,
};
use crate::volume::PixelVolume;

/// High-level compressor.
///
/// # Design
///
/// - Constructor requires a [`Strategy`]
/// - Configuration methods consume and return `self`
/// - [`compress()`](Self::compress) takes `&self` so one codec can be reused
///   across many images, including from several threads
/// - Octree options are ignored by the block strategies
///
/// # Example
///
/// ```
/// use quanthuff_codec::{Codec, MatchMode, PixelVolume, Strategy};
///
/// let mut volume = PixelVolume::new(4, 4, 3);
/// volume.set_pixel(0, 0, &[255, 0, 0]);
///
/// let codec = Codec::new(Strategy::OctreePalette)
///     .max_colors(16)
///     .match_mode(MatchMode::Exact);
///
/// let artifact = codec.compress(&volume).unwrap();
/// let decoded = Codec::decompress(&artifact).unwrap();
///
/// assert!(decoded.is_complete());
/// assert_eq!(decoded.volume.pixel(0, 0), &[255, 0, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codec {
    strategy: Strategy,
    octree: OctreeOptions,
}

impl Codec {
    /// Create a codec for `strategy` with default octree options.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            octree: OctreeOptions::default(),
        }
    }

    /// Target palette size for the octree strategy.
    #[inline]
    pub fn max_colors(mut self, max_colors: usize) -> Self {
        self.octree = self.octree.max_colors(max_colors);
        self
    }

    #[inline]
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.octree = self.octree.match_mode(mode);
        self
    }

    /// Ceiling on live octree nodes during classification.
    #[inline]
    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.octree = self.octree.max_nodes(max_nodes);
        self
    }

    /// Replace all octree options at once.
    #[inline]
    pub fn octree_options(mut self, options: OctreeOptions) -> Self {
        self.octree = options;
        self
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[inline]
    pub fn options(&self) -> &OctreeOptions {
        &self.octree
    }

    /// Quantize and entropy code `volume`.
    pub fn compress(&self, volume: &PixelVolume) -> Result<Artifact> {
        let quantized = match self.strategy {
            Strategy::RoundedBlockAverage => {
                BlockAverage::new(BlockRounding::Decile).quantize(volume)?
            }
            Strategy::PlainBlockAverage => BlockAverage::new(BlockRounding::Plain).quantize(volume)?,
            Strategy::OctreePalette => OctreeQuantizer::new(self.octree.clone()).quantize(volume)?,
        };
        Artifact::assemble(self.strategy, volume, quantized)
    }

    /// Compress and write the artifact to `writer`.
    pub fn compress_to<W: Write>(&self, volume: &PixelVolume, writer: W) -> Result<Artifact> {
        let artifact = self.compress(volume)?;
        artifact.write_to(writer)?;
        Ok(artifact)
    }

    /// Rebuild the pixel volume an artifact describes.
    ///
    /// A short bitstream yields a partial result, see [`Decoded`].
    pub fn decompress(artifact: &Artifact) -> Result<Decoded> {
        artifact.reconstruct()
    }

    /// Read one artifact from `reader` and decompress it.
    pub fn decompress_from<R: Read>(reader: R) -> Result<Decoded> {
        Self::decompress(&Artifact::read_from(reader)?)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    fn sample() -> PixelVolume {
        let mut volume = PixelVolume::new(6, 4, 3);
        for x in 0..6 {
            for y in 0..4 {
                volume.set_pixel(x, y, &[(x * 50) as u8, (y * 80) as u8, 128]);
            }
        }
        volume
    }

    #[test]
    fn test_builder_settings() {
        let codec = Codec::new(Strategy::OctreePalette)
            .max_colors(32)
            .match_mode(MatchMode::Exact)
            .max_nodes(1000);
        assert_eq!(codec.strategy(), Strategy::OctreePalette);
        assert_eq!(codec.options().max_colors, 32);
        assert_eq!(codec.options().match_mode, MatchMode::Exact);
        assert_eq!(codec.options().max_nodes, 1000);
    }

    #[test]
    fn test_codec_is_reusable() {
        let codec = Codec::new(Strategy::RoundedBlockAverage);
        let volume = sample();
        let a = codec.compress(&volume).unwrap();
        let b = codec.compress(&volume).unwrap();
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn test_stream_roundtrip() {
        let codec = Codec::new(Strategy::PlainBlockAverage);
        let volume = sample();
        let mut buffer = Vec::new();
        codec.compress_to(&volume, &mut buffer).unwrap();

        let decoded = Codec::decompress_from(buffer.as_slice()).unwrap();
        assert!(decoded.is_complete());
        assert_eq!(decoded.volume.width(), 6);
        assert_eq!(decoded.volume.height(), 4);
    }

    #[test]
    fn test_invalid_options_rejected_before_work() {
        let codec = Codec::new(Strategy::OctreePalette).max_colors(0);
        assert!(matches!(
            codec.compress(&sample()),
            Err(CodecError::UnsupportedQuantizerConfig(_))
        ));
    }

    #[test]
    fn test_block_strategies_ignore_octree_options() {
        let codec = Codec::new(Strategy::PlainBlockAverage).max_colors(0);
        assert!(codec.compress(&sample()).is_ok());
    }

    #[test]
    fn test_codec_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Codec>();
        assert_send_sync::<Artifact>();
        assert_send_sync::<Decoded>();
    }
}
