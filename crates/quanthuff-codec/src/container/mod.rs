//! Binary artifact container.
//!
//! An [`Artifact`] bundles everything needed to rebuild a pixel volume: the
//! strategy tag, the record dimensions, the Huffman tree, the packed
//! bitstream and the strategy metadata. Layout (all integers big-endian):
//!
//! ```text
//! "QHUF" | version u8 | strategy u8
//! width u32 | height u32 | channels u32
//! leaf_count u32 | symbol_bits u8 | tree_len u32 | tree bytes
//! bitstream_len u32 | bitstream bytes
//! metadata: none | width i32, height i32 | count u32, count × 0xFFRRGGBB
//! ```
//!
//! The plain block strategy records the halved grid dimensions and keeps the
//! original ones in its metadata; the other two record the original
//! dimensions directly. The bitstream carries no length in symbols: decode
//! stops after the count implied by the dimensions.

mod reconstruct;
mod wire;

pub use reconstruct::Decoded;

use std::io::{Read, Write};

use crate::error::{CodecError, Result};
use crate::huffman::{self, count_frequencies, HuffmanTree, TreeRecord};
use crate::quantize::{Palette, Quantized, Rgb, Strategy};
use crate::volume::PixelVolume;
use wire::{WireReader, WireWriter};

/// Leading bytes of every artifact.
pub const MAGIC: [u8; 4] = *b"QHUF";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// Largest `width * height * channels` an artifact may describe (1 GiB of
/// samples).
///
/// A single-symbol alphabet costs zero bits per symbol, so a header alone
/// could otherwise ask the decoder to allocate and fill any size.
pub const MAX_DECODED_SAMPLES: usize = 1 << 30;

/// Strategy-specific trailer of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    /// Everything needed is in the record dimensions.
    Implied,
    /// Original image dimensions.
    Dimensions { width: i32, height: i32 },
    /// Palette the symbols index into.
    Palette(Palette),
}

/// A compressed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    strategy: Strategy,
    width: u32,
    height: u32,
    channels: u32,
    tree: HuffmanTree,
    bitstream: Vec<u8>,
    metadata: Metadata,
}

/// Human-facing description of an artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSummary {
    pub strategy: Strategy,
    /// Dimensions of the volume decode produces.
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub alphabet_size: usize,
    /// `(symbol, code length)` pairs, sorted by symbol.
    pub code_lengths: Vec<(u32, usize)>,
    pub average_code_length: f64,
    pub expected_symbols: usize,
    pub tree_bytes: usize,
    pub bitstream_bytes: usize,
    pub palette_size: Option<usize>,
    pub total_bytes: usize,
}

impl Artifact {
    /// Entropy code quantizer output into an artifact.
    ///
    /// `volume` is the image that was quantized; its dimensions go into the
    /// record and metadata.
    pub fn assemble(strategy: Strategy, volume: &PixelVolume, quantized: Quantized) -> Result<Self> {
        let fits = |n: usize| i32::try_from(n).is_ok();
        if !fits(volume.width()) || !fits(volume.height()) || !fits(volume.channels()) {
            return Err(CodecError::InvalidVolume {
                width: volume.width(),
                height: volume.height(),
                channels: volume.channels(),
                reason: "dimensions exceed the artifact range",
            });
        }
        if volume.samples().len() > MAX_DECODED_SAMPLES {
            return Err(CodecError::InvalidVolume {
                width: volume.width(),
                height: volume.height(),
                channels: volume.channels(),
                reason: "more samples than an artifact may decode to",
            });
        }

        let Quantized { grid, palette } = quantized;
        let symbols = grid.symbols();
        let tree = HuffmanTree::build(&count_frequencies(symbols));
        let table = tree.code_table();
        let (bitstream, bits) = huffman::encode_symbols(&table, symbols)?;
        tracing::debug!(
            strategy = %strategy,
            symbols = symbols.len(),
            alphabet = table.len(),
            bits,
            "Packed symbol stream"
        );

        let (width, height, metadata) = match strategy {
            Strategy::RoundedBlockAverage => (volume.width(), volume.height(), Metadata::Implied),
            Strategy::PlainBlockAverage => (
                grid.width(),
                grid.height(),
                Metadata::Dimensions {
                    width: volume.width() as i32,
                    height: volume.height() as i32,
                },
            ),
            Strategy::OctreePalette => {
                let palette = palette.ok_or_else(|| {
                    CodecError::config("octree strategy produced no palette")
                })?;
                (volume.width(), volume.height(), Metadata::Palette(palette))
            }
        };

        Ok(Self {
            strategy,
            width: width as u32,
            height: height as u32,
            channels: volume.channels() as u32,
            tree,
            bitstream,
            metadata,
        })
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Dimensions stored in the record header.
    pub fn record_dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.channels)
    }

    #[inline]
    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    #[inline]
    pub fn bitstream(&self) -> &[u8] {
        &self.bitstream
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn palette(&self) -> Option<&Palette> {
        match &self.metadata {
            Metadata::Palette(palette) => Some(palette),
            _ => None,
        }
    }

    /// Dimensions of the volume decode produces.
    pub fn output_dimensions(&self) -> (usize, usize, usize) {
        let channels = self.channels as usize;
        match self.metadata {
            Metadata::Dimensions { width, height } => (width as usize, height as usize, channels),
            _ => (self.width as usize, self.height as usize, channels),
        }
    }

    /// Number of symbols the bitstream should hold.
    pub fn expected_symbols(&self) -> usize {
        let (width, height, channels) = self.output_dimensions();
        match self.strategy {
            Strategy::OctreePalette => width * height,
            _ => (width / 2) * (height / 2) * channels,
        }
    }

    /// Serialize to `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = WireWriter::new(writer);
        out.put_raw(&MAGIC)?;
        out.put_u8(FORMAT_VERSION)?;
        out.put_u8(self.strategy.tag())?;
        out.put_u32(self.width)?;
        out.put_u32(self.height)?;
        out.put_u32(self.channels)?;

        let record = self.tree.to_record();
        out.put_u32(record.leaf_count)?;
        out.put_u8(record.symbol_bits)?;
        out.put_block(&record.stream, "tree record")?;
        out.put_block(&self.bitstream, "bitstream")?;

        match &self.metadata {
            Metadata::Implied => {}
            Metadata::Dimensions { width, height } => {
                out.put_i32(*width)?;
                out.put_i32(*height)?;
            }
            Metadata::Palette(palette) => {
                out.put_u32(palette.len() as u32)?;
                for color in palette.colors() {
                    out.put_u32(color.to_argb())?;
                }
            }
        }
        Ok(())
    }

    /// Deserialize one artifact from `reader`, leaving anything after it
    /// unread.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        Self::read_counted(&mut WireReader::new(reader))
    }

    fn read_counted<R: Read>(input: &mut WireReader<R>) -> Result<Self> {
        let magic: [u8; 4] = input.array("magic")?;
        if magic != MAGIC {
            return Err(CodecError::malformed(format!(
                "bad magic {magic:02X?}, expected {MAGIC:02X?}"
            )));
        }
        let version = input.u8("version")?;
        if version != FORMAT_VERSION {
            return Err(CodecError::malformed(format!(
                "unsupported format version {version}"
            )));
        }
        let tag = input.u8("strategy")?;
        let strategy = Strategy::from_tag(tag)
            .ok_or_else(|| CodecError::malformed(format!("unknown strategy tag {tag}")))?;

        let width = input.u32("record width")?;
        let height = input.u32("record height")?;
        let channels = input.u32("record channels")?;

        let leaf_count = input.u32("leaf count")?;
        let symbol_bits = input.u8("symbol width")?;
        let stream = input.block("tree record")?;
        let tree = HuffmanTree::from_record(&TreeRecord {
            leaf_count,
            symbol_bits,
            stream,
        })?;
        let bitstream = input.block("bitstream")?;

        let metadata = match strategy {
            Strategy::RoundedBlockAverage => Metadata::Implied,
            Strategy::PlainBlockAverage => Metadata::Dimensions {
                width: input.i32("original width")?,
                height: input.i32("original height")?,
            },
            Strategy::OctreePalette => {
                let count = input.u32("palette size")? as usize;
                let raw = input.bytes(count.saturating_mul(4), "palette")?;
                let colors = raw
                    .chunks_exact(4)
                    .map(|c| Rgb::from_argb(u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
                    .collect();
                Metadata::Palette(Palette::new(colors))
            }
        };

        let artifact = Self {
            strategy,
            width,
            height,
            channels,
            tree,
            bitstream,
            metadata,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Serialize into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Deserialize from a buffer that holds exactly one artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut input = WireReader::new(bytes);
        let artifact = Self::read_counted(&mut input)?;
        let consumed = input.consumed() as usize;
        if consumed != bytes.len() {
            return Err(CodecError::malformed(format!(
                "{} trailing bytes after artifact",
                bytes.len() - consumed
            )));
        }
        Ok(artifact)
    }

    /// Cross-check header, tree and metadata.
    fn validate(&self) -> Result<()> {
        let channels = self.channels as usize;
        let (width, height) = match self.metadata {
            Metadata::Dimensions { width, height } => {
                if width < 0 || height < 0 {
                    return Err(CodecError::malformed(format!(
                        "negative original dimensions {width}x{height}"
                    )));
                }
                if (width / 2) as u32 != self.width || (height / 2) as u32 != self.height {
                    return Err(CodecError::malformed(format!(
                        "original dimensions {width}x{height} do not halve to record {}x{}",
                        self.width, self.height
                    )));
                }
                (width as usize, height as usize)
            }
            _ => (self.width as usize, self.height as usize),
        };

        let samples = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .filter(|&n| n <= MAX_DECODED_SAMPLES);
        if samples.is_none() {
            return Err(CodecError::malformed(format!(
                "dimensions {width}x{height}x{channels} exceed {MAX_DECODED_SAMPLES} samples"
            )));
        }

        let limit = match &self.metadata {
            Metadata::Palette(palette) => {
                if channels < 3 {
                    return Err(CodecError::malformed(format!(
                        "palette artifact with {channels} channel(s)"
                    )));
                }
                palette.len() as u64
            }
            _ => 256,
        };
        if let Some(symbol) = self
            .tree
            .symbols()
            .into_iter()
            .find(|&s| u64::from(s) >= limit)
        {
            return Err(CodecError::malformed(format!(
                "tree symbol {symbol} out of range (limit {limit})"
            )));
        }
        Ok(())
    }

    /// Summary for display.
    pub fn summary(&self) -> ArtifactSummary {
        let (width, height, channels) = self.output_dimensions();
        let code_lengths = self.tree.code_table().code_lengths();
        let average_code_length = if code_lengths.is_empty() {
            0.0
        } else {
            code_lengths.iter().map(|&(_, len)| len).sum::<usize>() as f64
                / code_lengths.len() as f64
        };
        let tree_bytes = self.tree.to_record().stream.len();
        let palette_size = self.palette().map(Palette::len);
        let metadata_bytes = match &self.metadata {
            Metadata::Implied => 0,
            Metadata::Dimensions { .. } => 8,
            Metadata::Palette(palette) => 4 + 4 * palette.len(),
        };
        // magic, version, strategy, 3 dims, leaf count, symbol bits, 2 lengths
        let header_bytes = 4 + 1 + 1 + 12 + 4 + 1 + 4 + 4;

        ArtifactSummary {
            strategy: self.strategy,
            width,
            height,
            channels,
            alphabet_size: code_lengths.len(),
            code_lengths,
            average_code_length,
            expected_symbols: self.expected_symbols(),
            tree_bytes,
            bitstream_bytes: self.bitstream.len(),
            palette_size,
            total_bytes: header_bytes + tree_bytes + self.bitstream.len() + metadata_bytes,
        }
    }
}
