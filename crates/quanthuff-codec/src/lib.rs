//! quanthuff-codec: lossy image compression by color quantization and
//! Huffman coding.
//!
//! An RGB [`PixelVolume`] is reduced to a small symbol alphabet, the symbols
//! are Huffman coded and packed into bytes, and the result is stored with its
//! tree and metadata in a versioned binary [`Artifact`]. Decoding walks the
//! same path backwards and yields an approximate volume.
//!
//! # Quick Start
//!
//! ```
//! use quanthuff_codec::{Artifact, Codec, PixelVolume, Strategy};
//!
//! let mut volume = PixelVolume::new(4, 4, 3);
//! for x in 0..4 {
//!     for y in 0..4 {
//!         volume.set_pixel(x, y, &[(x * 60) as u8, (y * 60) as u8, 90]);
//!     }
//! }
//!
//! let bytes = Codec::new(Strategy::RoundedBlockAverage)
//!     .compress(&volume)
//!     .unwrap()
//!     .to_bytes()
//!     .unwrap();
//!
//! let artifact = Artifact::from_bytes(&bytes).unwrap();
//! let decoded = Codec::decompress(&artifact).unwrap();
//! assert_eq!(decoded.volume.width(), 4);
//! ```
//!
//! # Strategies
//!
//! Three quantizers are available via [`Strategy`]:
//!
//! - Rounded block average: each 2×2 block becomes one cell whose channels
//!   are snapped to multiples of ten
//! - Plain block average: the same without rounding, original dimensions kept
//!   as metadata
//! - Octree palette (default): an adaptive color cube reduced to at most
//!   `max_colors` entries, one palette index per pixel
//!
//! # Decoding Without a Length Field
//!
//! The bitstream does not say how many symbols it holds. The decoder derives
//! the count from the artifact's dimensions and stops there, or earlier if
//! the bytes run out; in that case [`Decoded`] reports how far it got and the
//! rest of the volume stays black.
//!
//! # Lower Layers
//!
//! [`huffman`] and [`bitpack`] are public for callers that want to entropy
//! code their own symbol streams:
//!
//! ```
//! use quanthuff_codec::bitpack::BitWriter;
//! use quanthuff_codec::huffman::{count_frequencies, encode_symbols, HuffmanTree};
//!
//! let symbols = [3, 3, 3, 1, 2];
//! let tree = HuffmanTree::build(&count_frequencies(&symbols));
//! let (bytes, bits) = encode_symbols(&tree.code_table(), &symbols).unwrap();
//! assert_eq!(tree.decode(&bytes, symbols.len()), symbols);
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! assert_eq!(writer.finish(), vec![0b1010_0000]);
//! # let _ = bits;
//! ```

pub mod api;
pub mod bitpack;
pub mod container;
pub mod error;
pub mod huffman;
pub mod quantize;
pub mod volume;


pub use api::Codec;
pub use container::{Artifact, ArtifactSummary, Decoded, Metadata};
pub use error::{CodecError, Result};
pub use quantize::{
    ClassifyStats, ColorCube, MatchMode, OctreeOptions, Palette, ParseStrategyError, Rgb, Strategy,
};
pub use volume::{PixelVolume, SymbolGrid};
