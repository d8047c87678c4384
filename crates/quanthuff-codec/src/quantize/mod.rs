//! Color quantization strategies.
//!
//! A quantizer reduces a [`PixelVolume`] to a [`SymbolGrid`] over a small
//! alphabet, which the Huffman stage then entropy codes.
//!
//! # Strategies
//!
//! - **Rounded block average**: 2×2 block mean snapped to multiples of ten
//! - **Plain block average**: 2×2 block mean, truncated
//! - **Octree palette**: adaptive palette of at most `max_colors` entries
//!
//! All strategies implement the [`Quantizer`] trait; [`Strategy`] selects
//! one at runtime and is what an artifact records.

mod block;
mod octree;
mod options;
mod palette;

pub use block::{round_to_decile, BlockAverage, BlockRounding};
pub use octree::{ClassifyStats, ColorCube, OctreeQuantizer};
pub use options::{
    MatchMode, OctreeOptions, DEFAULT_MAX_COLORS, DEFAULT_MAX_NODES, MAX_TREE_DEPTH,
    MIN_MAX_NODES, MIN_TREE_DEPTH,
};
pub use palette::{Palette, Rgb};

pub(crate) use block::replicate;

use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::volume::{PixelVolume, SymbolGrid};

/// Output of a quantizer: the symbol grid plus a palette when the symbols
/// are palette indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantized {
    pub grid: SymbolGrid,
    pub palette: Option<Palette>,
}

/// Reduce a pixel volume to a symbol grid.
pub trait Quantizer {
    /// Quantize `volume`.
    ///
    /// Configuration problems are reported before any pixel is touched.
    fn quantize(&self, volume: &PixelVolume) -> Result<Quantized>;
}

/// Quantization strategy selection.
///
/// # Example
///
/// ```
/// use quanthuff_codec::Strategy;
///
/// let strategy: Strategy = "octree".parse().unwrap();
/// assert_eq!(strategy, Strategy::OctreePalette);
/// assert_eq!(strategy.to_string(), "octree");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// 2×2 block average rounded to a multiple of ten.
    RoundedBlockAverage,

    /// 2×2 block average without rounding. Dimensions travel as explicit
    /// metadata, so odd and asymmetric sizes are carried through.
    PlainBlockAverage,

    /// Adaptive octree palette; one palette index per pixel.
    #[default]
    OctreePalette,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::RoundedBlockAverage,
        Strategy::PlainBlockAverage,
        Strategy::OctreePalette,
    ];

    /// Tag byte written into artifacts.
    pub const fn tag(self) -> u8 {
        match self {
            Strategy::RoundedBlockAverage => 0,
            Strategy::PlainBlockAverage => 1,
            Strategy::OctreePalette => 2,
        }
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Strategy::RoundedBlockAverage),
            1 => Some(Strategy::PlainBlockAverage),
            2 => Some(Strategy::OctreePalette),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Strategy::RoundedBlockAverage => "rounded-block",
            Strategy::PlainBlockAverage => "plain-block",
            Strategy::OctreePalette => "octree",
        }
    }

    /// Whether symbols are raw channel values of 2×2 blocks.
    pub const fn is_block(self) -> bool {
        matches!(
            self,
            Strategy::RoundedBlockAverage | Strategy::PlainBlockAverage
        )
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{0}' (expected rounded-block, plain-block or octree)")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}
