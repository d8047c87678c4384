//! Pixel and symbol containers.
//!
//! [`PixelVolume`] is the encoder input and decoder output; [`SymbolGrid`]
//! is what a quantizer hands to the Huffman stage.

mod pixel_volume;
mod symbol_grid;

pub use pixel_volume::PixelVolume;
pub use symbol_grid::SymbolGrid;
