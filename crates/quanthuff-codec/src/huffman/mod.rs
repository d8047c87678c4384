//! Huffman entropy coding.
//!
//! The pipeline is: [`count_frequencies`] over a symbol stream, build a
//! [`HuffmanTree`], derive a [`CodeTable`], pack codes with
//! [`crate::bitpack`], and on the way back walk the tree bit by bit with
//! [`HuffmanTree::decode_into`].
//!
//! # Tie-breaking
//!
//! Equal frequencies are ordered by node creation index: leaves in ascending
//! symbol order, then merged nodes in the order they are formed. Two encodes
//! of the same input therefore produce the same tree and the same bytes.

mod codes;
mod serialize;
mod tree;

pub use codes::CodeTable;
pub use serialize::{symbol_width, TreeRecord};
pub use tree::{count_frequencies, Frequencies, HuffmanNode, HuffmanTree};

use crate::bitpack::BitWriter;
use crate::error::{CodecError, Result};

/// Encode `symbols` with `table`, returning the packed bytes and the number
/// of meaningful bits.
///
/// A symbol without an entry in the table is an error; nothing is skipped.
pub fn encode_symbols(table: &CodeTable, symbols: &[u32]) -> Result<(Vec<u8>, usize)> {
    let mut writer = BitWriter::new();
    for (position, &symbol) in symbols.iter().enumerate() {
        let code = table
            .code(symbol)
            .ok_or(CodecError::UncodedSymbol { symbol, position })?;
        writer.write_code(code);
    }
    let bits = writer.bit_len();
    Ok((writer.finish(), bits))
}
