//! Preorder tag-stream encoding of a [`HuffmanTree`].
//!
//! Each node is one tag bit: `1` for a leaf, followed by the symbol in
//! `symbol_bits` bits, or `0` for an internal node, followed by its left and
//! right subtrees. Frequencies are not stored.

use super::tree::{HuffmanNode, HuffmanTree};
use crate::bitpack::{BitReader, BitWriter};
use crate::error::{CodecError, Result};

/// A packed tree plus the header fields needed to parse it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRecord {
    pub leaf_count: u32,
    pub symbol_bits: u8,
    pub stream: Vec<u8>,
}

/// Bits needed to store `max_symbol`, never less than one.
pub fn symbol_width(max_symbol: u32) -> u8 {
    (32 - max_symbol.leading_zeros()).max(1) as u8
}

impl HuffmanTree {
    /// Pack the tree into a preorder tag stream.
    pub fn to_record(&self) -> TreeRecord {
        let symbols = self.symbols();
        let symbol_bits = symbol_width(symbols.iter().copied().max().unwrap_or(0));
        let mut writer = BitWriter::new();

        for index in self.reachable() {
            match *self.node(index) {
                HuffmanNode::Leaf { symbol, .. } => {
                    writer.write_bit(true);
                    writer.write_bits(symbol, symbol_bits);
                }
                HuffmanNode::Internal { .. } => writer.write_bit(false),
            }
        }

        TreeRecord {
            leaf_count: symbols.len() as u32,
            symbol_bits,
            stream: writer.finish(),
        }
    }

    /// Rebuild a tree from its packed record.
    ///
    /// Parsing is iterative, so a hostile record cannot overflow the stack,
    /// and it is bounded by the `2 * leaf_count - 1` nodes a full binary tree
    /// with that many leaves has.
    pub fn from_record(record: &TreeRecord) -> Result<Self> {
        if record.leaf_count == 0 {
            return Ok(Self::default());
        }
        if record.symbol_bits == 0 || record.symbol_bits > 32 {
            return Err(CodecError::malformed(format!(
                "tree symbol width {} outside 1..=32",
                record.symbol_bits
            )));
        }

        let leaf_count = record.leaf_count as usize;
        let max_nodes = leaf_count.saturating_mul(2) - 1;
        let mut reader = BitReader::new(&record.stream);
        let mut nodes: Vec<HuffmanNode> = Vec::with_capacity(max_nodes.min(1 << 16));
        // Internal nodes still waiting for their right child.
        let mut open: Vec<usize> = Vec::new();
        let mut leaves = 0usize;

        loop {
            if nodes.len() == max_nodes {
                return Err(CodecError::malformed("tree has more nodes than its leaves allow"));
            }
            let is_leaf = reader
                .read_bit()
                .ok_or_else(|| CodecError::malformed("tree record ends mid-tree"))?;

            let index = nodes.len();
            if is_leaf {
                let symbol = reader
                    .read_bits(record.symbol_bits)
                    .ok_or_else(|| CodecError::malformed("tree record ends inside a symbol"))?;
                nodes.push(HuffmanNode::Leaf {
                    symbol,
                    frequency: 0,
                });
                leaves += 1;
            } else {
                nodes.push(HuffmanNode::Internal {
                    frequency: 0,
                    left: usize::MAX,
                    right: usize::MAX,
                });
            }

            if let Some(&parent) = open.last() {
                if let HuffmanNode::Internal { left, right, .. } = &mut nodes[parent] {
                    if *left == usize::MAX {
                        *left = index;
                    } else {
                        *right = index;
                        open.pop();
                    }
                }
            }

            if !is_leaf {
                open.push(index);
            }
            if open.is_empty() {
                break;
            }
        }

        if leaves != leaf_count {
            return Err(CodecError::malformed(format!(
                "tree declares {leaf_count} leaves but contains {leaves}"
            )));
        }
        Ok(Self::from_parts(nodes, Some(0)))
    }
}
