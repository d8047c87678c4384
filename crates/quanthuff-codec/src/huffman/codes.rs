//! Symbol → prefix code lookup.

use std::collections::HashMap;

use super::tree::{HuffmanNode, HuffmanTree};

/// Prefix codes derived from a [`HuffmanTree`].
///
/// A code is the sequence of branch labels from the root to the symbol's
/// leaf, `false` for the left slot and `true` for the right. The single-symbol
/// tree maps its symbol to the empty code.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    codes: HashMap<u32, Vec<bool>>,
}

impl CodeTable {
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = HashMap::new();
        let Some(root) = tree.root() else {
            return Self { codes };
        };

        let mut stack = vec![(root, Vec::new())];
        while let Some((index, prefix)) = stack.pop() {
            match *tree.node(index) {
                HuffmanNode::Leaf { symbol, .. } => {
                    codes.insert(symbol, prefix);
                }
                HuffmanNode::Internal { left, right, .. } => {
                    let mut right_code = prefix.clone();
                    right_code.push(true);
                    let mut left_code = prefix;
                    left_code.push(false);
                    stack.push((right, right_code));
                    stack.push((left, left_code));
                }
            }
        }
        Self { codes }
    }

    #[inline]
    pub fn code(&self, symbol: u32) -> Option<&[bool]> {
        self.codes.get(&symbol).map(Vec::as_slice)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// `(symbol, code length)` pairs sorted by symbol.
    pub fn code_lengths(&self) -> Vec<(u32, usize)> {
        let mut lengths: Vec<(u32, usize)> = self
            .codes
            .iter()
            .map(|(&symbol, code)| (symbol, code.len()))
            .collect();
        lengths.sort_unstable();
        lengths
    }

    /// Total encoded size in bits of a stream with the given symbols.
    pub fn encoded_bits(&self, symbols: &[u32]) -> usize {
        symbols
            .iter()
            .map(|s| self.codes.get(s).map_or(0, Vec::len))
            .sum()
    }
}

impl HuffmanTree {
    /// Derive the symbol → code table for this tree.
    pub fn code_table(&self) -> CodeTable {
        CodeTable::from_tree(self)
    }
}
