//! Huffman tree construction and decode traversal.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use crate::bitpack::BitReader;

/// Symbol → occurrence count.
///
/// A `BTreeMap` keeps iteration in ascending symbol order, which is what makes
/// tree construction reproducible.
pub type Frequencies = BTreeMap<u32, u64>;

/// Count every symbol in `symbols`.
pub fn count_frequencies(symbols: &[u32]) -> Frequencies {
    let mut frequencies = Frequencies::new();
    for &symbol in symbols {
        *frequencies.entry(symbol).or_insert(0) += 1;
    }
    frequencies
}

/// A node in the tree arena.
///
/// Children are indices into the owning [`HuffmanTree`]; every internal node
/// has exactly two. Frequencies are only meaningful on trees built from
/// counts; deserialized trees carry zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf {
        symbol: u32,
        frequency: u64,
    },
    Internal {
        frequency: u64,
        left: usize,
        right: usize,
    },
}

impl HuffmanNode {
    #[inline]
    pub fn frequency(&self) -> u64 {
        match *self {
            HuffmanNode::Leaf { frequency, .. } | HuffmanNode::Internal { frequency, .. } => {
                frequency
            }
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }
}

/// A binary prefix-code tree stored as an arena of nodes.
///
/// An empty tree (no root) encodes an empty symbol stream. A tree whose root
/// is a leaf is the single-symbol case: that symbol has a zero-length code.
///
/// # Example
///
/// ```
/// use quanthuff_codec::huffman::{count_frequencies, HuffmanTree};
///
/// let symbols = [7, 7, 7, 3, 3, 9];
/// let tree = HuffmanTree::build(&count_frequencies(&symbols));
///
/// assert_eq!(tree.leaf_count(), 3);
/// let table = tree.code_table();
/// assert_eq!(table.code(7).map(|c| c.len()), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: Option<usize>,
}

impl HuffmanTree {
    /// Build a tree from symbol frequencies.
    ///
    /// Nodes are ordered by `(frequency, creation index)`. Leaves are created
    /// in ascending symbol order and each merged node gets the next index, so
    /// equal frequencies always resolve the same way. The first node extracted
    /// becomes the left (`0`) child.
    pub fn build(frequencies: &Frequencies) -> Self {
        let mut nodes = Vec::with_capacity(frequencies.len().saturating_mul(2));
        let mut heap = BinaryHeap::with_capacity(frequencies.len());

        for (&symbol, &frequency) in frequencies {
            let index = nodes.len();
            nodes.push(HuffmanNode::Leaf { symbol, frequency });
            heap.push(Reverse((frequency, index)));
        }

        while heap.len() > 1 {
            let (Some(Reverse((f1, left))), Some(Reverse((f2, right)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            let index = nodes.len();
            let frequency = f1 + f2;
            nodes.push(HuffmanNode::Internal {
                frequency,
                left,
                right,
            });
            heap.push(Reverse((frequency, index)));
        }

        let root = heap.pop().map(|Reverse((_, index))| index);
        tracing::debug!(symbols = frequencies.len(), nodes = nodes.len(), "Built Huffman tree");
        Self { nodes, root }
    }

    /// Assemble a tree from parts; the caller guarantees structural validity.
    pub(crate) fn from_parts(nodes: Vec<HuffmanNode>, root: Option<usize>) -> Self {
        Self { nodes, root }
    }

    #[inline]
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    #[inline]
    pub fn node(&self, index: usize) -> &HuffmanNode {
        &self.nodes[index]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of distinct symbols.
    pub fn leaf_count(&self) -> usize {
        self.reachable().filter(|&i| self.nodes[i].is_leaf()).count()
    }

    /// Every symbol the tree can emit, in preorder.
    pub fn symbols(&self) -> Vec<u32> {
        self.reachable()
            .filter_map(|i| match self.nodes[i] {
                HuffmanNode::Leaf { symbol, .. } => Some(symbol),
                HuffmanNode::Internal { .. } => None,
            })
            .collect()
    }

    /// Preorder walk of the reachable node indices.
    pub(crate) fn reachable(&self) -> impl Iterator<Item = usize> + '_ {
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        std::iter::from_fn(move || {
            let index = stack.pop()?;
            if let HuffmanNode::Internal { left, right, .. } = self.nodes[index] {
                stack.push(right);
                stack.push(left);
            }
            Some(index)
        })
    }

    /// Decode up to `expected` symbols from `reader`, handing each one to
    /// `emit` together with its position in the stream.
    ///
    /// Stops early, without error, when the bits run out in the middle of a
    /// code. A leaf root consumes no bits and always yields `expected`
    /// symbols. Returns the number of symbols emitted.
    pub fn decode_into<F>(&self, reader: &mut BitReader<'_>, expected: usize, mut emit: F) -> usize
    where
        F: FnMut(usize, u32),
    {
        let Some(root) = self.root else {
            return 0;
        };

        for position in 0..expected {
            let mut current = root;
            loop {
                match self.nodes[current] {
                    HuffmanNode::Leaf { symbol, .. } => {
                        emit(position, symbol);
                        break;
                    }
                    HuffmanNode::Internal { left, right, .. } => match reader.read_bit() {
                        Some(false) => current = left,
                        Some(true) => current = right,
                        None => return position,
                    },
                }
            }
        }
        expected
    }

    /// Convenience wrapper over [`decode_into`](Self::decode_into) that
    /// collects the symbols.
    pub fn decode(&self, bytes: &[u8], expected: usize) -> Vec<u32> {
        let mut out = Vec::with_capacity(expected);
        let mut reader = BitReader::new(bytes);
        self.decode_into(&mut reader, expected, |_, symbol| out.push(symbol));
        out
    }
}
