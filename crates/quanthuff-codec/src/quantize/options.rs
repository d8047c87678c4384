//! Octree quantizer options.
//!
//! This module provides [`OctreeOptions`] for configuring palette size,
//! pixel-to-palette matching and the classification memory ceiling.

use crate::error::{CodecError, Result};

/// Palette size used when nothing else is configured.
pub const DEFAULT_MAX_COLORS: usize = 126;

/// Live-node ceiling during classification.
pub const DEFAULT_MAX_NODES: usize = 266_817;

/// Smallest ceiling accepted. A depth-1 tree holds at most eight nodes, and
/// level pruning has to be able to make room for one more pixel walk.
pub const MIN_MAX_NODES: usize = 16;

/// Deepest tree level the quantizer will build.
pub const MAX_TREE_DEPTH: u8 = 8;

/// Shallowest starting depth.
pub const MIN_TREE_DEPTH: u8 = 2;

/// How pixels are mapped to palette entries after reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Follow the pixel's octant path and take the palette entry of the last
    /// node on it. Fast; not guaranteed to be the nearest color.
    #[default]
    Quick,
    /// Search every palette entry under the dead-end node's parent for the
    /// minimum squared RGB distance.
    Exact,
}

/// Configuration for the octree quantizer.
///
/// # Defaults
///
/// - `max_colors`: 126
/// - `match_mode`: [`MatchMode::Quick`]
/// - `max_nodes`: 266 817
///
/// # Example
///
/// ```
/// use quanthuff_codec::{MatchMode, OctreeOptions};
///
/// let options = OctreeOptions::new()
///     .max_colors(16)
///     .match_mode(MatchMode::Exact);
///
/// assert!(options.validate().is_ok());
/// assert_eq!(options.depth(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctreeOptions {
    /// Upper bound on palette entries. Must be at least 1.
    pub max_colors: usize,

    /// Pixel-to-palette mapping policy.
    pub match_mode: MatchMode,

    /// Ceiling on live (non-root) tree nodes during classification. When the
    /// next pixel could cross it, the deepest level is folded into its parents.
    pub max_nodes: usize,
}

impl Default for OctreeOptions {
    fn default() -> Self {
        Self {
            max_colors: DEFAULT_MAX_COLORS,
            match_mode: MatchMode::Quick,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl OctreeOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn max_colors(mut self, max_colors: usize) -> Self {
        self.max_colors = max_colors;
        self
    }

    #[inline]
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    #[inline]
    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Reject configurations the quantizer cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_colors < 1 {
            return Err(CodecError::config("max_colors must be at least 1"));
        }
        if self.max_colors > u32::MAX as usize {
            return Err(CodecError::config("max_colors does not fit a palette index"));
        }
        if self.max_nodes < MIN_MAX_NODES {
            return Err(CodecError::config(format!(
                "max_nodes must be at least {MIN_MAX_NODES}, got {}",
                self.max_nodes
            )));
        }
        Ok(())
    }

    /// Starting tree depth: the smallest `d` with `4^d >= max_colors`,
    /// clamped to `2..=8`.
    pub fn depth(&self) -> u8 {
        let mut depth = 0u8;
        let mut capacity = 1usize;
        while capacity < self.max_colors && depth < MAX_TREE_DEPTH {
            capacity = capacity.saturating_mul(4);
            depth += 1;
        }
        depth.clamp(MIN_TREE_DEPTH, MAX_TREE_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let opts = OctreeOptions::default();
        assert_eq!(opts.max_colors, 126);
        assert_eq!(opts.match_mode, MatchMode::Quick);
        assert_eq!(opts.max_nodes, 266_817);
    }

    #[test]
    fn test_builder_chain() {
        let opts = OctreeOptions::new()
            .max_colors(8)
            .match_mode(MatchMode::Exact)
            .max_nodes(1000);
        assert_eq!(opts.max_colors, 8);
        assert_eq!(opts.match_mode, MatchMode::Exact);
        assert_eq!(opts.max_nodes, 1000);
    }

    #[test]
    fn test_depth_selection() {
        let depth = |n| OctreeOptions::new().max_colors(n).depth();
        assert_eq!(depth(1), 2);
        assert_eq!(depth(16), 2);
        assert_eq!(depth(17), 3);
        assert_eq!(depth(64), 3);
        assert_eq!(depth(65), 4);
        assert_eq!(depth(126), 4);
        assert_eq!(depth(256), 4);
        assert_eq!(depth(257), 5);
        assert_eq!(depth(usize::MAX), 8);
    }

    #[test]
    fn test_zero_colors_rejected() {
        let err = OctreeOptions::new().max_colors(0).validate().unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedQuantizerConfig(_)));
    }

    #[test]
    fn test_tiny_node_ceiling_rejected() {
        let err = OctreeOptions::new().max_nodes(3).validate().unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedQuantizerConfig(_)));
    }

    #[test]
    fn test_minimum_node_ceiling_accepted() {
        assert!(OctreeOptions::new()
            .max_nodes(MIN_MAX_NODES)
            .validate()
            .is_ok());
    }
}
