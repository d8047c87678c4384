//! Adaptive octree color quantization.
//!
//! RGB space is recursively split into octants. Every pixel is classified
//! down to the tree depth, the tree is then pruned by a rising weight
//! threshold until few enough nodes carry colors, and the survivors become
//! the palette.
//!
//! ```text
//!  classify   ──>  reduce (threshold loop)  ──>  colormap  ──>  assign
//!  lazily grow     fold light nodes into        post-order      octant walk
//!  to `depth`      parents until colors <=      average color   per pixel
//!                  max_colors                   per node
//! ```
//!
//! Nodes live in an arena and refer to each other by index. The root is
//! index 0 and is its own parent.

use super::options::{MatchMode, OctreeOptions, MAX_TREE_DEPTH};
use super::palette::{Palette, Rgb};
use super::{Quantized, Quantizer};
use crate::error::{CodecError, Result};
use crate::volume::{PixelVolume, SymbolGrid};

const ROOT: usize = 0;

const MAX_RGB: i32 = 255;

/// `SQUARES[d + 255] == d * d` for `d` in `-255..=255`.
const SQUARES: [u32; (2 * MAX_RGB + 1) as usize] = {
    let mut table = [0u32; (2 * MAX_RGB + 1) as usize];
    let mut i = 0;
    while i < table.len() {
        let d = i as i32 - MAX_RGB;
        table[i] = (d * d) as u32;
        i += 1;
    }
    table
};

/// Weight added to `number_pixels` of a node at each level per visiting pixel.
const LEVEL_WEIGHT: [u64; MAX_TREE_DEPTH as usize + 1] = {
    let mut table = [0u64; MAX_TREE_DEPTH as usize + 1];
    let mut level = 0;
    while level < table.len() {
        table[level] = 1 << (15 - level);
        level += 1;
    }
    table
};

#[derive(Debug, Clone)]
struct Node {
    parent: usize,
    children: [Option<u32>; 8],
    /// Octant slot within the parent.
    id: u8,
    level: u8,
    mid: [i32; 3],
    /// Level-weighted count of pixels that passed through this node.
    number_pixels: u64,
    /// Pixels whose color sums are held here (classified here or folded in).
    unique: u64,
    totals: [u64; 3],
    color_number: Option<u32>,
}

impl Node {
    fn root() -> Self {
        let mid = (MAX_RGB + 1) >> 1;
        Self {
            parent: ROOT,
            children: [None; 8],
            id: 0,
            level: 0,
            mid: [mid; 3],
            number_pixels: u64::MAX,
            unique: 0,
            totals: [0; 3],
            color_number: None,
        }
    }

    fn child(parent_index: usize, parent: &Node, id: u8, level: u8) -> Self {
        let half = (1i32 << (MAX_TREE_DEPTH - level)) >> 1;
        let offset = |bit: u8| if id & bit != 0 { half } else { -half };
        Self {
            parent: parent_index,
            children: [None; 8],
            id,
            level,
            mid: [
                parent.mid[0] + offset(1),
                parent.mid[1] + offset(2),
                parent.mid[2] + offset(4),
            ],
            number_pixels: 0,
            unique: 0,
            totals: [0; 3],
            color_number: None,
        }
    }

    /// Octant of `rgb` relative to this node's midpoint.
    #[inline]
    fn octant(&self, [r, g, b]: [u8; 3]) -> u8 {
        (r as i32 > self.mid[0]) as u8
            | ((g as i32 > self.mid[1]) as u8) << 1
            | ((b as i32 > self.mid[2]) as u8) << 2
    }
}

/// Counters describing one quantization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    /// Highest live node count observed during classification.
    pub peak_nodes: usize,
    /// Times the deepest level was folded to respect the node ceiling.
    pub level_prunes: usize,
    /// Tree depth after classification.
    pub final_depth: u8,
    /// Threshold passes run by the reduction.
    pub reduction_passes: usize,
}

/// The octree over RGB space for a single quantization run.
///
/// # Example
///
/// ```
/// use quanthuff_codec::{ColorCube, OctreeOptions, PixelVolume};
///
/// let mut volume = PixelVolume::new(2, 1, 3);
/// volume.set_pixel(0, 0, &[255, 0, 0]);
/// volume.set_pixel(1, 0, &[0, 0, 255]);
///
/// let mut cube = ColorCube::new(&OctreeOptions::new().max_colors(1)).unwrap();
/// cube.classify(&volume).unwrap();
/// cube.reduce();
/// let palette = cube.build_palette();
/// let indices = cube.assign(&volume, &palette).unwrap();
///
/// assert_eq!(palette.len(), 1);
/// assert_eq!(indices, vec![0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct ColorCube {
    nodes: Vec<Node>,
    free: Vec<usize>,
    /// Live nodes, root excluded.
    live: usize,
    depth: u8,
    max_colors: usize,
    max_nodes: usize,
    match_mode: MatchMode,
    /// Nodes with `unique > 0`, as of the last count.
    colors: usize,
    stats: ClassifyStats,
}

impl ColorCube {
    /// Create an empty cube after validating `options`.
    pub fn new(options: &OctreeOptions) -> Result<Self> {
        options.validate()?;
        let depth = options.depth();
        tracing::debug!(max_colors = options.max_colors, depth, "Selected octree depth");
        Ok(Self {
            nodes: vec![Node::root()],
            free: Vec::new(),
            live: 0,
            depth,
            max_colors: options.max_colors,
            max_nodes: options.max_nodes,
            match_mode: options.match_mode,
            colors: 0,
            stats: ClassifyStats {
                final_depth: depth,
                ..ClassifyStats::default()
            },
        })
    }

    #[inline]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Live nodes, root excluded.
    #[inline]
    pub fn live_nodes(&self) -> usize {
        self.live
    }

    /// Nodes currently holding color statistics.
    pub fn colors(&self) -> usize {
        self.color_nodes()
    }

    #[inline]
    pub fn stats(&self) -> ClassifyStats {
        self.stats
    }

    /// Walk every pixel down to the current depth, growing the tree.
    ///
    /// Before each walk, if it could push the live node count past the
    /// ceiling, the deepest level is folded into its parents and the depth
    /// shrinks by one.
    ///
    /// Volumes with fewer than three channels are rejected.
    pub fn classify(&mut self, volume: &PixelVolume) -> Result<()> {
        require_rgb(volume)?;
        for x in 0..volume.width() {
            for y in 0..volume.height() {
                while self.live + (self.depth as usize) > self.max_nodes && self.depth > 1 {
                    self.prune_level(ROOT);
                    self.depth -= 1;
                    self.stats.level_prunes += 1;
                    tracing::debug!(
                        depth = self.depth,
                        live = self.live,
                        "Node ceiling reached, pruned deepest level"
                    );
                }
                self.insert(volume.rgb(x, y));
            }
        }
        self.stats.final_depth = self.depth;
        Ok(())
    }

    fn insert(&mut self, rgb: [u8; 3]) {
        let mut index = ROOT;
        for level in 1..=self.depth {
            let id = self.nodes[index].octant(rgb);
            let existing = self.nodes[index].children[id as usize];
            index = match existing {
                Some(child) => child as usize,
                None => self.add_child(index, id, level),
            };
            self.nodes[index].number_pixels += LEVEL_WEIGHT[level as usize];
        }

        let node = &mut self.nodes[index];
        node.unique += 1;
        node.totals[0] += rgb[0] as u64;
        node.totals[1] += rgb[1] as u64;
        node.totals[2] += rgb[2] as u64;
    }

    fn add_child(&mut self, parent: usize, id: u8, level: u8) -> usize {
        let node = Node::child(parent, &self.nodes[parent], id, level);
        let index = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        let parent_node = &mut self.nodes[parent];
        parent_node.children[id as usize] = Some(index as u32);

        self.live += 1;
        self.stats.peak_nodes = self.stats.peak_nodes.max(self.live);
        index
    }

    /// Detach `index` from its parent, folding its color sums upward.
    fn prune_child(&mut self, index: usize) {
        debug_assert_ne!(index, ROOT);
        // Fold any remaining descendants first so their sums are not lost.
        for child in self.nodes[index].children.into_iter().flatten() {
            self.prune_child(child as usize);
        }

        let node = &self.nodes[index];
        let (parent, id, unique, totals) = (node.parent, node.id, node.unique, node.totals);
        let parent_node = &mut self.nodes[parent];
        parent_node.unique += unique;
        for (sum, add) in parent_node.totals.iter_mut().zip(totals) {
            *sum += add;
        }
        parent_node.children[id as usize] = None;

        self.live -= 1;
        self.free.push(index);
    }

    fn prune_level(&mut self, index: usize) {
        for child in self.nodes[index].children.into_iter().flatten() {
            self.prune_level(child as usize);
        }
        if index != ROOT && self.nodes[index].level == self.depth {
            self.prune_child(index);
        }
    }

    fn color_nodes(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.unique > 0 {
                count += 1;
            }
            stack.extend(node.children.iter().flatten().map(|&c| c as usize));
        }
        count
    }

    /// Prune by a rising threshold until at most `max_colors` nodes hold
    /// colors.
    ///
    /// Each pass removes every non-root node with `number_pixels <= threshold`
    /// and returns the smallest weight among the survivors, which becomes the
    /// next threshold.
    pub fn reduce(&mut self) {
        self.colors = self.color_nodes();
        let mut threshold = 0u64;
        while self.colors > self.max_colors {
            self.colors = 0;
            threshold = self.reduce_pass(ROOT, threshold, u64::MAX);
            self.stats.reduction_passes += 1;
            tracing::debug!(threshold, colors = self.colors, "Reduction pass");
        }
    }

    fn reduce_pass(&mut self, index: usize, threshold: u64, mut next: u64) -> u64 {
        for child in self.nodes[index].children.into_iter().flatten() {
            next = self.reduce_pass(child as usize, threshold, next);
        }

        let node = &self.nodes[index];
        if index != ROOT && node.number_pixels <= threshold {
            self.prune_child(index);
        } else {
            if node.unique > 0 {
                self.colors += 1;
            }
            next = next.min(node.number_pixels);
        }
        next
    }

    /// Assign palette entries in post-order to every node holding colors.
    ///
    /// Each entry is the rounded average `(sum + unique / 2) / unique`.
    pub fn build_palette(&mut self) -> Palette {
        let mut palette = Palette::default();
        self.colormap(ROOT, &mut palette);
        self.colors = palette.len();
        tracing::debug!(colors = palette.len(), "Built octree palette");
        palette
    }

    fn colormap(&mut self, index: usize, palette: &mut Palette) {
        for child in self.nodes[index].children.into_iter().flatten() {
            self.colormap(child as usize, palette);
        }

        let node = &mut self.nodes[index];
        if node.unique > 0 {
            let unique = node.unique;
            let avg = |total: u64| ((total + unique / 2) / unique) as u8;
            let color = Rgb::new(avg(node.totals[0]), avg(node.totals[1]), avg(node.totals[2]));
            node.color_number = Some(palette.push(color));
        } else {
            node.color_number = None;
        }
    }

    /// Palette index for every pixel, in `x`-outer, `y`-inner order.
    ///
    /// Must run after [`build_palette`](Self::build_palette).
    pub fn assign(&self, volume: &PixelVolume, palette: &Palette) -> Result<Vec<u32>> {
        require_rgb(volume)?;
        let mut indices = Vec::with_capacity(volume.pixel_count());
        for x in 0..volume.width() {
            for y in 0..volume.height() {
                indices.push(self.lookup(volume.rgb(x, y), palette));
            }
        }
        Ok(indices)
    }

    fn lookup(&self, rgb: [u8; 3], palette: &Palette) -> u32 {
        let mut index = ROOT;
        loop {
            let node = &self.nodes[index];
            match node.children[node.octant(rgb) as usize] {
                Some(child) => index = child as usize,
                None => break,
            }
        }

        let node = &self.nodes[index];
        match (self.match_mode, node.color_number) {
            (MatchMode::Quick, Some(color_number)) => color_number,
            (MatchMode::Exact, _) => self
                .closest(node.parent, rgb, palette)
                .or_else(|| self.closest(ROOT, rgb, palette))
                .unwrap_or(0),
            (MatchMode::Quick, None) => self.closest(ROOT, rgb, palette).unwrap_or(0),
        }
    }

    /// Nearest palette entry among the colored nodes under `start`.
    fn closest(&self, start: usize, rgb: [u8; 3], palette: &Palette) -> Option<u32> {
        let mut best: Option<(u32, u32)> = None;
        let mut stack = vec![start];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            stack.extend(node.children.iter().flatten().map(|&c| c as usize));

            let Some(color_number) = node.color_number else {
                continue;
            };
            let Some(color) = palette.get(color_number as usize) else {
                continue;
            };
            let distance = distance(color, rgb);
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, color_number));
            }
        }
        best.map(|(_, color_number)| color_number)
    }
}

fn require_rgb(volume: &PixelVolume) -> Result<()> {
    if volume.channels() < 3 {
        return Err(CodecError::config(format!(
            "octree quantization needs RGB input, got {} channel(s)",
            volume.channels()
        )));
    }
    Ok(())
}

#[inline]
fn distance(color: Rgb, [r, g, b]: [u8; 3]) -> u32 {
    let square = |a: u8, b: u8| SQUARES[(a as i32 - b as i32 + MAX_RGB) as usize];
    square(color.r, r) + square(color.g, g) + square(color.b, b)
}

/// Palette quantizer backed by a [`ColorCube`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OctreeQuantizer {
    options: OctreeOptions,
}

impl OctreeQuantizer {
    pub fn new(options: OctreeOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &OctreeOptions {
        &self.options
    }
}

impl Quantizer for OctreeQuantizer {
    fn quantize(&self, volume: &PixelVolume) -> Result<Quantized> {
        let mut cube = ColorCube::new(&self.options)?;
        cube.classify(volume)?;
        cube.reduce();
        let palette = cube.build_palette();
        let indices = cube.assign(volume, &palette)?;

        Ok(Quantized {
            grid: SymbolGrid::new(volume.width(), volume.height(), 1, indices),
            palette: Some(palette),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume_from(colors: &[[u8; 3]]) -> PixelVolume {
        let mut volume = PixelVolume::new(colors.len(), 1, 3);
        for (x, color) in colors.iter().enumerate() {
            volume.set_pixel(x, 0, color);
        }
        volume
    }

    fn run(volume: &PixelVolume, options: OctreeOptions) -> (Palette, Vec<u32>, ColorCube) {
        let mut cube = ColorCube::new(&options).unwrap();
        cube.classify(volume).unwrap();
        cube.reduce();
        let palette = cube.build_palette();
        let indices = cube.assign(volume, &palette).unwrap();
        (palette, indices, cube)
    }

    #[test]
    fn test_lookup_tables() {
        assert_eq!(SQUARES[0], 255 * 255);
        assert_eq!(SQUARES[255], 0);
        assert_eq!(SQUARES[256], 1);
        assert_eq!(LEVEL_WEIGHT[0], 1 << 15);
        assert_eq!(LEVEL_WEIGHT[8], 1 << 7);
    }

    #[test]
    fn test_child_midpoints() {
        let root = Node::root();
        assert_eq!(root.mid, [128, 128, 128]);
        let child = Node::child(ROOT, &root, 0b101, 1);
        assert_eq!(child.mid, [192, 64, 192]);
        let grandchild = Node::child(1, &child, 0b010, 2);
        assert_eq!(grandchild.mid, [160, 96, 160]);
    }

    #[test]
    fn test_octant_uses_strict_greater() {
        let root = Node::root();
        assert_eq!(root.octant([128, 128, 128]), 0);
        assert_eq!(root.octant([129, 0, 0]), 0b001);
        assert_eq!(root.octant([0, 129, 0]), 0b010);
        assert_eq!(root.octant([0, 0, 129]), 0b100);
    }

    #[test]
    fn test_single_color_image() {
        let volume = volume_from(&[[10, 20, 30]; 6]);
        let (palette, indices, _) = run(&volume, OctreeOptions::new());
        assert_eq!(palette.colors(), &[Rgb::new(10, 20, 30)]);
        assert!(indices.iter().all(|&i| i == 0));
    }

    #[test]
    fn test_one_color_palette() {
        let colors = [[0, 0, 0], [255, 255, 255], [255, 0, 0], [0, 0, 255]];
        let volume = volume_from(&colors);
        let (palette, indices, cube) = run(&volume, OctreeOptions::new().max_colors(1));
        assert_eq!(palette.len(), 1);
        assert!(indices.iter().all(|&i| i == 0));
        assert_eq!(cube.colors(), 1);
        // Everything folded into the root: average of the four colors.
        assert_eq!(palette.get(0), Some(Rgb::new(128, 64, 128)));
    }

    #[test]
    fn test_distinct_far_colors_survive() {
        let colors = [[0, 0, 0], [255, 255, 255], [255, 0, 0], [0, 0, 255]];
        let volume = volume_from(&colors);
        let (palette, indices, _) = run(&volume, OctreeOptions::new().max_colors(8));
        assert_eq!(palette.len(), 4);
        for (x, color) in colors.iter().enumerate() {
            assert_eq!(palette.get(indices[x] as usize).unwrap().to_array(), *color);
        }
    }

    #[test]
    fn test_reduction_respects_max_colors() {
        let colors: Vec<[u8; 3]> = (0..=255u8)
            .step_by(5)
            .map(|v| [v, 255 - v, v / 2])
            .collect();
        let volume = volume_from(&colors);
        for max_colors in [1, 2, 3, 5, 10, 20] {
            let (palette, indices, cube) = run(&volume, OctreeOptions::new().max_colors(max_colors));
            assert!(palette.len() <= max_colors, "{} > {max_colors}", palette.len());
            assert!(!palette.is_empty());
            assert!(indices.iter().all(|&i| (i as usize) < palette.len()));
            assert_eq!(cube.colors(), palette.len());
        }
    }

    #[test]
    fn test_node_ceiling_prunes_before_exceeding() {
        let mut volume = PixelVolume::new(32, 32, 3);
        for x in 0..32 {
            for y in 0..32 {
                volume.set_pixel(x, y, &[(x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8]);
            }
        }
        let options = OctreeOptions::new().max_colors(4096).max_nodes(40);
        let (palette, _, cube) = run(&volume, options);
        let stats = cube.stats();
        assert!(stats.peak_nodes <= 40, "peak {} over ceiling", stats.peak_nodes);
        assert!(stats.level_prunes > 0);
        assert!(stats.final_depth < 8);
        assert!(palette.len() <= 4096);
    }

    #[test]
    fn test_exact_mode_finds_nearest_in_subtree() {
        let colors = [[10, 10, 10], [12, 12, 12], [240, 240, 240], [250, 250, 250]];
        let volume = volume_from(&colors);
        let options = OctreeOptions::new().max_colors(2).match_mode(MatchMode::Exact);
        let (palette, indices, _) = run(&volume, options);
        assert!(palette.len() <= 2);
        let dark = palette.get(indices[0] as usize).unwrap();
        let light = palette.get(indices[3] as usize).unwrap();
        assert!(dark.r < 128);
        assert!(light.r > 128);
    }

    #[test]
    fn test_quantizer_rejects_gray_input() {
        let volume = PixelVolume::new(2, 2, 1);
        let err = OctreeQuantizer::default().quantize(&volume).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedQuantizerConfig(_)));
    }

    #[test]
    fn test_cube_rejects_gray_and_two_channel_volumes() {
        for channels in [1, 2] {
            let volume = PixelVolume::new(2, 1, channels);
            let mut cube = ColorCube::new(&OctreeOptions::new()).unwrap();
            assert!(matches!(
                cube.classify(&volume),
                Err(CodecError::UnsupportedQuantizerConfig(_))
            ));
            assert_eq!(cube.live_nodes(), 0);

            let palette = Palette::new(vec![Rgb::new(0, 0, 0)]);
            assert!(matches!(
                cube.assign(&volume, &palette),
                Err(CodecError::UnsupportedQuantizerConfig(_))
            ));
        }
    }

    #[test]
    fn test_quantizer_rejects_zero_colors_before_work() {
        let volume = PixelVolume::new(2, 2, 3);
        let quantizer = OctreeQuantizer::new(OctreeOptions::new().max_colors(0));
        assert!(matches!(
            quantizer.quantize(&volume),
            Err(CodecError::UnsupportedQuantizerConfig(_))
        ));
    }

    #[test]
    fn test_empty_volume() {
        let volume = PixelVolume::new(0, 0, 3);
        let quantized = OctreeQuantizer::default().quantize(&volume).unwrap();
        assert!(quantized.grid.is_empty());
        assert_eq!(quantized.palette.map(|p| p.len()), Some(0));
    }
}
