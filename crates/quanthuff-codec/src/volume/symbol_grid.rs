//! Quantizer output: one or more symbols per spatial cell.

/// Symbols produced by a quantizer, ready for entropy coding.
///
/// A grid holds `width * height` cells with `symbols_per_cell` symbols each,
/// stored in the encoder's walk order: `x` outer, `y` middle, symbol inner.
/// Block strategies emit one symbol per channel of the averaged block;
/// the octree strategy emits a single palette index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolGrid {
    width: usize,
    height: usize,
    symbols_per_cell: usize,
    symbols: Vec<u32>,
}

impl SymbolGrid {
    pub(crate) fn new(
        width: usize,
        height: usize,
        symbols_per_cell: usize,
        symbols: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(symbols.len(), width * height * symbols_per_cell);
        Self {
            width,
            height,
            symbols_per_cell,
            symbols,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn symbols_per_cell(&self) -> usize {
        self.symbols_per_cell
    }

    /// Flattened symbol stream in coding order.
    #[inline]
    pub fn symbols(&self) -> &[u32] {
        &self.symbols
    }

    /// Symbols of the cell at `(x, y)`.
    pub fn cell(&self, x: usize, y: usize) -> &[u32] {
        let start = (x * self.height + y) * self.symbols_per_cell;
        &self.symbols[start..start + self.symbols_per_cell]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_lookup() {
        // 2x2 grid with 3 symbols per cell, x outer
        let symbols: Vec<u32> = (0..12).collect();
        let grid = SymbolGrid::new(2, 2, 3, symbols);
        assert_eq!(grid.cell(0, 0), &[0, 1, 2]);
        assert_eq!(grid.cell(0, 1), &[3, 4, 5]);
        assert_eq!(grid.cell(1, 0), &[6, 7, 8]);
        assert_eq!(grid.len(), 12);
    }
}
