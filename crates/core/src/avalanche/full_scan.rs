//! Dense toppling backend
//!
//! Each step runs two data-parallel passes over the grid:
//! 1. build a topple mask from the current heights (the snapshot),
//! 2. apply `-4` to masked cells and `+1` per masked neighbour, row by row.
//!
//! The second pass only reads the mask, never neighbouring heights, so the
//! in-place write cannot leak updated values into the same step.

use rayon::prelude::*;

use super::{Toppler, TOPPLE_THRESHOLD};
use crate::grid::Grid;

/// Rayon-parallel full-grid toppler
pub struct FullScanToppler {
    /// 1 where the cell topples this step, 0 elsewhere
    mask: Vec<u8>,
}

impl FullScanToppler {
    pub fn new(grid: &Grid) -> Self {
        Self {
            mask: vec![0; grid.len()],
        }
    }
}

impl Toppler for FullScanToppler {
    fn step(&mut self, grid: &mut Grid) -> usize {
        let width = grid.width();
        let height = grid.height();
        if self.mask.len() != grid.len() {
            self.mask.resize(grid.len(), 0);
        }
        let cells = grid.cells_mut();

        let toppled: usize = self
            .mask
            .par_iter_mut()
            .zip(cells.par_iter())
            .map(|(m, &h)| {
                *m = u8::from(h >= TOPPLE_THRESHOLD);
                usize::from(*m)
            })
            .sum();

        if toppled == 0 {
            return 0;
        }

        let mask = &self.mask;
        cells
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, row_cells)| {
                let base = row * width;
                for (col, cell) in row_cells.iter_mut().enumerate() {
                    let idx = base + col;

                    let mut incoming = 0_u32;
                    if col > 0 {
                        incoming += u32::from(mask[idx - 1]);
                    }
                    if col + 1 < width {
                        incoming += u32::from(mask[idx + 1]);
                    }
                    if row > 0 {
                        incoming += u32::from(mask[idx - width]);
                    }
                    if row + 1 < height {
                        incoming += u32::from(mask[idx + width]);
                    }

                    // Subtract first: a masked cell holds >= 4, so this never underflows,
                    // and a cell at >= 4 never grows, so the add never overflows.
                    *cell = *cell - TOPPLE_THRESHOLD * u32::from(mask[idx]) + incoming;
                }
            });

        toppled
    }

    fn has_unstable(&self, grid: &Grid) -> bool {
        grid.cells().par_iter().any(|&h| h >= TOPPLE_THRESHOLD)
    }

    fn mark_dirty(&mut self, _idx: usize) {
        // Every step rescans the whole grid
    }

    fn name(&self) -> &'static str {
        "full_scan"
    }
}
