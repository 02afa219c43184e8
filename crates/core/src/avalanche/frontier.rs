//! Sparse toppling backend
//!
//! A cell's height only changes when it or a neighbour topples, so a cell that
//! was stable and untouched in the previous step is still stable. The frontier
//! keeps the set of cells touched by the last step (plus externally dirtied
//! cells) and only inspects those.
//!
//! Unstable cells are collected from the frontier before any write, which keeps
//! the step synchronous. The frontier is deduplicated so no cell topples twice.

use super::{Toppler, TOPPLE_THRESHOLD};
use crate::grid::Grid;

/// Toppler that tracks recently modified cells
pub struct FrontierToppler {
    /// Cells that may be unstable
    frontier: Vec<usize>,
    /// `queued[i]` is true iff `i` is in `frontier`
    queued: Vec<bool>,
    /// Scratch buffer for the cells toppling this step
    unstable: Vec<usize>,
}

impl FrontierToppler {
    /// Create a toppler whose first frontier covers every cell of `grid`
    pub fn new(grid: &Grid) -> Self {
        Self {
            frontier: (0..grid.len()).collect(),
            queued: vec![true; grid.len()],
            unstable: Vec::new(),
        }
    }

    /// Start over with every cell as a candidate if `grid` is not the size
    /// this toppler was built for
    fn fit(&mut self, grid: &Grid) {
        if self.queued.len() != grid.len() {
            *self = Self::new(grid);
        }
    }

    #[inline]
    fn enqueue(&mut self, idx: usize) {
        if !self.queued[idx] {
            self.queued[idx] = true;
            self.frontier.push(idx);
        }
    }

    /// Number of cells that will be inspected on the next step
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }
}

impl Toppler for FrontierToppler {
    fn step(&mut self, grid: &mut Grid) -> usize {
        self.fit(grid);
        let cells = grid.cells();
        self.unstable.clear();
        self.unstable.extend(
            self.frontier
                .iter()
                .copied()
                .filter(|&idx| cells[idx] >= TOPPLE_THRESHOLD),
        );

        for &idx in &self.frontier {
            self.queued[idx] = false;
        }
        self.frontier.clear();

        let unstable = std::mem::take(&mut self.unstable);

        // Remove before distributing so a near-saturated cell cannot overflow
        let cells = grid.cells_mut();
        for &idx in &unstable {
            cells[idx] -= TOPPLE_THRESHOLD;
        }

        for &idx in &unstable {
            self.enqueue(idx);

            let mut neighbors = [usize::MAX; 4];
            let mut count = 0;
            grid.for_each_neighbor(idx, |n| {
                neighbors[count] = n;
                count += 1;
            });
            for &n in &neighbors[..count] {
                grid.cells_mut()[n] += 1;
                self.enqueue(n);
            }
        }

        let toppled = unstable.len();
        self.unstable = unstable;
        toppled
    }

    fn has_unstable(&self, grid: &Grid) -> bool {
        if self.queued.len() != grid.len() {
            return !grid.is_stable();
        }
        let cells = grid.cells();
        self.frontier
            .iter()
            .any(|&idx| cells[idx] >= TOPPLE_THRESHOLD)
    }

    fn mark_dirty(&mut self, idx: usize) {
        if idx < self.queued.len() {
            self.enqueue(idx);
        }
    }

    fn name(&self) -> &'static str {
        "frontier"
    }
}
