use tracing::debug;

use super::{create_toppler, Toppler, ToppleStrategy};
use crate::grid::{CellView, Grid};
use crate::SandpileError;

/// Outcome of one `compute_steps` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Steps that toppled at least one cell
    pub steps: u64,
    /// Total cell topplings across those steps
    pub topplings: u64,
    /// Whether an unstable cell remains
    pub still_running: bool,
}

/// Drives a grid through a bounded number of synchronous toppling steps
///
/// The engine owns its grid. Outside code only gets shared borrows, and the
/// one mutator, [`AvalancheEngine::add_grains`], reports the touched cell to
/// the backend, so the backend's bookkeeping always matches the cells.
pub struct AvalancheEngine {
    grid: Grid,
    toppler: Box<dyn Toppler>,
}

impl AvalancheEngine {
    pub fn new(grid: Grid, strategy: ToppleStrategy) -> Self {
        let toppler = create_toppler(strategy, &grid);
        Self { grid, toppler }
    }

    /// Perform up to `n` steps
    ///
    /// Before each step the grid is checked for unstable cells; a stable grid
    /// stops the loop early without advancing the iteration counter. Every step
    /// that topples at least one cell advances it by one.
    ///
    /// # Returns
    ///
    /// `true` if an unstable cell remains after the loop, `false` if the grid is stable.
    pub fn compute_steps(&mut self, n: u32) -> bool {
        self.run(n).still_running
    }

    /// Same as [`compute_steps`](Self::compute_steps) but returns the full report
    pub fn run(&mut self, n: u32) -> StepReport {
        let mut report = StepReport::default();

        for _ in 0..n {
            let toppled = self.toppler.step(&mut self.grid);
            if toppled == 0 {
                break;
            }
            self.grid.advance_iteration();
            report.steps += 1;
            report.topplings += toppled as u64;
        }

        report.still_running = self.toppler.has_unstable(&self.grid);

        debug!(
            "compute_steps: budget={}, steps={}, topplings={}, iteration={}, running={}",
            n,
            report.steps,
            report.topplings,
            self.grid.iteration_count(),
            report.still_running
        );

        report
    }

    /// Drop `amount` grains on `(row, col)` and wake the backend for that cell
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::OutOfRange`] or [`SandpileError::HeightOverflow`];
    /// the grid is unchanged on error.
    pub fn add_grains(&mut self, row: usize, col: usize, amount: u32) -> Result<usize, SandpileError> {
        let idx = self.grid.add_grains(row, col, amount)?;
        self.toppler.mark_dirty(idx);
        Ok(idx)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Zero-copy view of the live cells
    pub fn view(&self) -> CellView<'_> {
        self.grid.view()
    }

    /// Give the grid back, dropping the backend state
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn has_unstable(&self) -> bool {
        self.toppler.has_unstable(&self.grid)
    }

    pub fn backend_name(&self) -> &'static str {
        self.toppler.name()
    }
}
