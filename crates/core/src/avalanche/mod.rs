//! Avalanche engine: the toppling rule and the step-budgeted driver
//!
//! A cell is unstable when it holds at least [`TOPPLE_THRESHOLD`] grains.
//! Toppling removes four grains and gives one to each orthogonal neighbour;
//! grains pushed past the grid edge are lost.
//!
//! One step topples every cell that was unstable at the start of the step,
//! exactly once, using the heights of that snapshot. All backends implement
//! this synchronous rule and produce bit-identical grids.
//!
//! # Backend Selection
//!
//! - [`FrontierToppler`] only revisits cells touched by the previous step and
//!   wins whenever avalanches are local (a single seeded pile).
//! - [`FullScanToppler`] sweeps the whole grid with Rayon and wins when most of
//!   the grid is active (large random fills).
//!
//! [`ToppleStrategy::Auto`] picks between them from the initial grid.

mod engine;
mod frontier;
mod full_scan;

pub use engine::{AvalancheEngine, StepReport};
pub use frontier::FrontierToppler;
pub use full_scan::FullScanToppler;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::grid::Grid;

/// Grains needed for a cell to topple (one per orthogonal neighbour)
pub const TOPPLE_THRESHOLD: u32 = 4;

/// Grids smaller than this never use the parallel full-scan backend under `Auto`
pub const PARALLEL_MIN_CELLS: usize = 64 * 64;

/// Backend-agnostic toppling pass
///
/// Implementations may keep private bookkeeping between steps; any external
/// change to the grid must be reported through [`Toppler::mark_dirty`].
pub trait Toppler: Send + Sync {
    /// Topple every cell that is unstable at the start of the call, once.
    ///
    /// # Returns
    ///
    /// Number of cells toppled; zero means the grid was already stable and
    /// has not been touched.
    fn step(&mut self, grid: &mut Grid) -> usize;

    /// Whether any cell is at or above [`TOPPLE_THRESHOLD`]
    fn has_unstable(&self, grid: &Grid) -> bool;

    /// Record that the cell at `idx` was changed from outside the engine
    fn mark_dirty(&mut self, idx: usize);

    /// Short backend name for logs and stats
    fn name(&self) -> &'static str;
}

/// Which toppling backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToppleStrategy {
    /// Decide from grid size and initial activity
    #[default]
    Auto,
    /// Parallel sweep over every cell
    FullScan,
    /// Sparse sweep over recently touched cells
    Frontier,
}

impl ToppleStrategy {
    /// Resolve `Auto` to a concrete backend for `grid`
    pub fn resolve(self, grid: &Grid) -> Self {
        match self {
            Self::Auto => {
                // Mostly-active large grids favour the dense sweep
                if grid.len() >= PARALLEL_MIN_CELLS && grid.unstable_count() * 4 >= grid.len() {
                    Self::FullScan
                } else {
                    Self::Frontier
                }
            }
            other => other,
        }
    }
}

/// Create a toppler for `grid`
///
/// # Arguments
///
/// * `strategy` - Requested backend; `Auto` is resolved against `grid`
/// * `grid` - Grid the toppler will drive (used for sizing and initial state)
pub fn create_toppler(strategy: ToppleStrategy, grid: &Grid) -> Box<dyn Toppler> {
    let resolved = strategy.resolve(grid);
    let toppler: Box<dyn Toppler> = match resolved {
        ToppleStrategy::FullScan => Box::new(FullScanToppler::new(grid)),
        ToppleStrategy::Frontier | ToppleStrategy::Auto => Box::new(FrontierToppler::new(grid)),
    };
    info!(
        "Using {} toppler for {}x{} grid (requested {:?})",
        toppler.name(),
        grid.width(),
        grid.height(),
        strategy
    );
    toppler
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Seed;

    #[test]
    fn test_auto_prefers_frontier_for_single_pile() {
        let grid = Grid::seeded(128, 128, &Seed::Center { height: 1000 }).unwrap();
        assert_eq!(
            ToppleStrategy::Auto.resolve(&grid),
            ToppleStrategy::Frontier
        );
    }

    #[test]
    fn test_auto_prefers_full_scan_for_busy_grid() {
        let grid = Grid::seeded(128, 128, &Seed::Uniform { height: 5 }).unwrap();
        assert_eq!(
            ToppleStrategy::Auto.resolve(&grid),
            ToppleStrategy::FullScan
        );

        // Small grids stay on the sparse backend
        let small = Grid::seeded(8, 8, &Seed::Uniform { height: 5 }).unwrap();
        assert_eq!(
            ToppleStrategy::Auto.resolve(&small),
            ToppleStrategy::Frontier
        );
    }

    #[test]
    fn test_explicit_strategy_is_kept() {
        let grid = Grid::new(4, 4).unwrap();
        assert_eq!(
            ToppleStrategy::FullScan.resolve(&grid),
            ToppleStrategy::FullScan
        );
        assert_eq!(create_toppler(ToppleStrategy::FullScan, &grid).name(), "full_scan");
        assert_eq!(create_toppler(ToppleStrategy::Frontier, &grid).name(), "frontier");
    }
}
