//! Summary statistics over a grid

use serde::Serialize;

use crate::avalanche::TOPPLE_THRESHOLD;
use crate::grid::Grid;

/// Snapshot of a sandpile's state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SandpileStats {
    /// Steps that toppled at least one cell since creation
    pub iteration: u64,
    /// Grains on the grid
    pub total_mass: u64,
    pub max_height: u32,
    /// Cells at or above the toppling threshold
    pub unstable_cells: usize,
    /// Mean grains per cell
    pub mean_height: f64,
    /// Cell counts for heights 0, 1, 2 and 3
    pub histogram: [u64; 4],
    /// Topplings performed since creation
    pub total_topplings: u64,
}

impl SandpileStats {
    /// Collect statistics in a single pass over `grid`
    pub fn collect(grid: &Grid, total_topplings: u64) -> Self {
        let mut histogram = [0_u64; 4];
        let mut unstable_cells = 0_usize;
        let mut total_mass = 0_u64;
        let mut max_height = 0_u32;

        for &h in grid.cells() {
            total_mass += u64::from(h);
            max_height = max_height.max(h);
            if h < TOPPLE_THRESHOLD {
                histogram[h as usize] += 1;
            } else {
                unstable_cells += 1;
            }
        }

        Self {
            iteration: grid.iteration_count(),
            total_mass,
            max_height,
            unstable_cells,
            mean_height: total_mass as f64 / grid.len() as f64,
            histogram,
            total_topplings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_collect() {
        let grid = Grid::from_cells(3, 2, vec![0, 1, 2, 3, 3, 9]).unwrap();
        let stats = SandpileStats::collect(&grid, 12);

        assert_eq!(stats.total_mass, 18);
        assert_eq!(stats.max_height, 9);
        assert_eq!(stats.histogram, [1, 1, 1, 2]);
        assert_eq!(stats.unstable_cells, 1);
        let counted: u64 = stats.histogram.iter().sum::<u64>() + stats.unstable_cells as u64;
        assert_eq!(counted, grid.len() as u64);
        assert_eq!(stats.total_topplings, 12);
        assert_relative_eq!(stats.mean_height, 3.0);
    }
}
