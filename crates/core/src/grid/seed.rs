//! Initial fill policies
//!
//! How a grid is populated before the first step is a host decision. These
//! policies cover the common cases: empty, a single tall pile (the classic
//! fractal), a uniform fill, a reproducible random fill, and an explicit list.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::Grid;
use crate::SandpileError;

/// Height of the single central pile used by the reference driver
pub const DEFAULT_CENTER_HEIGHT: u32 = 10_000_000;

/// One explicitly seeded cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCell {
    pub row: usize,
    pub col: usize,
    pub height: u32,
}

/// Construction policy for a new grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Seed {
    /// All cells zero
    Empty,
    /// One pile at `(height / 2, width / 2)`
    Center { height: u32 },
    /// One pile at an explicit cell
    Point { row: usize, col: usize, height: u32 },
    /// Every cell set to the same height
    Uniform { height: u32 },
    /// Each cell drawn uniformly from `0..=max_height` with a fixed RNG seed
    Random { seed: u64, max_height: u32 },
    /// Explicit cells; later entries overwrite earlier ones
    Cells { cells: Vec<SeedCell> },
}

impl Default for Seed {
    fn default() -> Self {
        Self::Center {
            height: DEFAULT_CENTER_HEIGHT,
        }
    }
}

impl Seed {
    /// Write this policy into `grid`, overwriting current heights.
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::OutOfRange`] if a seeded cell lies outside the grid.
    /// The grid may be partially written in that case.
    pub(crate) fn apply(&self, grid: &mut Grid) -> Result<(), SandpileError> {
        match self {
            Self::Empty => grid.fill(0),
            Self::Center { height } => {
                grid.fill(0);
                let (row, col) = (grid.height() / 2, grid.width() / 2);
                grid.set_height(row, col, *height)?;
            }
            Self::Point { row, col, height } => {
                grid.fill(0);
                grid.set_height(*row, *col, *height)?;
            }
            Self::Uniform { height } => grid.fill(*height),
            Self::Random { seed, max_height } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                for cell in grid.cells_mut() {
                    *cell = rng.random_range(0..=*max_height);
                }
            }
            Self::Cells { cells } => {
                grid.fill(0);
                for cell in cells {
                    grid.set_height(cell.row, cell.col, cell.height)?;
                }
            }
        }
        Ok(())
    }
}
