//! Grid store for sandpile heights
//!
//! The grid owns a flat `Vec<u32>` of sand heights in row-major order
//! (`row * width + col`) together with the iteration counter. It carries no
//! toppling logic; the avalanche engine is the only writer during stepping.
//!
//! The cell buffer is allocated once in the constructor and never resized, so
//! the address handed out through [`Grid::view`] is stable for the lifetime of
//! the grid.

mod seed;
mod view;

pub use seed::{Seed, SeedCell};
pub use view::CellView;

use std::fmt;

use crate::avalanche::TOPPLE_THRESHOLD;
use crate::SandpileError;

/// Upper bound on the number of cells a grid may hold (2^28, 1 GiB of `u32`).
pub const MAX_CELLS: usize = 1 << 28;

/// Rectangular sandpile grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Sand heights in row-major order (row * width + col)
    cells: Vec<u32>,
    iteration: u64,
}

/// Validate dimensions and return the cell count.
fn checked_len(width: usize, height: usize) -> Result<usize, SandpileError> {
    if width == 0 || height == 0 {
        return Err(SandpileError::InvalidDimensions { width, height });
    }
    match width.checked_mul(height) {
        Some(len) if len <= MAX_CELLS => Ok(len),
        _ => Err(SandpileError::InvalidDimensions { width, height }),
    }
}

impl Grid {
    /// Create a zero-filled grid
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::InvalidDimensions`] if either dimension is zero
    /// or the cell count overflows / exceeds [`MAX_CELLS`].
    pub fn new(width: usize, height: usize) -> Result<Self, SandpileError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![0; len],
            iteration: 0,
        })
    }

    /// Create a grid from an explicit row-major cell buffer
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::InvalidDimensions`] if the dimensions are invalid
    /// or `cells.len() != width * height`.
    pub fn from_cells(width: usize, height: usize, cells: Vec<u32>) -> Result<Self, SandpileError> {
        let len = checked_len(width, height)?;
        if cells.len() != len {
            return Err(SandpileError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells,
            iteration: 0,
        })
    }

    /// Create a grid and apply a seeding policy to it
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::InvalidDimensions`] for bad dimensions and
    /// [`SandpileError::OutOfRange`] if the seed addresses a cell outside the grid.
    pub fn seeded(width: usize, height: usize, seed: &Seed) -> Result<Self, SandpileError> {
        let mut grid = Self::new(width, height)?;
        seed.apply(&mut grid)?;
        Ok(grid)
    }

    // === Dimensions ===

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells (`width * height`)
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: zero-sized grids are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // === Index conversion ===

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx / self.width, idx % self.width)
    }

    #[inline]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    fn checked_index(&self, row: usize, col: usize) -> Result<usize, SandpileError> {
        if self.in_bounds(row, col) {
            Ok(self.index(row, col))
        } else {
            Err(SandpileError::OutOfRange {
                row,
                col,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Call `f` with the index of every in-bounds orthogonal neighbour of `idx`.
    ///
    /// Edge cells have fewer than four neighbours; nothing is reported for the
    /// missing ones.
    #[inline]
    pub fn for_each_neighbor(&self, idx: usize, mut f: impl FnMut(usize)) {
        let (row, col) = self.coords(idx);
        if col > 0 {
            f(idx - 1);
        }
        if col + 1 < self.width {
            f(idx + 1);
        }
        if row > 0 {
            f(idx - self.width);
        }
        if row + 1 < self.height {
            f(idx + self.width);
        }
    }

    // === Cell access ===

    /// Current sand height at `(row, col)`
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::OutOfRange`] for coordinates outside the grid.
    pub fn height_at(&self, row: usize, col: usize) -> Result<u32, SandpileError> {
        self.checked_index(row, col).map(|idx| self.cells[idx])
    }

    /// Overwrite a cell. Engine and seeding only.
    pub(crate) fn set_height(
        &mut self,
        row: usize,
        col: usize,
        value: u32,
    ) -> Result<(), SandpileError> {
        let idx = self.checked_index(row, col)?;
        self.cells[idx] = value;
        Ok(())
    }

    /// Drop `amount` grains onto `(row, col)` and return the cell index.
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::OutOfRange`] for coordinates outside the grid
    /// and [`SandpileError::HeightOverflow`] if the new height exceeds `u32::MAX`.
    pub(crate) fn add_grains(&mut self, row: usize, col: usize, amount: u32) -> Result<usize, SandpileError> {
        let idx = self.checked_index(row, col)?;
        self.cells[idx] = self.cells[idx]
            .checked_add(amount)
            .ok_or(SandpileError::HeightOverflow { row, col })?;
        Ok(idx)
    }

    /// Borrowed, zero-copy view of the live cell buffer
    pub fn view(&self) -> CellView<'_> {
        CellView::new(&self.cells, self.width, self.height)
    }

    #[inline]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [u32] {
        &mut self.cells
    }

    pub(crate) fn fill(&mut self, value: u32) {
        self.cells.fill(value);
    }

    // === Iteration counter ===

    #[inline]
    pub fn iteration_count(&self) -> u64 {
        self.iteration
    }

    #[inline]
    pub(crate) fn advance_iteration(&mut self) {
        self.iteration += 1;
    }

    // === Derived queries ===

    /// Total number of grains on the grid
    pub fn total_mass(&self) -> u64 {
        self.cells.iter().map(|&h| u64::from(h)).sum()
    }

    pub fn max_height(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Number of cells at or above the toppling threshold
    pub fn unstable_count(&self) -> usize {
        self.cells.iter().filter(|&&h| h >= TOPPLE_THRESHOLD).count()
    }

    /// `true` when every cell holds at most `TOPPLE_THRESHOLD - 1` grains
    pub fn is_stable(&self) -> bool {
        self.cells.iter().all(|&h| h < TOPPLE_THRESHOLD)
    }
}

impl fmt::Display for Grid {
    /// One line per row, heights separated by spaces
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for (col, height) in row.iter().enumerate() {
                if col > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{height}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
