//! FFI-exposed seeding configuration.
//!
//! `SandpileSeed` mirrors the core `Seed` policies with a stable `#[repr(C)]`
//! layout so hosts can choose the initial fill when creating an instance.

use sandpile_core::{Grid, Seed, ToppleStrategy};

use crate::error::DefaultSandpileError;

/// Initial fill for a new sandpile.
///
/// # Example (Conceptual)
///
/// ```c
/// SandpileSeed seed;
/// seed.tag = Center;
/// seed.center.height = 10000000;
/// ```
#[repr(C)]
pub enum SandpileSeed {
    /// All cells zero.
    Empty,

    /// One pile in the middle cell.
    Center {
        /// Grains in the pile.
        height: u32,
    },

    /// One pile at an explicit cell.
    Point {
        /// Row of the pile.
        row: usize,
        /// Column of the pile.
        col: usize,
        /// Grains in the pile.
        height: u32,
    },

    /// Every cell holds the same number of grains.
    Uniform {
        /// Grains per cell.
        height: u32,
    },

    /// Reproducible random fill in `0..=max_height`.
    Random {
        /// RNG seed.
        seed: u64,
        /// Largest height drawn.
        max_height: u32,
    },

    /// Copy heights from a caller-owned row-major buffer of `width * height` values.
    FromCells {
        /// Pointer to the heights. Only read during the call.
        cells_ptr: *const u32,
        /// Number of values behind `cells_ptr`.
        len: usize,
    },
}

impl SandpileSeed {
    /// Build the initial grid.
    ///
    /// # Safety
    /// For `FromCells`, `cells_ptr` must be null or point to `len` readable `u32`s.
    pub(crate) unsafe fn build_grid(
        &self,
        width: usize,
        height: usize,
    ) -> Result<Grid, DefaultSandpileError> {
        let seed = match *self {
            Self::Empty => Seed::Empty,
            Self::Center { height } => Seed::Center { height },
            Self::Point { row, col, height } => Seed::Point { row, col, height },
            Self::Uniform { height } => Seed::Uniform { height },
            Self::Random { seed, max_height } => Seed::Random { seed, max_height },
            Self::FromCells { cells_ptr, len } => {
                if cells_ptr.is_null() {
                    return Err(DefaultSandpileError::null_pointer("cells_ptr"));
                }
                // SAFETY: caller guarantees `len` readable values; they are copied.
                let cells = unsafe { std::slice::from_raw_parts(cells_ptr, len) }.to_vec();
                return Ok(Grid::from_cells(width, height, cells)?);
            }
        };
        Ok(Grid::seeded(width, height, &seed)?)
    }
}

/// Map the C strategy selector (0 = auto, 1 = full scan, 2 = frontier).
pub(crate) fn strategy_from_u8(strategy: u8) -> Result<ToppleStrategy, DefaultSandpileError> {
    match strategy {
        0 => Ok(ToppleStrategy::Auto),
        1 => Ok(ToppleStrategy::FullScan),
        2 => Ok(ToppleStrategy::Frontier),
        other => Err(DefaultSandpileError::invalid_parameter(format!(
            "strategy must be 0 (auto), 1 (full scan) or 2 (frontier), got {other}"
        ))),
    }
}
