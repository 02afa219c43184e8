//! Error types for the sandpile core
//!
//! Only construction and coordinate-indexed access can fail. Stepping, views and
//! counters are total over a validly constructed grid.

use std::fmt;

/// Errors returned by grid construction and coordinate-indexed operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandpileError {
    /// Width or height is zero, or `width * height` cannot be allocated.
    InvalidDimensions {
        /// Requested width in cells
        width: usize,
        /// Requested height in cells
        height: usize,
    },

    /// A row/column pair lies outside `[0, height) x [0, width)`.
    OutOfRange {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Grid width in cells
        width: usize,
        /// Grid height in cells
        height: usize,
    },

    /// Adding sand to a cell would overflow its `u32` height.
    HeightOverflow {
        /// Row of the saturated cell
        row: usize,
        /// Column of the saturated cell
        col: usize,
    },
}

impl fmt::Display for SandpileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid grid dimensions {width}x{height}")
            }
            Self::OutOfRange {
                row,
                col,
                width,
                height,
            } => write!(
                f,
                "cell ({row}, {col}) is outside the {width}x{height} grid"
            ),
            Self::HeightOverflow { row, col } => {
                write!(f, "height of cell ({row}, {col}) would overflow")
            }
        }
    }
}

impl std::error::Error for SandpileError {}
