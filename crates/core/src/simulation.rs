//! Sandpile simulation instance
//!
//! `Sandpile` is the unit a host creates and drives: it owns one grid and one
//! avalanche engine. There is no shared global state, so any number of
//! instances can run side by side.

use tracing::info;

use crate::avalanche::{AvalancheEngine, ToppleStrategy};
use crate::config::SandpileConfig;
use crate::grid::{CellView, Grid, Seed};
use crate::stats::SandpileStats;
use crate::SandpileError;

/// An abelian sandpile: grid store plus avalanche engine
pub struct Sandpile {
    engine: AvalancheEngine,
    total_topplings: u64,
    /// Tracks the last reported state so stabilisation is logged once
    was_running: bool,
}

impl Sandpile {
    /// Create a zero-filled sandpile
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::InvalidDimensions`] for zero or unrepresentable sizes.
    pub fn new(width: usize, height: usize) -> Result<Self, SandpileError> {
        Ok(Self::from_grid(Grid::new(width, height)?, ToppleStrategy::Auto))
    }

    /// Create a sandpile with an initial fill and backend choice
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::InvalidDimensions`] for bad sizes and
    /// [`SandpileError::OutOfRange`] if the seed addresses a cell outside the grid.
    pub fn with_seed(
        width: usize,
        height: usize,
        seed: &Seed,
        strategy: ToppleStrategy,
    ) -> Result<Self, SandpileError> {
        Ok(Self::from_grid(Grid::seeded(width, height, seed)?, strategy))
    }

    /// Build from a configuration
    ///
    /// # Errors
    ///
    /// Same as [`Sandpile::with_seed`].
    pub fn from_config(config: &SandpileConfig) -> Result<Self, SandpileError> {
        config.validate()?;
        Self::with_seed(config.width, config.height, &config.seed, config.strategy)
    }

    /// Take ownership of an existing grid
    pub fn from_grid(grid: Grid, strategy: ToppleStrategy) -> Self {
        let engine = AvalancheEngine::new(grid, strategy);
        let was_running = engine.has_unstable();

        let grid = engine.grid();
        info!(
            "Created sandpile: {}x{} grid, mass={}, backend={}",
            grid.width(),
            grid.height(),
            grid.total_mass(),
            engine.backend_name()
        );

        Self {
            engine,
            total_topplings: 0,
            was_running,
        }
    }

    /// Advance by up to `n` synchronous toppling steps
    ///
    /// # Returns
    ///
    /// `true` while unstable cells remain, `false` once the grid is stable.
    pub fn compute_steps(&mut self, n: u32) -> bool {
        let report = self.engine.run(n);
        self.total_topplings += report.topplings;

        if self.was_running && !report.still_running {
            info!(
                "Sandpile stabilised after {} iterations ({} topplings, mass={})",
                self.engine.grid().iteration_count(),
                self.total_topplings,
                self.engine.grid().total_mass()
            );
        }
        self.was_running = report.still_running;

        report.still_running
    }

    /// Zero-copy view of the live cell buffer; re-take it after every mutation
    pub fn raw_view(&self) -> CellView<'_> {
        self.engine.view()
    }

    /// Current height at `(row, col)`
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::OutOfRange`] for coordinates outside the grid.
    pub fn height_at(&self, row: usize, col: usize) -> Result<u32, SandpileError> {
        self.engine.grid().height_at(row, col)
    }

    /// Drop `amount` grains on a cell, waking the engine if it becomes unstable
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::OutOfRange`] or [`SandpileError::HeightOverflow`];
    /// the grid is unchanged on error.
    pub fn add_grains(&mut self, row: usize, col: usize, amount: u32) -> Result<(), SandpileError> {
        let idx = self.engine.add_grains(row, col, amount)?;
        self.was_running |= self.engine.grid().cells()[idx] >= crate::TOPPLE_THRESHOLD;
        Ok(())
    }

    pub fn iteration_count(&self) -> u64 {
        self.engine.grid().iteration_count()
    }

    pub fn is_stable(&self) -> bool {
        !self.engine.has_unstable()
    }

    pub fn width(&self) -> usize {
        self.engine.grid().width()
    }

    pub fn height(&self) -> usize {
        self.engine.grid().height()
    }

    pub fn grid(&self) -> &Grid {
        self.engine.grid()
    }

    /// Topplings performed since creation
    pub fn total_topplings(&self) -> u64 {
        self.total_topplings
    }

    pub fn strategy_name(&self) -> &'static str {
        self.engine.backend_name()
    }

    pub fn stats(&self) -> SandpileStats {
        SandpileStats::collect(self.engine.grid(), self.total_topplings)
    }
}
