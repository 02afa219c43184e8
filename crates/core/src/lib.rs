//! Abelian Sandpile Core Library
//!
//! A discrete grid where each cell holds a pile of sand. Cells holding four or
//! more grains topple, sending one grain to each orthogonal neighbour; grains
//! pushed off the edge are lost. Avalanches cascade until every cell holds at
//! most three grains.
//!
//! ## Components
//!
//! - [`grid`] - the grid store: heights, iteration counter, zero-copy views
//! - [`avalanche`] - the toppling rule and the step-budgeted engine
//! - [`Sandpile`] - an owned instance combining both, driven by a host
//!
//! ## Example
//!
//! ```rust
//! use sandpile_core::{Sandpile, Seed, ToppleStrategy};
//!
//! let seed = Seed::Center { height: 1000 };
//! let mut pile = Sandpile::with_seed(64, 64, &seed, ToppleStrategy::Auto).unwrap();
//! while pile.compute_steps(100) {
//!     let view = pile.raw_view();
//!     assert_eq!(view.len(), 64 * 64);
//! }
//! assert!(pile.raw_view().iter().all(|&h| h <= 3));
//! ```

pub mod avalanche;
pub mod config;
pub mod error;
pub mod grid;
pub mod simulation;
pub mod stats;

pub use avalanche::{
    create_toppler, AvalancheEngine, FrontierToppler, FullScanToppler, StepReport, ToppleStrategy,
    Toppler, TOPPLE_THRESHOLD,
};
pub use config::SandpileConfig;
pub use error::SandpileError;
pub use grid::{CellView, Grid, Seed, SeedCell};
pub use simulation::Sandpile;
pub use stats::SandpileStats;
