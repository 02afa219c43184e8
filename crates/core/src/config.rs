//! Serializable simulation configuration
//!
//! Hosts typically load this from JSON and hand it to
//! [`Sandpile::from_config`](crate::Sandpile::from_config).

use serde::{Deserialize, Serialize};

use crate::avalanche::ToppleStrategy;
use crate::grid::{Seed, MAX_CELLS};
use crate::SandpileError;

/// Steps per rendered frame used by the reference driver
pub const DEFAULT_STEPS_PER_FRAME: u32 = 100;

/// Everything needed to build and drive a sandpile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandpileConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Initial fill
    pub seed: Seed,
    /// Toppling backend
    pub strategy: ToppleStrategy,
    /// Step budget the host passes to `compute_steps` each frame
    pub steps_per_frame: u32,
}

impl Default for SandpileConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            seed: Seed::default(),
            strategy: ToppleStrategy::Auto,
            steps_per_frame: DEFAULT_STEPS_PER_FRAME,
        }
    }
}

impl SandpileConfig {
    /// Check the dimensions without allocating
    ///
    /// # Errors
    ///
    /// Returns [`SandpileError::InvalidDimensions`] when the grid could not be built.
    pub fn validate(&self) -> Result<(), SandpileError> {
        let ok = self.width > 0
            && self.height > 0
            && self
                .width
                .checked_mul(self.height)
                .is_some_and(|len| len <= MAX_CELLS);
        if ok {
            Ok(())
        } else {
            Err(SandpileError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })
        }
    }
}
