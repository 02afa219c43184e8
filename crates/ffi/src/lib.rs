//! C ABI for the sandpile core.
//!
//! Every instance is an opaque `SandpileInstance*` created by `sandpile_new*`
//! and released with `sandpile_destroy`. Functions return a
//! [`SandpileErrorCode`]; on failure the message is available from
//! `sandpile_get_last_error` on the same thread.
//!
//! Instances are not internally synchronised. Drive each one from a single
//! thread and never read the buffer from `sandpile_get_cells` while
//! `sandpile_compute_steps` is running.

mod error;
mod helpers;
mod instance;
mod queries;
mod seed;
mod simulation;

pub use error::{sandpile_get_last_error, sandpile_get_last_error_code, SandpileErrorCode};
pub use instance::{sandpile_destroy, sandpile_new, sandpile_new_seeded, SandpileInstance};
pub use queries::{
    sandpile_get_cells, sandpile_get_dimensions, sandpile_get_height, sandpile_get_iteration,
    sandpile_get_stats, SandpileStats,
};
pub use seed::SandpileSeed;
pub use simulation::{sandpile_add_grains, sandpile_compute_steps};
