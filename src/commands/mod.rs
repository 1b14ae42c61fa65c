//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod visualise;

// Re-export main command functions
pub use visualise::{execute_visualise, validate_args, VisualiseArgs, VisualiseOutcome};
