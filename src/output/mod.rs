//! Output writers for the rendered graph and the run report.
//!
//! This module handles writing data to disk:
//! - DOT graph descriptions
//! - JSON reports

pub mod dot;
pub mod json;
pub mod schema;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

// Re-export main functions
pub use dot::write_dot;
pub use json::{read_report, write_report};
pub use schema::{build_report, BinOpReport, BlockReport, CfgReport};

/// Validate an output path and create its parent directories
///
/// **Private** - shared by the writers
fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
