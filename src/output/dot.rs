//! DOT output writer.
//!
//! Writes the rendered graph description to disk.

use super::prepare_output_path;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write DOT content to a file
///
/// **Public** - main entry point for DOT output
///
/// # Arguments
/// * `dot_content` - DOT text from the renderer
/// * `output_path` - Path to output file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
///
/// # Example
/// ```ignore
/// let dot = render_dot(&graph, &stats, None);
/// write_dot(&dot, "cfg.dot")?;
/// ```
pub fn write_dot(dot_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing DOT to: {}", output_path.display());
    prepare_output_path(output_path)?;

    if let Some(ext) = output_path.extension() {
        if ext != "dot" && ext != "gv" {
            debug!("File does not have a .dot extension: {}", output_path.display());
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(dot_content.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    let file_size = dot_content.len();
    info!(
        "DOT written successfully ({} bytes, {:.2} KB)",
        file_size,
        file_size as f64 / 1024.0
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const VALID_DOT: &str = "digraph \"CFG\" {\n  a -> b;\n}\n";

    #[test]
    fn test_write_dot() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_dot(VALID_DOT, path).unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), VALID_DOT);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/cfg.dot");

        write_dot(VALID_DOT, &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_write_to_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            write_dot(VALID_DOT, temp_dir.path()),
            Err(OutputError::InvalidPath(_))
        ));
    }
}
