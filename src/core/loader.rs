//! Dataset loading from files or stdin

use crate::core::error::LoadError;
use crate::core::models::Dataset;
use logger::{debug, info};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Path that selects standard input instead of a file
pub const STDIN_PATH: &str = "-";

/// Load a fee dataset from a JSON file
///
/// Passing `-` reads the document from standard input.
///
/// # Errors
/// Returns [`LoadError::Read`] if the input cannot be read and
/// [`LoadError::Parse`] if it is not a valid dataset.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let text = read_input(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", text.len(), path.display());

    let dataset = Dataset::from_json(&text)?;
    info!(
        "Dataset loaded: {} ({} records)",
        path.display(),
        dataset.student_costs.len()
    );
    Ok(dataset)
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == STDIN_PATH {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(path)
    }
}
