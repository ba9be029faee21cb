//! Error types for the load, layout and render stages

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading or interpreting the input dataset
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Input path (`-` for stdin)
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The input is not a JSON document with a `student-costs` list
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    /// A selected record has no usable amount and the policy is `reject`
    #[error("record '{name}' has a missing or non-numeric amount")]
    MissingAmount {
        /// Name of the offending record
        name: String,
    },
}

/// Failure inside the Sankey layout engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A link references a node id that does not exist
    #[error("missing: {0}")]
    MissingNode(usize),
    /// The graph contains a cycle
    #[error("circular link")]
    CircularLink,
}

/// Failure while laying out or drawing a diagram
#[derive(Debug, Error)]
pub enum RenderError {
    /// Layout could not be computed
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),
    /// Template rendering failed
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
    /// The diagram could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Failure of the load → wrangle → layout → render pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The dataset could not be loaded
    #[error("load failed: {0}")]
    Load(#[from] LoadError),
    /// The diagram could not be produced
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

impl From<LayoutError> for PipelineError {
    fn from(err: LayoutError) -> Self {
        Self::Render(RenderError::Layout(err))
    }
}
