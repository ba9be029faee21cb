//! The load → wrangle → layout → render pipeline
//!
//! Each stage returns a `Result`; the first failure stops the run and is
//! reported as a [`PipelineError`] that says which half of the pipeline failed.

use crate::core::error::{PipelineError, RenderError};
use crate::core::loader::load_dataset;
use crate::core::models::{Dataset, FeeGraph};
use crate::core::render::{Diagram, OutputFormat, RenderContext};
use crate::core::wrangle::{wrangle, WrangleOptions};
use logger::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of a successful render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    /// Where the diagram was written
    pub output: PathBuf,
    /// Number of component nodes (excluding the root)
    pub components: usize,
    /// Root node value
    pub total: f64,
}

/// Lay out and serialize an already wrangled graph
///
/// # Errors
/// Returns [`RenderError`] if the layout fails or the template cannot render.
pub fn render_graph(
    graph: &FeeGraph,
    format: OutputFormat,
    ctx: &RenderContext,
) -> Result<String, RenderError> {
    let diagram = Diagram::build(graph, ctx)?;
    debug!(
        "Diagram built: {} nodes, {} links",
        diagram.nodes.len(),
        diagram.links.len()
    );
    format.renderer().render(&diagram)
}

/// Wrangle and render a dataset held in memory
///
/// # Errors
/// Returns [`PipelineError::Load`] if wrangling rejects a record and
/// [`PipelineError::Render`] if the diagram cannot be produced.
pub fn render_dataset(
    dataset: &Dataset,
    format: OutputFormat,
    ctx: &RenderContext,
    options: &WrangleOptions,
) -> Result<String, PipelineError> {
    let graph = wrangle(dataset, options)?;
    Ok(render_graph(&graph, format, ctx)?)
}

/// Load `input`, render it and write the result to `output`
///
/// Missing parent directories of `output` are created.
///
/// # Errors
/// Returns [`PipelineError::Load`] for unreadable or malformed input and
/// [`PipelineError::Render`] for layout, template or write failures.
pub fn render_file(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    ctx: &RenderContext,
    options: &WrangleOptions,
) -> Result<RenderSummary, PipelineError> {
    let dataset = load_dataset(input)?;
    let graph = wrangle(&dataset, options)?;
    let content = render_graph(&graph, format, ctx)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RenderError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(output, content).map_err(|source| RenderError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    info!("Diagram written: {}", output.display());

    Ok(RenderSummary {
        output: output.to_path_buf(),
        components: graph.link_count(),
        total: graph.node(0).map_or(0.0, |root| root.value),
    })
}

/// Default output path: `<dir>/<input stem>_sankey.<ext>`
///
/// Stdin input (`-`) uses the stem `stdin`.
#[must_use]
pub fn default_output_path(dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| *s != crate::core::loader::STDIN_PATH)
        .unwrap_or("stdin");
    dir.join(format!("{stem}_sankey.{}", format.extension()))
}
