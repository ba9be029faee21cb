//! Render command handler

use fee_sankey::config::Config;
use fee_sankey::core::layout::NodeAlign;
use fee_sankey::core::pipeline::{default_output_path, render_file, RenderSummary};
use fee_sankey::core::render::{format_value, OutputFormat};
use logger::{error, verbose};
use std::path::{Path, PathBuf};

/// Chart settings given on the command line for this run only
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartOverrides {
    /// Node alignment
    pub align: Option<NodeAlign>,
    /// Canvas width
    pub width: Option<f64>,
    /// Canvas height
    pub height: Option<f64>,
}

/// Run the render command, exiting with status 1 on failure
pub fn run(
    input_file: &Path,
    output_file: Option<&Path>,
    format: OutputFormat,
    overrides: ChartOverrides,
    config: &Config,
) {
    match generate(input_file, output_file, format, overrides, config) {
        Ok(summary) => {
            println!("✓ Diagram generated: {}", summary.output.display());
            println!(
                "  {} components, total {}",
                summary.components,
                format_value(summary.total)
            );
        }
        Err(err) => {
            error!("Render failed for {}: {err}", input_file.display());
            eprintln!("✗ {err}");
            std::process::exit(1);
        }
    }
}

fn generate(
    input_file: &Path,
    output_file: Option<&Path>,
    format: OutputFormat,
    overrides: ChartOverrides,
    config: &Config,
) -> Result<RenderSummary, String> {
    let mut config = config.clone();
    if let Some(width) = overrides.width {
        config.set("width", &width.to_string())?;
    }
    if let Some(height) = overrides.height {
        config.set("height", &height.to_string())?;
    }
    if let Some(align) = overrides.align {
        config.chart.align = align.to_string();
    }

    let ctx = config
        .render_context()
        .map_err(|e| format!("Invalid chart config: {e}"))?;
    let options = config
        .wrangle_options()
        .map_err(|e| format!("Invalid data config: {e}"))?;
    let output = resolve_output(input_file, output_file, format, &config);
    verbose!(
        "Rendering {} -> {} ({format}, {} align)",
        input_file.display(),
        output.display(),
        ctx.layout.options().align
    );

    render_file(input_file, &output, format, &ctx, &options).map_err(|e| e.to_string())
}

/// Explicit output path, or the default name inside the configured output directory
fn resolve_output(
    input_file: &Path,
    output_file: Option<&Path>,
    format: OutputFormat,
    config: &Config,
) -> PathBuf {
    output_file.map_or_else(
        || {
            let dir = PathBuf::from(&config.paths.output_dir);
            default_output_path(&dir, input_file, format)
        },
        Path::to_path_buf,
    )
}
