//! Wrangle command handler

use fee_sankey::config::Config;
use fee_sankey::core::loader::load_dataset;
use fee_sankey::core::models::FeeGraph;
use fee_sankey::core::wrangle::wrangle;
use logger::{debug, error};
use std::path::Path;

/// Run the wrangle command, printing the graph as JSON
pub fn run(input_file: &Path, compact: bool, config: &Config) {
    match graph_json(input_file, compact, config) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!("Wrangle failed for {}: {err}", input_file.display());
            eprintln!("✗ {err}");
            std::process::exit(1);
        }
    }
}

fn graph_json(input_file: &Path, compact: bool, config: &Config) -> Result<String, String> {
    let options = config
        .wrangle_options()
        .map_err(|e| format!("Invalid data config: {e}"))?;
    let dataset = load_dataset(input_file).map_err(|e| e.to_string())?;
    let graph = wrangle(&dataset, &options).map_err(|e| e.to_string())?;
    debug!("{graph}");
    to_json(&graph, compact).map_err(|e| format!("Failed to serialize graph: {e}"))
}

fn to_json(graph: &FeeGraph, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(graph)
    } else {
        serde_json::to_string_pretty(graph)
    }
}
