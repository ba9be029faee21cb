//! Integration tests for the render pipeline and its outputs

use fee_sankey::core::error::{LoadError, PipelineError, RenderError};
use fee_sankey::core::models::Dataset;
use fee_sankey::core::pipeline::{render_dataset, render_file, render_graph};
use fee_sankey::core::render::{
    Diagram, DiagramRenderer, OutputFormat, RenderContext, Scheme, SvgRenderer,
};
use fee_sankey::core::wrangle::{wrangle, MissingAmountPolicy, WrangleOptions};
use std::fs;
use tempfile::TempDir;

const SCENARIO: &str = r#"{"student-costs":[{"type":"Auxiliary Comprehensive Fee Component","name":"Health Fee","subtype":"Health","amount":100},{"type":"Other","name":"Tuition","subtype":"Core","amount":5000}]}"#;

fn write_input(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write input");
    path
}

#[test]
fn scenario_svg_geometry() {
    let dataset = Dataset::from_json(SCENARIO).expect("scenario should parse");
    let svg = render_dataset(
        &dataset,
        OutputFormat::Svg,
        &RenderContext::default(),
        &WrangleOptions::default(),
    )
    .expect("render failed");

    assert!(svg.contains("viewBox=\"0 0 928 600\""));
    assert!(svg.contains("<rect x=\"1\" y=\"5\" height=\"590\" width=\"15\" fill=\"#1f77b4\">"));
    assert!(svg.contains("<rect x=\"912\" y=\"5\" height=\"590\" width=\"15\" fill=\"#ff7f0e\">"));
    assert!(svg.contains("d=\"M16,300C464,300,464,300,912,300\" stroke=\"#1f77b4\" stroke-width=\"590\""));
    assert!(svg.contains("<text x=\"22\" y=\"300\" dy=\"0.35em\" text-anchor=\"start\">"));
    assert!(svg.contains("<text x=\"906\" y=\"300\" dy=\"0.35em\" text-anchor=\"end\">Health Fee</text>"));
    assert!(!svg.contains("Tuition"));
}

#[test]
fn empty_dataset_renders_lone_root() {
    let svg = render_dataset(
        &Dataset::default(),
        OutputFormat::Svg,
        &RenderContext::default(),
        &WrangleOptions::default(),
    )
    .expect("render failed");
    assert_eq!(svg.matches("<rect ").count(), 1);
    assert!(svg.contains("<title>Auxiliary Comprehensive Fee\nValue: 0</title>"));
    assert!(!svg.contains("NaN"));
}

#[test]
fn thin_links_keep_a_visible_stroke() {
    let mut dataset = Dataset::from_json(SCENARIO).expect("scenario should parse");
    dataset.student_costs[1].record_type =
        "Auxiliary Comprehensive Fee Component".to_string();
    dataset.student_costs[0].amount = Some(0.0);
    let graph = wrangle(&dataset, &WrangleOptions::default()).expect("wrangle failed");
    let diagram = Diagram::build(&graph, &RenderContext::default()).expect("layout failed");

    assert!(diagram.links[0].stroke_width >= 1.0);
    assert!(diagram.links[1].stroke_width > 1.0);
    assert_eq!(diagram.links[1].tooltip, "Auxiliary Comprehensive Fee → Tuition\nValue: 5,000");
}

#[test]
fn categories_share_colors() {
    let json = r#"{"student-costs":[
        {"type":"Auxiliary Comprehensive Fee Component","name":"Clinic","subtype":"Health","amount":10},
        {"type":"Auxiliary Comprehensive Fee Component","name":"Gym","subtype":"Recreation","amount":10},
        {"type":"Auxiliary Comprehensive Fee Component","name":"Counseling","subtype":"Health","amount":10}
    ]}"#;
    let graph = wrangle(
        &Dataset::from_json(json).expect("should parse"),
        &WrangleOptions::default(),
    )
    .expect("wrangle failed");
    let diagram = Diagram::build(&graph, &RenderContext::default()).expect("layout failed");
    assert_eq!(diagram.nodes[1].fill, diagram.nodes[3].fill);
    assert_ne!(diagram.nodes[1].fill, diagram.nodes[2].fill);

    let tableau = RenderContext::default().with_scheme(Scheme::Tableau10);
    let diagram = Diagram::build(&graph, &tableau).expect("layout failed");
    assert_eq!(diagram.nodes[0].fill, Scheme::Tableau10.colors()[0]);
}

#[test]
fn html_page_wraps_svg() {
    let dataset = Dataset::from_json(SCENARIO).expect("scenario should parse");
    let graph = wrangle(&dataset, &WrangleOptions::default()).expect("wrangle failed");
    let ctx = RenderContext::default().with_title("JMU Fees & Costs");
    let html = render_graph(&graph, OutputFormat::Html, &ctx).expect("render failed");

    assert!(html.contains("<title>JMU Fees &amp; Costs</title>"));
    let svg = render_graph(&graph, OutputFormat::Svg, &ctx).expect("render failed");
    assert!(html.contains(svg.trim()));
}

#[test]
fn render_file_writes_output_and_summary() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_input(&dir, "fees.json", SCENARIO);
    let output = dir.path().join("nested").join("fees.svg");

    let summary = render_file(
        &input,
        &output,
        OutputFormat::Svg,
        &RenderContext::default(),
        &WrangleOptions::default(),
    )
    .expect("pipeline failed");

    assert_eq!(summary.components, 1);
    assert!((summary.total - 100.0).abs() < f64::EPSILON);
    let written = fs::read_to_string(&output).expect("output missing");
    assert!(written.starts_with("<svg"));
}

#[test]
fn malformed_input_is_a_load_failure() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_input(&dir, "broken.json", "{\"student-costs\": [");
    let output = dir.path().join("broken.svg");

    let err = render_file(
        &input,
        &output,
        OutputFormat::Svg,
        &RenderContext::default(),
        &WrangleOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Load(LoadError::Parse(_))));
    assert!(!output.exists());
}

#[test]
fn rejected_amount_is_a_load_failure() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_input(
        &dir,
        "partial.json",
        r#"{"student-costs":[{"type":"Auxiliary Comprehensive Fee Component","name":"Mystery"}]}"#,
    );
    let options = WrangleOptions {
        missing_amount: MissingAmountPolicy::Reject,
        ..WrangleOptions::default()
    };
    let err = render_file(
        &input,
        &dir.path().join("partial.svg"),
        OutputFormat::Svg,
        &RenderContext::default(),
        &options,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Load(LoadError::MissingAmount { ref name }) if name == "Mystery"
    ));
}

#[test]
fn unwritable_output_is_a_render_failure() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = write_input(&dir, "fees.json", SCENARIO);
    let blocker = write_input(&dir, "blocker", "not a directory");

    let err = render_file(
        &input,
        &blocker.join("fees.svg"),
        OutputFormat::Svg,
        &RenderContext::default(),
        &WrangleOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Render(RenderError::Write { .. })));
}

#[test]
fn generate_writes_through_trait_default() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let graph = wrangle(
        &Dataset::from_json(SCENARIO).expect("scenario should parse"),
        &WrangleOptions::default(),
    )
    .expect("wrangle failed");
    let diagram = Diagram::build(&graph, &RenderContext::default()).expect("layout failed");
    let path = dir.path().join("direct.svg");

    SvgRenderer::new()
        .generate(&diagram, &path)
        .expect("generate failed");
    assert_eq!(
        fs::read_to_string(&path).expect("output missing"),
        SvgRenderer::new().render(&diagram).expect("render failed")
    );
}
