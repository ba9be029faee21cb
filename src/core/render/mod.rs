//! Diagram rendering for wrangled fee graphs
//!
//! Rendering happens in two steps: [`Diagram::build`] lays the graph out and
//! turns it into positioned shapes, then a [`DiagramRenderer`] serializes those
//! shapes (standalone SVG or an HTML page embedding the SVG). All drawing state,
//! including the color scale, lives in values passed through these calls.

pub mod color;
pub mod format;
pub mod html;
pub mod path;
pub mod svg;

pub use color::{ColorScale, Scheme};
pub use format::{fmt_num, format_value};
pub use html::HtmlRenderer;
pub use path::link_horizontal;
pub use svg::SvgRenderer;

use crate::core::error::{LayoutError, RenderError};
use crate::core::layout::{Extent, NodeAlign, SankeyGraph, SankeyLayout, SankeyOptions};
use crate::core::models::FeeGraph;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Default canvas width
pub const DEFAULT_WIDTH: f64 = 928.0;
/// Default canvas height
pub const DEFAULT_HEIGHT: f64 = 600.0;
/// Horizontal thickness of node rectangles
pub const NODE_WIDTH: f64 = 15.0;
/// Minimum vertical gap between stacked nodes
pub const NODE_PADDING: f64 = 10.0;
/// Horizontal inset of the layout from the canvas edge
pub const INSET_X: f64 = 1.0;
/// Vertical inset of the layout from the canvas edge
pub const INSET_Y: f64 = 5.0;
/// Distance between a node edge and its label
pub const LABEL_OFFSET: f64 = 6.0;
/// Opacity of link strokes
pub const LINK_OPACITY: f64 = 0.5;

/// Everything a render pass needs besides the graph itself
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Canvas width in logical units
    pub width: f64,
    /// Canvas height in logical units
    pub height: f64,
    /// Layout engine configured for this canvas
    pub layout: SankeyLayout,
    /// Palette for node categories
    pub scheme: Scheme,
    /// Page title used by the HTML output
    pub title: String,
}

impl RenderContext {
    /// Context for a `width` x `height` canvas with the standard node geometry
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            layout: SankeyLayout::new(SankeyOptions {
                node_width: NODE_WIDTH,
                node_padding: NODE_PADDING,
                extent: Extent::inset(width, height, INSET_X, INSET_Y),
                align: NodeAlign::Justify,
                iterations: 6,
            }),
            scheme: Scheme::default(),
            title: String::from("Fee Breakdown"),
        }
    }

    /// Replace the layout options, keeping the canvas
    #[must_use]
    pub fn with_layout(mut self, options: SankeyOptions) -> Self {
        self.layout = SankeyLayout::new(options);
        self
    }

    /// Replace the alignment policy
    #[must_use]
    pub fn with_align(self, align: NodeAlign) -> Self {
        let options = SankeyOptions {
            align,
            ..*self.layout.options()
        };
        self.with_layout(options)
    }

    /// Replace the color scheme
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Replace the HTML page title
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// A node rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Rectangle width
    pub width: f64,
    /// Rectangle height
    pub height: f64,
    /// Fill color
    pub fill: &'static str,
    /// Hover tooltip
    pub tooltip: String,
}

/// A link band drawn as a stroked curve
#[derive(Debug, Clone, PartialEq)]
pub struct LinkShape {
    /// SVG path data
    pub d: String,
    /// Stroke color (the source node's color)
    pub stroke: &'static str,
    /// Stroke width, never below 1
    pub stroke_width: f64,
    /// Hover tooltip
    pub tooltip: String,
}

/// Side of the node a label sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Label to the right of the node, text growing rightwards
    Start,
    /// Label to the left of the node, text growing leftwards
    End,
}

impl Anchor {
    /// SVG `text-anchor` value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// A node label
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Anchor x
    pub x: f64,
    /// Vertical centre of the node
    pub y: f64,
    /// Text alignment
    pub anchor: Anchor,
    /// Label text
    pub text: String,
}

/// A laid-out diagram ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Page title
    pub title: String,
    /// Node rectangles in node order
    pub nodes: Vec<NodeShape>,
    /// Link curves in link order
    pub links: Vec<LinkShape>,
    /// Node labels in node order
    pub labels: Vec<Label>,
}

impl Diagram {
    /// Lay out `graph` and convert it into shapes
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if the graph cannot be laid out.
    pub fn build(graph: &FeeGraph, ctx: &RenderContext) -> Result<Self, LayoutError> {
        let layout = ctx.layout.compute(graph)?;
        Ok(Self::from_layout(&layout, ctx))
    }

    /// Convert an existing layout into shapes
    #[must_use]
    pub fn from_layout(layout: &SankeyGraph, ctx: &RenderContext) -> Self {
        let mut colors = ColorScale::new(ctx.scheme);

        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeShape {
                x: node.x0,
                y: node.y0,
                width: node.width(),
                height: node.height_px(),
                fill: colors.color(&node.category),
                tooltip: format!("{}\nValue: {}", node.name, format_value(node.value)),
            })
            .collect();

        let links = layout
            .links
            .iter()
            .map(|link| {
                let source = layout.source(link);
                let target = layout.target(link);
                LinkShape {
                    d: link_horizontal(layout, link),
                    stroke: colors.color(&source.category),
                    stroke_width: link.width.max(1.0),
                    tooltip: format!(
                        "{} → {}\nValue: {}",
                        source.name,
                        target.name,
                        format_value(link.value)
                    ),
                }
            })
            .collect();

        let half = ctx.width / 2.0;
        let labels = layout
            .nodes
            .iter()
            .map(|node| {
                let (x, anchor) = if node.x0 < half {
                    (node.x1 + LABEL_OFFSET, Anchor::Start)
                } else {
                    (node.x0 - LABEL_OFFSET, Anchor::End)
                };
                Label {
                    x,
                    y: (node.y0 + node.y1) / 2.0,
                    anchor,
                    text: node.name.clone(),
                }
            })
            .collect();

        Self {
            width: ctx.width,
            height: ctx.height,
            title: ctx.title.clone(),
            nodes,
            links,
            labels,
        }
    }
}

/// Serializer for a laid-out diagram
pub trait DiagramRenderer {
    /// Render the diagram to a string
    ///
    /// # Errors
    /// Returns an error if template rendering fails
    fn render(&self, diagram: &Diagram) -> Result<String, RenderError>;

    /// Render the diagram and write it to a file
    ///
    /// # Errors
    /// Returns an error if rendering or writing fails
    fn generate(&self, diagram: &Diagram, output_path: &Path) -> Result<(), RenderError> {
        let content = self.render(diagram)?;
        fs::write(output_path, content).map_err(|source| RenderError::Write {
            path: output_path.to_path_buf(),
            source,
        })
    }
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Standalone SVG document
    #[default]
    Svg,
    /// HTML page with the SVG inlined
    Html,
}

impl OutputFormat {
    /// File extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Html => "html",
        }
    }

    /// Renderer producing this format
    #[must_use]
    pub fn renderer(self) -> Box<dyn DiagramRenderer> {
        match self {
            Self::Svg => Box::new(SvgRenderer::new()),
            Self::Html => Box::new(HtmlRenderer::new()),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "html" | "htm" => Ok(Self::Html),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Svg => write!(f, "svg"),
            Self::Html => write!(f, "html"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health_graph() -> FeeGraph {
        let mut graph = FeeGraph::new();
        graph.add_node("Auxiliary Comprehensive Fee", "Fee", 100.0);
        graph.add_node("Health Fee", "Health", 100.0);
        graph.add_link(0, 1, 100.0);
        graph
    }

    #[test]
    fn test_context_extent() {
        let ctx = RenderContext::default();
        let options = ctx.layout.options();
        assert_eq!(options.extent, Extent::new(1.0, 5.0, 927.0, 595.0));
        assert!((options.node_width - 15.0).abs() < f64::EPSILON);
        assert!((options.node_padding - 10.0).abs() < f64::EPSILON);
        assert_eq!(options.align, NodeAlign::Justify);
    }

    #[test]
    fn test_with_align_keeps_geometry() {
        let ctx = RenderContext::default().with_align(NodeAlign::Left);
        assert_eq!(ctx.layout.options().align, NodeAlign::Left);
        assert_eq!(
            ctx.layout.options().extent,
            Extent::new(1.0, 5.0, 927.0, 595.0)
        );
    }

    #[test]
    fn test_diagram_shapes() {
        let diagram = Diagram::build(&health_graph(), &RenderContext::default()).unwrap();
        assert_eq!(diagram.nodes.len(), 2);
        assert_eq!(diagram.links.len(), 1);
        assert_eq!(diagram.labels.len(), 2);

        assert_eq!(diagram.nodes[0].fill, "#1f77b4");
        assert_eq!(diagram.nodes[1].fill, "#ff7f0e");
        assert_eq!(diagram.links[0].stroke, diagram.nodes[0].fill);
        assert_eq!(diagram.nodes[1].tooltip, "Health Fee\nValue: 100");
        assert_eq!(
            diagram.links[0].tooltip,
            "Auxiliary Comprehensive Fee → Health Fee\nValue: 100"
        );
        assert_eq!(diagram.links[0].d, "M16,300C464,300,464,300,912,300");
    }

    #[test]
    fn test_label_sides() {
        let diagram = Diagram::build(&health_graph(), &RenderContext::default()).unwrap();
        let left = &diagram.labels[0];
        assert_eq!(left.anchor, Anchor::Start);
        assert!((left.x - 22.0).abs() < 1e-9);
        assert!((left.y - 300.0).abs() < 1e-9);

        let right = &diagram.labels[1];
        assert_eq!(right.anchor, Anchor::End);
        assert!((right.x - 906.0).abs() < 1e-9);
    }

    #[test]
    fn test_thin_links_stay_visible() {
        let mut graph = FeeGraph::new();
        graph.add_node("Root", "Fee", 0.0);
        graph.add_node("Big", "A", 0.0);
        graph.add_node("Tiny", "B", 0.0);
        graph.add_link(0, 1, 1_000_000.0);
        graph.add_link(0, 2, 0.01);
        let diagram = Diagram::build(&graph, &RenderContext::default()).unwrap();
        assert!((diagram.links[1].stroke_width - 1.0).abs() < f64::EPSILON);
        assert!(diagram.links[0].stroke_width > 1.0);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("SVG".parse::<OutputFormat>(), Ok(OutputFormat::Svg));
        assert_eq!("htm".parse::<OutputFormat>(), Ok(OutputFormat::Html));
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Html.extension(), "html");
        assert_eq!(OutputFormat::Svg.to_string(), "svg");
    }
}
