//! Standalone SVG output

use super::format::fmt_num;
use super::{Diagram, DiagramRenderer, LINK_OPACITY};
use crate::core::error::RenderError;
use askama::Template;

struct SvgRect<'a> {
    x: String,
    y: String,
    width: String,
    height: String,
    fill: &'a str,
    tooltip: &'a str,
}

struct SvgPath<'a> {
    d: &'a str,
    stroke: &'a str,
    stroke_width: String,
    tooltip: &'a str,
}

struct SvgText<'a> {
    x: String,
    y: String,
    anchor: &'a str,
    text: &'a str,
}

#[derive(Template)]
#[template(path = "sankey.svg", escape = "html")]
struct SvgTemplate<'a> {
    width: String,
    height: String,
    link_opacity: String,
    nodes: Vec<SvgRect<'a>>,
    links: Vec<SvgPath<'a>>,
    labels: Vec<SvgText<'a>>,
}

impl<'a> SvgTemplate<'a> {
    fn new(diagram: &'a Diagram) -> Self {
        Self {
            width: fmt_num(diagram.width),
            height: fmt_num(diagram.height),
            link_opacity: fmt_num(LINK_OPACITY),
            nodes: diagram
                .nodes
                .iter()
                .map(|n| SvgRect {
                    x: fmt_num(n.x),
                    y: fmt_num(n.y),
                    width: fmt_num(n.width),
                    height: fmt_num(n.height),
                    fill: n.fill,
                    tooltip: &n.tooltip,
                })
                .collect(),
            links: diagram
                .links
                .iter()
                .map(|l| SvgPath {
                    d: &l.d,
                    stroke: l.stroke,
                    stroke_width: fmt_num(l.stroke_width),
                    tooltip: &l.tooltip,
                })
                .collect(),
            labels: diagram
                .labels
                .iter()
                .map(|l| SvgText {
                    x: fmt_num(l.x),
                    y: fmt_num(l.y),
                    anchor: l.anchor.as_str(),
                    text: &l.text,
                })
                .collect(),
        }
    }
}

/// Renders a diagram as a standalone SVG document
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    /// Create a new SVG renderer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DiagramRenderer for SvgRenderer {
    fn render(&self, diagram: &Diagram) -> Result<String, RenderError> {
        Ok(SvgTemplate::new(diagram).render()?)
    }
}
