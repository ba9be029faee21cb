//! HTML page output with the SVG inlined

use super::svg::SvgRenderer;
use super::{Diagram, DiagramRenderer};
use crate::core::error::RenderError;
use askama::Template;

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    title: &'a str,
    svg: &'a str,
}

/// Renders a diagram as a self-contained HTML page
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer {
    svg: SvgRenderer,
}

impl HtmlRenderer {
    /// Create a new HTML renderer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            svg: SvgRenderer::new(),
        }
    }
}

impl DiagramRenderer for HtmlRenderer {
    fn render(&self, diagram: &Diagram) -> Result<String, RenderError> {
        let svg = self.svg.render(diagram)?;
        let page = PageTemplate {
            title: &diagram.title,
            svg: &svg,
        };
        Ok(page.render()?)
    }
}
