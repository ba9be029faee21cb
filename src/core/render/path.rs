//! Link path generation

use super::format::fmt_num;
use crate::core::layout::{LayoutLink, SankeyGraph};

/// Cubic Bézier path for a link band's centre line (d3 `sankeyLinkHorizontal`)
///
/// The curve leaves the right edge of the source node at `link.y0` and enters the
/// left edge of the target node at `link.y1`, with both control points at the
/// horizontal midpoint.
#[must_use]
pub fn link_horizontal(graph: &SankeyGraph, link: &LayoutLink) -> String {
    let x0 = graph.source(link).x1;
    let x1 = graph.target(link).x0;
    let mid = (x0 + x1) / 2.0;
    format!(
        "M{},{}C{},{},{},{},{},{}",
        fmt_num(x0),
        fmt_num(link.y0),
        fmt_num(mid),
        fmt_num(link.y0),
        fmt_num(mid),
        fmt_num(link.y1),
        fmt_num(x1),
        fmt_num(link.y1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::LayoutNode;

    #[test]
    fn test_link_horizontal() {
        let graph = SankeyGraph {
            nodes: vec![
                LayoutNode {
                    x0: 1.0,
                    x1: 16.0,
                    ..LayoutNode::default()
                },
                LayoutNode {
                    x0: 912.0,
                    x1: 927.0,
                    ..LayoutNode::default()
                },
            ],
            links: vec![LayoutLink {
                source: 0,
                target: 1,
                y0: 300.0,
                y1: 120.5,
                ..LayoutLink::default()
            }],
        };
        assert_eq!(
            link_horizontal(&graph, &graph.links[0]),
            "M16,300C464,300,464,120.5,912,120.5"
        );
    }
}
