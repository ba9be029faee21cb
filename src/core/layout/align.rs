//! Horizontal node alignment policies

use super::{LayoutLink, LayoutNode};
use std::fmt;
use std::str::FromStr;

/// Rule assigning each node to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeAlign {
    /// Column = depth from the sources
    Left,
    /// Column = distance from the sinks, counted from the right edge
    Right,
    /// Like `Left`, but sources sit one column before their nearest target
    Center,
    /// Like `Left`, but sinks are pushed to the last column
    #[default]
    Justify,
}

impl NodeAlign {
    /// Column index for `nodes[index]` given `columns` total columns
    ///
    /// The result is clamped to `0..columns`.
    #[must_use]
    pub fn column(
        self,
        index: usize,
        nodes: &[LayoutNode],
        links: &[LayoutLink],
        columns: usize,
    ) -> usize {
        let node = &nodes[index];
        let last = columns.saturating_sub(1);
        let column = match self {
            Self::Left => node.depth,
            Self::Right => last.saturating_sub(node.height),
            Self::Justify => {
                if node.source_links.is_empty() {
                    last
                } else {
                    node.depth
                }
            }
            Self::Center => {
                if node.target_links.is_empty() {
                    node.source_links
                        .iter()
                        .map(|&l| nodes[links[l].target].depth)
                        .min()
                        .map_or(0, |d| d.saturating_sub(1))
                } else {
                    node.depth
                }
            }
        };
        column.min(last)
    }
}

impl FromStr for NodeAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" | "centre" => Ok(Self::Center),
            "justify" => Ok(Self::Justify),
            _ => Err(format!("Unknown node alignment: {s}")),
        }
    }
}

impl fmt::Display for NodeAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Center => write!(f, "center"),
            Self::Justify => write!(f, "justify"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(depth: usize, height: usize, sources: Vec<usize>, targets: Vec<usize>) -> LayoutNode {
        LayoutNode {
            depth,
            height,
            source_links: sources,
            target_links: targets,
            ..LayoutNode::default()
        }
    }

    /// A source at depth 0 linked to a sink at depth 1, plus an isolated node.
    fn two_node_chain() -> (Vec<LayoutNode>, Vec<LayoutLink>) {
        let nodes = vec![
            node(0, 1, vec![0], vec![]),
            node(1, 0, vec![], vec![0]),
            node(0, 0, vec![], vec![]),
        ];
        let links = vec![LayoutLink {
            source: 0,
            target: 1,
            ..LayoutLink::default()
        }];
        (nodes, links)
    }

    #[test]
    fn test_justify_pushes_sinks_right() {
        let (nodes, links) = two_node_chain();
        assert_eq!(NodeAlign::Justify.column(1, &nodes, &links, 3), 2);
        assert_eq!(NodeAlign::Justify.column(0, &nodes, &links, 3), 0);
        assert_eq!(NodeAlign::Left.column(1, &nodes, &links, 3), 1);
    }

    #[test]
    fn test_right_uses_height() {
        let (nodes, links) = two_node_chain();
        assert_eq!(NodeAlign::Right.column(0, &nodes, &links, 3), 1);
        assert_eq!(NodeAlign::Right.column(1, &nodes, &links, 3), 2);
    }

    #[test]
    fn test_center_places_source_before_target() {
        let (mut nodes, links) = two_node_chain();
        nodes[1].depth = 2;
        assert_eq!(NodeAlign::Center.column(0, &nodes, &links, 3), 1);
        assert_eq!(NodeAlign::Center.column(2, &nodes, &links, 3), 0);
    }

    #[test]
    fn test_parse_and_display() {
        for align in [
            NodeAlign::Left,
            NodeAlign::Right,
            NodeAlign::Center,
            NodeAlign::Justify,
        ] {
            assert_eq!(align.to_string().parse::<NodeAlign>(), Ok(align));
        }
        assert!("middle".parse::<NodeAlign>().is_err());
    }
}
