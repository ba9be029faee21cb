//! Flat node/link graph produced by the wrangler

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the fee flow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Dense id, equal to the node's position in [`FeeGraph::nodes`]
    pub id: usize,
    /// Display name
    pub name: String,
    /// Category used to pick the fill color
    pub category: String,
    /// Tooltip title
    pub title: String,
    /// Sum of the flow through this node
    pub value: f64,
}

/// A flow from one node to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Id of the source node
    pub source: usize,
    /// Id of the target node
    pub target: usize,
    /// Flow magnitude
    pub value: f64,
}

/// Node and link lists ready for layout
///
/// Ids are assigned in insertion order starting at 0, so `nodes[id].id == id`
/// holds for every node added through [`FeeGraph::add_node`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeGraph {
    /// All nodes, indexed by id
    pub nodes: Vec<Node>,
    /// All links
    pub links: Vec<Link>,
}

impl FeeGraph {
    /// Create an empty graph
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Append a node and return its id
    pub fn add_node(&mut self, name: &str, category: &str, value: f64) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            name: name.to_string(),
            category: category.to_string(),
            title: name.to_string(),
            value,
        });
        id
    }

    /// Append a link between two existing node ids
    pub fn add_link(&mut self, source: usize, target: usize, value: f64) {
        self.links.push(Link {
            source,
            target,
            value,
        });
    }

    /// Look up a node by id
    #[must_use]
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id).filter(|n| n.id == id)
    }

    /// Mutable lookup of a node by id
    pub fn node_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|n| n.id == id)
    }

    /// Ids referenced by links that have no matching node
    #[must_use]
    pub fn dangling_ids(&self) -> Vec<usize> {
        let mut missing: Vec<usize> = self
            .links
            .iter()
            .flat_map(|l| [l.source, l.target])
            .filter(|id| self.node(*id).is_none())
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

impl fmt::Display for FeeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Fee graph ({} nodes, {} links):",
            self.nodes.len(),
            self.links.len()
        )?;
        for node in &self.nodes {
            writeln!(
                f,
                "  [{}] {} ({}) = {}",
                node.id, node.name, node.category, node.value
            )?;
        }
        for link in &self.links {
            writeln!(f, "  {} -> {} : {}", link.source, link.target, link.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense() {
        let mut graph = FeeGraph::new();
        assert_eq!(graph.add_node("Root", "Fee", 0.0), 0);
        assert_eq!(graph.add_node("Child", "Health", 5.0), 1);
        assert_eq!(graph.node(1).map(|n| n.name.as_str()), Some("Child"));
        assert!(graph.node(2).is_none());
    }

    #[test]
    fn test_title_matches_name() {
        let mut graph = FeeGraph::new();
        let id = graph.add_node("Athletics", "Athletics", 900.0);
        assert_eq!(graph.nodes[id].title, "Athletics");
    }

    #[test]
    fn test_dangling_ids() {
        let mut graph = FeeGraph::new();
        graph.add_node("Root", "Fee", 0.0);
        graph.add_link(0, 3, 1.0);
        graph.add_link(7, 3, 1.0);
        assert_eq!(graph.dangling_ids(), vec![3, 7]);
    }

    #[test]
    fn test_display() {
        let mut graph = FeeGraph::new();
        graph.add_node("Root", "Fee", 10.0);
        graph.add_node("Leaf", "Health", 10.0);
        graph.add_link(0, 1, 10.0);
        let text = graph.to_string();
        assert!(text.contains("2 nodes, 1 links"));
        assert!(text.contains("0 -> 1 : 10"));
    }
}
