//! Sankey layout engine
//!
//! Computes node rectangles and link bands for a [`FeeGraph`], following the
//! d3-sankey algorithm: columns by depth and alignment policy, an initial
//! value-proportional stacking per column, then a few rounds of relaxation
//! that pull each node toward the weighted centre of its neighbours while
//! resolving overlaps.
//!
//! The input graph is never modified; nodes and links are copied into
//! [`LayoutNode`]/[`LayoutLink`] records owned by the returned [`SankeyGraph`].

#![allow(clippy::cast_precision_loss)]

pub mod align;

pub use align::NodeAlign;

use crate::core::error::LayoutError;
use crate::core::models::FeeGraph;
use logger::debug;
use std::collections::HashMap;

/// A node with its computed geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutNode {
    /// Id from the input graph
    pub id: usize,
    /// Display name
    pub name: String,
    /// Color category
    pub category: String,
    /// Tooltip title
    pub title: String,
    /// Flow through the node: max of incoming and outgoing totals
    pub value: f64,
    /// Longest path from any source
    pub depth: usize,
    /// Longest path to any sink
    pub height: usize,
    /// Column assigned by the alignment policy
    pub layer: usize,
    /// Left edge
    pub x0: f64,
    /// Right edge
    pub x1: f64,
    /// Top edge
    pub y0: f64,
    /// Bottom edge
    pub y1: f64,
    /// Indices into [`SankeyGraph::links`] of links leaving this node, top to bottom
    pub source_links: Vec<usize>,
    /// Indices into [`SankeyGraph::links`] of links entering this node, top to bottom
    pub target_links: Vec<usize>,
}

impl LayoutNode {
    /// Rectangle width
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Rectangle height
    #[must_use]
    pub fn height_px(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// A link with its computed band
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutLink {
    /// Position in the input link list
    pub index: usize,
    /// Index into [`SankeyGraph::nodes`] of the source node
    pub source: usize,
    /// Index into [`SankeyGraph::nodes`] of the target node
    pub target: usize,
    /// Flow magnitude
    pub value: f64,
    /// Band thickness
    pub width: f64,
    /// Band centre at the source node
    pub y0: f64,
    /// Band centre at the target node
    pub y1: f64,
}

/// Result of a layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SankeyGraph {
    /// Nodes in input order
    pub nodes: Vec<LayoutNode>,
    /// Links in input order
    pub links: Vec<LayoutLink>,
}

impl SankeyGraph {
    /// Source node of a link
    #[must_use]
    pub fn source(&self, link: &LayoutLink) -> &LayoutNode {
        &self.nodes[link.source]
    }

    /// Target node of a link
    #[must_use]
    pub fn target(&self, link: &LayoutLink) -> &LayoutNode {
        &self.nodes[link.target]
    }

    /// Number of columns used
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.nodes.iter().map(|n| n.layer + 1).max().unwrap_or(0)
    }
}

/// Rectangle the layout must fit in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Left
    pub x0: f64,
    /// Top
    pub y0: f64,
    /// Right
    pub x1: f64,
    /// Bottom
    pub y1: f64,
}

impl Extent {
    /// Create an extent from two corners
    #[must_use]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// A `width` x `height` canvas shrunk by `dx` on the left/right and `dy` on the top/bottom
    #[must_use]
    pub fn inset(width: f64, height: f64, dx: f64, dy: f64) -> Self {
        Self::new(dx, dy, width - dx, height - dy)
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

/// Layout parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SankeyOptions {
    /// Horizontal thickness of every node
    pub node_width: f64,
    /// Minimum vertical gap between nodes of a column
    pub node_padding: f64,
    /// Bounds of the layout
    pub extent: Extent,
    /// Column assignment policy
    pub align: NodeAlign,
    /// Number of relaxation rounds
    pub iterations: usize,
}

impl Default for SankeyOptions {
    fn default() -> Self {
        Self {
            node_width: 24.0,
            node_padding: 8.0,
            extent: Extent::default(),
            align: NodeAlign::Justify,
            iterations: 6,
        }
    }
}

/// Sankey layout generator
#[derive(Debug, Clone, Default)]
pub struct SankeyLayout {
    options: SankeyOptions,
}

impl SankeyLayout {
    /// Create a layout generator
    #[must_use]
    pub const fn new(options: SankeyOptions) -> Self {
        Self { options }
    }

    /// The configured options
    #[must_use]
    pub const fn options(&self) -> &SankeyOptions {
        &self.options
    }

    /// Lay out a graph
    ///
    /// Links are matched to nodes by node id. A column whose nodes carry no flow
    /// gets zero-height nodes spread evenly down the extent, and a single-column
    /// graph sits at the left edge of the extent.
    ///
    /// # Errors
    /// Returns [`LayoutError::MissingNode`] if a link names an unknown id and
    /// [`LayoutError::CircularLink`] if the graph has a cycle.
    pub fn compute(&self, graph: &FeeGraph) -> Result<SankeyGraph, LayoutError> {
        let mut solver = Solver::new(&self.options, graph)?;
        if solver.nodes.is_empty() {
            return Ok(SankeyGraph::default());
        }
        solver.compute_node_values();
        solver.compute_node_depths()?;
        solver.compute_node_heights()?;
        solver.compute_node_breadths();
        solver.compute_link_breadths();

        debug!(
            "Sankey layout: {} nodes, {} links",
            solver.nodes.len(),
            solver.links.len()
        );
        Ok(SankeyGraph {
            nodes: solver.nodes,
            links: solver.links,
        })
    }
}

/// Working state of one layout pass
struct Solver<'a> {
    options: &'a SankeyOptions,
    nodes: Vec<LayoutNode>,
    links: Vec<LayoutLink>,
    /// Effective node padding, shrunk when a column would not otherwise fit
    py: f64,
}

impl<'a> Solver<'a> {
    /// Copy the graph and resolve link endpoints by id
    fn new(options: &'a SankeyOptions, graph: &FeeGraph) -> Result<Self, LayoutError> {
        let mut nodes: Vec<LayoutNode> = graph
            .nodes
            .iter()
            .map(|n| LayoutNode {
                id: n.id,
                name: n.name.clone(),
                category: n.category.clone(),
                title: n.title.clone(),
                value: n.value,
                ..LayoutNode::default()
            })
            .collect();
        let index_by_id: HashMap<usize, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        let mut links = Vec::with_capacity(graph.links.len());
        for (index, link) in graph.links.iter().enumerate() {
            let source = *index_by_id
                .get(&link.source)
                .ok_or(LayoutError::MissingNode(link.source))?;
            let target = *index_by_id
                .get(&link.target)
                .ok_or(LayoutError::MissingNode(link.target))?;
            nodes[source].source_links.push(index);
            nodes[target].target_links.push(index);
            links.push(LayoutLink {
                index,
                source,
                target,
                value: link.value,
                ..LayoutLink::default()
            });
        }

        Ok(Self {
            options,
            nodes,
            links,
            py: options.node_padding,
        })
    }

    fn compute_node_values(&mut self) {
        for node in &mut self.nodes {
            let outgoing: f64 = node.source_links.iter().map(|&l| self.links[l].value).sum();
            let incoming: f64 = node.target_links.iter().map(|&l| self.links[l].value).sum();
            node.value = outgoing.max(incoming);
        }
    }

    fn compute_node_depths(&mut self) -> Result<(), LayoutError> {
        let n = self.nodes.len();
        let mut current: Vec<usize> = (0..n).collect();
        let mut depth = 0;
        while !current.is_empty() {
            let mut seen = vec![false; n];
            let mut next = Vec::new();
            for &i in &current {
                self.nodes[i].depth = depth;
                for &l in &self.nodes[i].source_links {
                    let target = self.links[l].target;
                    if !seen[target] {
                        seen[target] = true;
                        next.push(target);
                    }
                }
            }
            depth += 1;
            if depth > n {
                return Err(LayoutError::CircularLink);
            }
            current = next;
        }
        Ok(())
    }

    fn compute_node_heights(&mut self) -> Result<(), LayoutError> {
        let n = self.nodes.len();
        let mut current: Vec<usize> = (0..n).collect();
        let mut height = 0;
        while !current.is_empty() {
            let mut seen = vec![false; n];
            let mut next = Vec::new();
            for &i in &current {
                self.nodes[i].height = height;
                for &l in &self.nodes[i].target_links {
                    let source = self.links[l].source;
                    if !seen[source] {
                        seen[source] = true;
                        next.push(source);
                    }
                }
            }
            height += 1;
            if height > n {
                return Err(LayoutError::CircularLink);
            }
            current = next;
        }
        Ok(())
    }

    /// Assign columns and x positions; returns node indices per column
    fn compute_node_layers(&mut self) -> Vec<Vec<usize>> {
        let opts = self.options;
        let count = self.nodes.iter().map(|n| n.depth).max().map_or(0, |d| d + 1);
        let kx = if count > 1 {
            (opts.extent.x1 - opts.extent.x0 - opts.node_width) / (count - 1) as f64
        } else {
            0.0
        };

        let mut columns = vec![Vec::new(); count];
        for i in 0..self.nodes.len() {
            let layer = opts.align.column(i, &self.nodes, &self.links, count);
            let node = &mut self.nodes[i];
            node.layer = layer;
            node.x0 = opts.extent.x0 + layer as f64 * kx;
            node.x1 = node.x0 + opts.node_width;
            columns[layer].push(i);
        }
        columns
    }

    fn compute_node_breadths(&mut self) {
        let mut columns = self.compute_node_layers();
        let extent = self.options.extent;
        let max_len = columns.iter().map(Vec::len).max().unwrap_or(0);
        self.py = if max_len > 1 {
            self.options
                .node_padding
                .min((extent.y1 - extent.y0) / (max_len - 1) as f64)
        } else {
            self.options.node_padding
        };

        self.initialize_node_breadths(&columns);

        let iterations = self.options.iterations;
        let mut alpha: f64 = 1.0;
        for i in 0..iterations {
            let beta = (1.0 - alpha).max((i + 1) as f64 / iterations as f64);
            self.relax_right_to_left(&mut columns, alpha, beta);
            self.relax_left_to_right(&mut columns, alpha, beta);
            alpha *= 0.99;
        }
    }

    fn initialize_node_breadths(&mut self, columns: &[Vec<usize>]) {
        let extent = self.options.extent;
        let py = self.py;

        let ky = columns
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| {
                let total: f64 = c.iter().map(|&i| self.nodes[i].value).sum();
                (extent.y1 - extent.y0 - (c.len() - 1) as f64 * py) / total
            })
            .filter(|k| k.is_finite())
            .fold(None, |acc: Option<f64>, k| Some(acc.map_or(k, |a| a.min(k))))
            .unwrap_or(0.0);

        for column in columns {
            let mut y = extent.y0;
            for &i in column {
                let node = &mut self.nodes[i];
                node.y0 = y;
                node.y1 = y + node.value * ky;
                y = node.y1 + py;
                for &l in &self.nodes[i].source_links {
                    self.links[l].width = self.links[l].value * ky;
                }
            }
            let gap = (extent.y1 - y + py) / (column.len() + 1) as f64;
            for (k, &i) in column.iter().enumerate() {
                let shift = gap * (k + 1) as f64;
                self.nodes[i].y0 += shift;
                self.nodes[i].y1 += shift;
            }
            for &i in column {
                self.sort_source_links(i);
                self.sort_target_links(i);
            }
        }
    }

    /// Move each node toward the weighted position implied by its incoming links
    fn relax_left_to_right(&mut self, columns: &mut [Vec<usize>], alpha: f64, beta: f64) {
        for column in columns.iter_mut().skip(1) {
            for &target in column.iter() {
                let mut y = 0.0;
                let mut w = 0.0;
                for &l in &self.nodes[target].target_links {
                    let link = &self.links[l];
                    let v = link.value * self.layer_span(link.source, target);
                    y += self.target_top(link.source, target) * v;
                    w += v;
                }
                if w > 0.0 {
                    let dy = (y / w - self.nodes[target].y0) * alpha;
                    self.shift(target, dy);
                    self.reorder_node_links(target);
                }
            }
            self.sort_column(column);
            self.resolve_collisions(column, beta);
        }
    }

    /// Move each node toward the weighted position implied by its outgoing links
    fn relax_right_to_left(&mut self, columns: &mut [Vec<usize>], alpha: f64, beta: f64) {
        let n = columns.len();
        for column in columns.iter_mut().take(n.saturating_sub(1)).rev() {
            for &source in column.iter() {
                let mut y = 0.0;
                let mut w = 0.0;
                for &l in &self.nodes[source].source_links {
                    let link = &self.links[l];
                    let v = link.value * self.layer_span(source, link.target);
                    y += self.source_top(source, link.target) * v;
                    w += v;
                }
                if w > 0.0 {
                    let dy = (y / w - self.nodes[source].y0) * alpha;
                    self.shift(source, dy);
                    self.reorder_node_links(source);
                }
            }
            self.sort_column(column);
            self.resolve_collisions(column, beta);
        }
    }

    fn layer_span(&self, source: usize, target: usize) -> f64 {
        self.nodes[target].layer as f64 - self.nodes[source].layer as f64
    }

    fn shift(&mut self, i: usize, dy: f64) {
        self.nodes[i].y0 += dy;
        self.nodes[i].y1 += dy;
    }

    fn sort_column(&self, column: &mut [usize]) {
        column.sort_by(|&a, &b| self.nodes[a].y0.total_cmp(&self.nodes[b].y0));
    }

    fn resolve_collisions(&mut self, column: &[usize], alpha: f64) {
        if column.is_empty() {
            return;
        }
        let mid = column.len() >> 1;
        let subject = &self.nodes[column[mid]];
        let (above, below) = (subject.y0 - self.py, subject.y1 + self.py);
        self.push_up(&column[..mid], above, alpha);
        self.push_down(&column[mid + 1..], below, alpha);
        self.push_up(column, self.options.extent.y1, alpha);
        self.push_down(column, self.options.extent.y0, alpha);
    }

    /// Push overlapping nodes down, walking top to bottom
    fn push_down(&mut self, nodes: &[usize], mut y: f64, alpha: f64) {
        for &i in nodes {
            let dy = (y - self.nodes[i].y0) * alpha;
            if dy > 1e-6 {
                self.shift(i, dy);
            }
            y = self.nodes[i].y1 + self.py;
        }
    }

    /// Push overlapping nodes up, walking bottom to top
    fn push_up(&mut self, nodes: &[usize], mut y: f64, alpha: f64) {
        for &i in nodes.iter().rev() {
            let dy = (self.nodes[i].y1 - y) * alpha;
            if dy > 1e-6 {
                self.shift(i, -dy);
            }
            y = self.nodes[i].y0 - self.py;
        }
    }

    /// Re-sort the link lists of every neighbour of node `i`
    fn reorder_node_links(&mut self, i: usize) {
        let incoming = self.nodes[i].target_links.clone();
        for l in incoming {
            self.sort_source_links(self.links[l].source);
        }
        let outgoing = self.nodes[i].source_links.clone();
        for l in outgoing {
            self.sort_target_links(self.links[l].target);
        }
    }

    /// Order a node's outgoing links by the vertical position of their targets
    fn sort_source_links(&mut self, i: usize) {
        let mut ids = std::mem::take(&mut self.nodes[i].source_links);
        ids.sort_by(|&a, &b| {
            let (ta, tb) = (self.links[a].target, self.links[b].target);
            self.nodes[ta]
                .y0
                .total_cmp(&self.nodes[tb].y0)
                .then(a.cmp(&b))
        });
        self.nodes[i].source_links = ids;
    }

    /// Order a node's incoming links by the vertical position of their sources
    fn sort_target_links(&mut self, i: usize) {
        let mut ids = std::mem::take(&mut self.nodes[i].target_links);
        ids.sort_by(|&a, &b| {
            let (sa, sb) = (self.links[a].source, self.links[b].source);
            self.nodes[sa]
                .y0
                .total_cmp(&self.nodes[sb].y0)
                .then(a.cmp(&b))
        });
        self.nodes[i].target_links = ids;
    }

    /// The `y0` of `target` that would make the link from `source` perfectly horizontal
    fn target_top(&self, source: usize, target: usize) -> f64 {
        let src = &self.nodes[source];
        let mut y = src.y0 - (src.source_links.len() as f64 - 1.0) * self.py / 2.0;
        for &l in &src.source_links {
            let link = &self.links[l];
            if link.target == target {
                break;
            }
            y += link.width + self.py;
        }
        for &l in &self.nodes[target].target_links {
            let link = &self.links[l];
            if link.source == source {
                break;
            }
            y -= link.width;
        }
        y
    }

    /// The `y0` of `source` that would make the link to `target` perfectly horizontal
    fn source_top(&self, source: usize, target: usize) -> f64 {
        let tgt = &self.nodes[target];
        let mut y = tgt.y0 - (tgt.target_links.len() as f64 - 1.0) * self.py / 2.0;
        for &l in &tgt.target_links {
            let link = &self.links[l];
            if link.source == source {
                break;
            }
            y += link.width + self.py;
        }
        for &l in &self.nodes[source].source_links {
            let link = &self.links[l];
            if link.target == target {
                break;
            }
            y -= link.width;
        }
        y
    }

    fn compute_link_breadths(&mut self) {
        for node in &self.nodes {
            let mut y0 = node.y0;
            for &l in &node.source_links {
                let link = &mut self.links[l];
                link.y0 = y0 + link.width / 2.0;
                y0 += link.width;
            }
            let mut y1 = node.y0;
            for &l in &node.target_links {
                let link = &mut self.links[l];
                link.y1 = y1 + link.width / 2.0;
                y1 += link.width;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SankeyOptions {
        SankeyOptions {
            node_width: 15.0,
            node_padding: 10.0,
            extent: Extent::inset(928.0, 600.0, 1.0, 5.0),
            align: NodeAlign::Justify,
            iterations: 6,
        }
    }

    fn fan_out(amounts: &[f64]) -> FeeGraph {
        let mut graph = FeeGraph::new();
        let root = graph.add_node("Root", "Fee", amounts.iter().sum());
        for (i, &amount) in amounts.iter().enumerate() {
            let child = graph.add_node(&format!("Child {i}"), "Part", amount);
            graph.add_link(root, child, amount);
        }
        graph
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_single_link_fills_extent() {
        let layout = SankeyLayout::new(options()).compute(&fan_out(&[100.0])).unwrap();
        let root = &layout.nodes[0];
        let leaf = &layout.nodes[1];

        assert!(close(root.x0, 1.0) && close(root.x1, 16.0));
        assert!(close(leaf.x0, 912.0) && close(leaf.x1, 927.0));
        assert!(close(root.y0, 5.0) && close(root.y1, 595.0));
        assert!(close(leaf.y0, 5.0) && close(leaf.y1, 595.0));

        let link = &layout.links[0];
        assert!(close(link.width, 590.0));
        assert!(close(link.y0, 300.0) && close(link.y1, 300.0));
    }

    #[test]
    fn test_empty_graph() {
        let layout = SankeyLayout::new(options()).compute(&FeeGraph::new()).unwrap();
        assert!(layout.nodes.is_empty());
        assert_eq!(layout.column_count(), 0);
    }

    #[test]
    fn test_lone_zero_node_is_centered() {
        let mut graph = FeeGraph::new();
        graph.add_node("Root", "Fee", 0.0);
        let layout = SankeyLayout::new(options()).compute(&graph).unwrap();
        let root = &layout.nodes[0];
        assert!(close(root.x0, 1.0) && close(root.x1, 16.0));
        assert!(close(root.y0, 300.0) && close(root.y1, 300.0));
        assert!(root.y0.is_finite());
    }

    #[test]
    fn test_children_do_not_overlap() {
        let layout = SankeyLayout::new(options())
            .compute(&fan_out(&[500.0, 20.0, 1200.0, 0.5, 75.0]))
            .unwrap();
        let mut leaves: Vec<&LayoutNode> = layout.nodes.iter().skip(1).collect();
        leaves.sort_by(|a, b| a.y0.total_cmp(&b.y0));
        for pair in leaves.windows(2) {
            assert!(pair[1].y0 >= pair[0].y1 + 10.0 - 1e-6);
        }
        for node in &layout.nodes {
            assert!(node.y0 >= 5.0 - 1e-6 && node.y1 <= 595.0 + 1e-6);
        }
    }

    #[test]
    fn test_link_widths_proportional_to_value() {
        let layout = SankeyLayout::new(options())
            .compute(&fan_out(&[300.0, 100.0]))
            .unwrap();
        let ratio = layout.links[0].width / layout.links[1].width;
        assert!(close(ratio, 3.0));
        let root = &layout.nodes[0];
        let total: f64 = layout.links.iter().map(|l| l.width).sum();
        assert!(close(total, root.height_px()));
    }

    #[test]
    fn test_node_value_recomputed_from_links() {
        let mut graph = fan_out(&[40.0, 60.0]);
        graph.nodes[0].value = 0.0;
        let layout = SankeyLayout::new(options()).compute(&graph).unwrap();
        assert!(close(layout.nodes[0].value, 100.0));
    }

    #[test]
    fn test_missing_node() {
        let mut graph = fan_out(&[1.0]);
        graph.add_link(0, 9, 1.0);
        let err = SankeyLayout::new(options()).compute(&graph).unwrap_err();
        assert_eq!(err, LayoutError::MissingNode(9));
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = FeeGraph::new();
        graph.add_node("A", "x", 1.0);
        graph.add_node("B", "x", 1.0);
        graph.add_link(0, 1, 1.0);
        graph.add_link(1, 0, 1.0);
        let err = SankeyLayout::new(options()).compute(&graph).unwrap_err();
        assert_eq!(err, LayoutError::CircularLink);
    }

    #[test]
    fn test_three_level_chain_columns() {
        let mut graph = FeeGraph::new();
        graph.add_node("A", "x", 0.0);
        graph.add_node("B", "x", 0.0);
        graph.add_node("C", "x", 0.0);
        graph.add_node("D", "x", 0.0);
        graph.add_link(0, 1, 5.0);
        graph.add_link(1, 2, 5.0);
        graph.add_link(0, 3, 2.0);

        let layout = SankeyLayout::new(options()).compute(&graph).unwrap();
        assert_eq!(layout.column_count(), 3);
        assert_eq!(layout.nodes[1].layer, 1);
        // Justify pushes the sink D to the last column even though its depth is 1
        assert_eq!(layout.nodes[3].depth, 1);
        assert_eq!(layout.nodes[3].layer, 2);

        let left = SankeyOptions {
            align: NodeAlign::Left,
            ..options()
        };
        let layout = SankeyLayout::new(left).compute(&graph).unwrap();
        assert_eq!(layout.nodes[3].layer, 1);
    }

    #[test]
    fn test_input_graph_untouched() {
        let graph = fan_out(&[10.0, 20.0]);
        let before = graph.clone();
        let _ = SankeyLayout::new(options()).compute(&graph).unwrap();
        assert_eq!(graph, before);
    }
}
