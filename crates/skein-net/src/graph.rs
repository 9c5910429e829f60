//! Physical connectivity graphs.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An unordered pair of distinct physical nodes.
///
/// Edges are stored normalized with the smaller endpoint first, so `{u, v}`
/// and `{v, u}` compare and hash identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    a: u32,
    b: u32,
}

impl Edge {
    /// Create a normalized edge.
    ///
    /// # Panics
    ///
    /// Panics if `u == v`; self-loops are never meaningful here.
    pub fn new(u: u32, v: u32) -> Self {
        assert_ne!(u, v, "edge endpoints must be distinct");
        Self {
            a: u.min(v),
            b: u.max(v),
        }
    }

    /// The smaller endpoint.
    #[inline]
    pub fn a(&self) -> u32 {
        self.a
    }

    /// The larger endpoint.
    #[inline]
    pub fn b(&self) -> u32 {
        self.b
    }

    /// Both endpoints as a tuple, smaller first.
    #[inline]
    pub fn endpoints(&self) -> (u32, u32) {
        (self.a, self.b)
    }

    /// Check whether `node` is one of the endpoints.
    #[inline]
    pub fn contains(&self, node: u32) -> bool {
        self.a == node || self.b == node
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint.
    pub fn other(&self, node: u32) -> Option<u32> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Relabel both endpoints through `f`, renormalizing the result.
    pub fn map(&self, mut f: impl FnMut(u32) -> u32) -> Self {
        Self::new(f(self.a), f(self.b))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

impl From<(u32, u32)> for Edge {
    fn from((u, v): (u32, u32)) -> Self {
        Edge::new(u, v)
    }
}

/// An undirected connectivity graph over physical nodes `0..num_nodes`.
///
/// Defines which pairs of nodes may participate in a pairwise operation or
/// exchange. Duplicate edges (including reversed pairs) are silently ignored
/// on insertion.
///
/// ## Deserialization
///
/// The adjacency index is skipped during serialization; call
/// [`rebuild_caches()`](Self::rebuild_caches) after deserializing to restore
/// fast neighbor lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouplingGraph {
    /// Number of physical nodes.
    num_nodes: u32,
    /// Normalized edge list.
    edges: Vec<Edge>,
    /// Adjacency index for fast lookup.
    #[serde(skip)]
    adjacency: FxHashMap<u32, Vec<u32>>,
}

impl CouplingGraph {
    /// Create an empty graph over `num_nodes` nodes.
    pub fn new(num_nodes: u32) -> Self {
        Self {
            num_nodes,
            edges: vec![],
            adjacency: FxHashMap::default(),
        }
    }

    /// Create a graph from an edge iterator.
    pub fn from_edges(num_nodes: u32, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut graph = Self::new(num_nodes);
        for (u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    /// Create the graph of a path visiting `nodes` in order.
    ///
    /// The node count is taken from the largest label on the path.
    pub fn path(nodes: &[u32]) -> Self {
        let num_nodes = nodes.iter().copied().max().map_or(0, |m| m + 1);
        let mut graph = Self::new(num_nodes);
        for pair in nodes.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        graph
    }

    /// Create a linear chain `0-1-2-...-(n-1)`.
    pub fn line(n: u32) -> Self {
        let mut graph = Self::new(n);
        for i in 0..n.saturating_sub(1) {
            graph.add_edge(i, i + 1);
        }
        graph
    }

    /// Add an undirected edge. Duplicates are silently ignored.
    pub fn add_edge(&mut self, u: u32, v: u32) {
        let edge = Edge::new(u, v);
        if self.edges.contains(&edge) {
            return;
        }
        self.edges.push(edge);
        self.adjacency.entry(edge.a()).or_default().push(edge.b());
        self.adjacency.entry(edge.b()).or_default().push(edge.a());
    }

    /// Rebuild the adjacency index from the edge list. Must be called after
    /// deserialization to restore neighbor lookups.
    pub fn rebuild_caches(&mut self) {
        self.adjacency.clear();
        for edge in &self.edges {
            self.adjacency.entry(edge.a()).or_default().push(edge.b());
            self.adjacency.entry(edge.b()).or_default().push(edge.a());
        }
    }

    /// Check if two nodes are directly connected.
    #[inline]
    pub fn is_connected(&self, u: u32, v: u32) -> bool {
        self.adjacency
            .get(&u)
            .is_some_and(|neighbors| neighbors.contains(&v))
    }

    /// Check if the graph contains `edge`.
    #[inline]
    pub fn contains(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Number of physical nodes.
    #[inline]
    pub fn num_nodes(&self) -> u32 {
        self.num_nodes
    }

    /// The normalized edge list, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Neighbors of a node.
    pub fn neighbors(&self, node: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency
            .get(&node)
            .map(|v| v.iter().copied())
            .into_iter()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_normalized() {
        assert_eq!(Edge::new(3, 1), Edge::new(1, 3));
        assert_eq!(Edge::new(3, 1).endpoints(), (1, 3));
    }

    #[test]
    #[should_panic(expected = "distinct")]
    fn test_edge_rejects_self_loop() {
        let _ = Edge::new(2, 2);
    }

    #[test]
    fn test_edge_other() {
        let edge = Edge::new(4, 7);
        assert_eq!(edge.other(4), Some(7));
        assert_eq!(edge.other(7), Some(4));
        assert_eq!(edge.other(5), None);
    }

    #[test]
    fn test_graph_dedup() {
        let mut graph = CouplingGraph::new(3);
        graph.add_edge(0, 1);
        graph.add_edge(1, 0);
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_graph_line() {
        let graph = CouplingGraph::line(4);
        assert!(graph.is_connected(0, 1));
        assert!(graph.is_connected(2, 1));
        assert!(!graph.is_connected(0, 2));
        assert_eq!(graph.neighbors(1).count(), 2);
    }

    #[test]
    fn test_graph_path_labels() {
        let graph = CouplingGraph::path(&[5, 2, 7]);
        assert_eq!(graph.num_nodes(), 8);
        assert!(graph.is_connected(5, 2));
        assert!(graph.is_connected(2, 7));
        assert!(!graph.is_connected(5, 7));
    }

    #[test]
    fn test_rebuild_caches_roundtrip() {
        let graph = CouplingGraph::line(5);
        let json = serde_json::to_string(&graph).unwrap();
        let mut restored: CouplingGraph = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_connected(0, 1));
        restored.rebuild_caches();
        assert!(restored.is_connected(0, 1));
    }
}
