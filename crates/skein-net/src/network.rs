//! Swap networks and their derived index.
//!
//! A [`SwapNetwork`] is an immutable definition: a connectivity graph plus an
//! ordered list of swap layers, optionally annotated with an edge coloring.
//! All derived state — the swap-distance matrix and the permutation tables —
//! lives in a separately computed, immutable [`NetworkIndex`]. The index is
//! built by a pure function and cached behind a [`OnceLock`], so sharing a
//! network across threads is safe and every "mutation" (`permute_labels`,
//! `embed_in`) produces a fresh instance with an empty cache.
//!
//! # Example
//!
//! ```
//! use skein_net::{CouplingGraph, SwapLayer, SwapNetwork};
//!
//! let graph = CouplingGraph::line(4);
//! let layers = vec![
//!     SwapLayer::from_pairs(&[(1, 2)]),
//!     SwapLayer::from_pairs(&[(0, 1), (2, 3)]),
//! ];
//! let network = SwapNetwork::new(graph, layers, None).unwrap();
//!
//! assert_eq!(network.distance(0, 1), Some(0));
//! assert_eq!(network.distance(0, 3), Some(2));
//! assert!(network.reaches_full_connectivity());
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{NetError, NetResult};
use crate::graph::{CouplingGraph, Edge};
use crate::perm::Permutation;

/// A set of node-disjoint edges to be exchanged simultaneously.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLayer {
    swaps: Vec<Edge>,
}

impl SwapLayer {
    /// Create a layer from edges. Disjointness is validated when the layer
    /// is assembled into a [`SwapNetwork`].
    pub fn new(swaps: Vec<Edge>) -> Self {
        Self { swaps }
    }

    /// Create a layer from raw node pairs.
    pub fn from_pairs(pairs: &[(u32, u32)]) -> Self {
        Self::new(pairs.iter().map(|&(u, v)| Edge::new(u, v)).collect())
    }

    /// The edges of this layer.
    pub fn edges(&self) -> &[Edge] {
        &self.swaps
    }

    /// Number of exchanges in this layer.
    pub fn len(&self) -> usize {
        self.swaps.len()
    }

    /// True if the layer exchanges nothing.
    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }

    /// Check whether the layer exchanges `edge`.
    pub fn contains(&self, edge: &Edge) -> bool {
        self.swaps.contains(edge)
    }

    /// If the layer is not a matching, return a node used twice.
    pub fn overlapping_node(&self) -> Option<u32> {
        let mut seen = rustc_hash::FxHashSet::default();
        for edge in &self.swaps {
            for node in [edge.a(), edge.b()] {
                if !seen.insert(node) {
                    return Some(node);
                }
            }
        }
        None
    }

    /// Exchange `values[i]` and `values[j]` for every edge `(i, j)`.
    fn apply_to(&self, values: &mut [u32]) {
        for edge in &self.swaps {
            values.swap(edge.a() as usize, edge.b() as usize);
        }
    }
}

/// An immutable swap-network definition.
///
/// Consists of a [`CouplingGraph`], an ordered list of [`SwapLayer`]s, and an
/// optional edge coloring (a map from graph edges to matching indices used to
/// parallelize conflict-free operations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapNetwork {
    graph: CouplingGraph,
    layers: Vec<SwapLayer>,
    coloring: Option<FxHashMap<Edge, u32>>,
    /// Derived index, computed once on first use.
    #[serde(skip)]
    index: OnceLock<NetworkIndex>,
}

impl SwapNetwork {
    /// Create a validated swap network.
    ///
    /// Fails if any layer references an edge absent from the graph, or if a
    /// layer's edges are not pairwise node-disjoint. A non-matching layer
    /// would silently corrupt the permutation table, so it is rejected here
    /// rather than detected downstream.
    pub fn new(
        graph: CouplingGraph,
        layers: Vec<SwapLayer>,
        coloring: Option<FxHashMap<Edge, u32>>,
    ) -> NetResult<Self> {
        for (idx, layer) in layers.iter().enumerate() {
            for edge in layer.edges() {
                if !graph.contains(edge) {
                    return Err(NetError::EdgeNotInGraph {
                        layer: idx,
                        edge: *edge,
                    });
                }
            }
            if let Some(node) = layer.overlapping_node() {
                return Err(NetError::OverlappingLayerEdges { layer: idx, node });
            }
        }
        Ok(Self {
            graph,
            layers,
            coloring,
            index: OnceLock::new(),
        })
    }

    /// Number of swap layers.
    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True if the network has no swap layers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of physical nodes covered by the graph.
    #[inline]
    pub fn num_nodes(&self) -> u32 {
        self.graph.num_nodes()
    }

    /// The connectivity graph.
    pub fn graph(&self) -> &CouplingGraph {
        &self.graph
    }

    /// The ordered swap layers.
    pub fn layers(&self) -> &[SwapLayer] {
        &self.layers
    }

    /// A single swap layer.
    ///
    /// # Panics
    ///
    /// Panics if `k >= self.len()`.
    pub fn layer(&self, k: usize) -> &SwapLayer {
        &self.layers[k]
    }

    /// The edge coloring, if one was supplied.
    pub fn coloring(&self) -> Option<&FxHashMap<Edge, u32>> {
        self.coloring.as_ref()
    }

    /// Apply swap layer `k` to a list of values, returning a new list.
    ///
    /// Applying the same layer twice returns the original list.
    ///
    /// # Panics
    ///
    /// Panics if `k >= self.len()` or if `values` is shorter than the node
    /// count.
    pub fn apply_swap_layer(&self, values: &[u32], k: usize) -> Vec<u32> {
        assert!(
            values.len() >= self.num_nodes() as usize,
            "value list shorter than node count"
        );
        let mut out = values.to_vec();
        self.layers[k].apply_to(&mut out);
        out
    }

    /// The derived index (distance matrix + permutation tables), computed on
    /// first use and shared by reference thereafter.
    pub fn index(&self) -> &NetworkIndex {
        self.index.get_or_init(|| NetworkIndex::build(self))
    }

    /// Swap distance between two nodes: the smallest number of layers after
    /// which their contents become adjacent, or `None` if they never do.
    pub fn distance(&self, i: u32, j: u32) -> Option<u32> {
        self.index().distance(i, j)
    }

    /// The permutation accumulated by the first `k` layers: entry `i` is the
    /// position reached by the content that started at position `i`.
    pub fn composed_permutation(&self, k: usize) -> &Permutation {
        self.index().composed(k)
    }

    /// The exact inverse of [`composed_permutation`](Self::composed_permutation):
    /// entry `p` is the starting position of the content now at `p`.
    pub fn inverse_composed_permutation(&self, k: usize) -> &Permutation {
        self.index().inverse_composed(k)
    }

    /// The graph's edges re-expressed after `k` layers: which pairs of
    /// original contents are adjacent at depth `k`.
    pub fn swapped_edges(&self, k: usize) -> Vec<Edge> {
        self.index().swapped_edges(k)
    }

    /// Pairs whose swap distance is exactly `k`.
    pub fn new_connections(&self, k: u32) -> Vec<Edge> {
        self.index().new_connections(k)
    }

    /// Pairs that never become adjacent within the network's depth.
    /// Advisory: an incomplete network is valid, it just cannot route
    /// interactions between the listed pairs.
    pub fn missing_couplings(&self) -> Vec<Edge> {
        self.index().missing_couplings()
    }

    /// True if every pair of nodes becomes adjacent within the network depth.
    pub fn reaches_full_connectivity(&self) -> bool {
        self.index().missing_couplings().is_empty()
    }

    /// Relabel the graph and layers under `perm`, producing a new network.
    ///
    /// Fails unless `perm` covers exactly the network's node range.
    pub fn permute_labels(&self, perm: &Permutation) -> NetResult<SwapNetwork> {
        if perm.len() != self.num_nodes() as usize {
            return Err(NetError::MalformedPermutation(format!(
                "permutation covers {} nodes, network has {}",
                perm.len(),
                self.num_nodes()
            )));
        }
        let graph = CouplingGraph::from_edges(
            self.num_nodes(),
            self.graph
                .edges()
                .iter()
                .map(|e| e.map(|n| perm.apply(n)).endpoints()),
        );
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                SwapLayer::new(
                    layer
                        .edges()
                        .iter()
                        .map(|e| e.map(|n| perm.apply(n)))
                        .collect(),
                )
            })
            .collect();
        let coloring = self.coloring.as_ref().map(|coloring| {
            coloring
                .iter()
                .map(|(edge, &color)| (edge.map(|n| perm.apply(n)), color))
                .collect()
        });
        SwapNetwork::new(graph, layers, coloring)
    }

    /// Embed this network into a larger connectivity graph.
    ///
    /// The new network's graph and layers are the image of this one's under
    /// `mapping` (position `i` of this network lands on `mapping[i]`; the
    /// default is the identity on the first `N` nodes). The edge coloring is
    /// carried over when `retain_coloring` is set, though it may then be
    /// incomplete with respect to the target's edge set.
    pub fn embed_in(
        &self,
        larger: &CouplingGraph,
        mapping: Option<&[u32]>,
        retain_coloring: bool,
    ) -> NetResult<SwapNetwork> {
        let required = self.num_nodes();
        let available = larger.num_nodes();
        if available < required {
            return Err(NetError::TargetTooSmall {
                required,
                available,
            });
        }

        let identity: Vec<u32>;
        let mapping = match mapping {
            Some(m) => m,
            None => {
                identity = (0..required).collect();
                &identity
            }
        };
        if mapping.len() != required as usize {
            return Err(NetError::MalformedPermutation(format!(
                "vertex mapping covers {} nodes, network has {required}",
                mapping.len()
            )));
        }
        let mut seen = vec![false; available as usize];
        for &target in mapping {
            if target >= available {
                return Err(NetError::MalformedPermutation(format!(
                    "vertex mapping target {target} outside graph of {available} nodes"
                )));
            }
            if seen[target as usize] {
                return Err(NetError::MalformedPermutation(format!(
                    "vertex mapping target {target} used twice"
                )));
            }
            seen[target as usize] = true;
        }

        let remap = |n: u32| mapping[n as usize];
        let graph = CouplingGraph::from_edges(
            available,
            self.graph.edges().iter().map(|e| e.map(remap).endpoints()),
        );
        let layers = self
            .layers
            .iter()
            .map(|layer| SwapLayer::new(layer.edges().iter().map(|e| e.map(remap)).collect()))
            .collect();
        let coloring = if retain_coloring {
            self.coloring.as_ref().map(|coloring| {
                coloring
                    .iter()
                    .map(|(edge, &color)| (edge.map(remap), color))
                    .collect()
            })
        } else {
            None
        };
        SwapNetwork::new(graph, layers, coloring)
    }
}

/// Derived, immutable lookup structures for a [`SwapNetwork`].
///
/// Built once by [`NetworkIndex::build`]; holds the full swap-distance matrix
/// and the composed/inverse permutation tables for every depth `0..=len`.
#[derive(Debug, Clone)]
pub struct NetworkIndex {
    num_nodes: u32,
    graph_edges: Vec<Edge>,
    /// `distance[i][j]` is the first depth at which `i` and `j` become
    /// adjacent, `None` if never. Symmetric, zero diagonal.
    distance: Vec<Vec<Option<u32>>>,
    /// `inverse[k]` maps a position to the origin of its current content.
    inverse: Vec<Permutation>,
    /// `composed[k]` maps an origin to its current position.
    composed: Vec<Permutation>,
}

impl NetworkIndex {
    /// Compute the index for a network.
    ///
    /// The permutation table is built by a single iterative forward pass over
    /// the layers; the distance matrix by sweeping depths `0..=len` and
    /// recording the first depth at which each pair appears among the
    /// permuted graph edges.
    pub fn build(network: &SwapNetwork) -> Self {
        let n = network.num_nodes();
        let depth = network.len();

        let mut inverse = Vec::with_capacity(depth + 1);
        inverse.push(Permutation::identity(n));
        for layer in network.layers() {
            let mut next = inverse.last().expect("table is never empty").clone();
            for edge in layer.edges() {
                next.swap_entries(edge.a(), edge.b());
            }
            inverse.push(next);
        }
        let composed: Vec<Permutation> = inverse.iter().map(Permutation::inverse).collect();

        let mut distance = vec![vec![None; n as usize]; n as usize];
        for (i, row) in distance.iter_mut().enumerate() {
            row[i] = Some(0);
        }
        for (k, inv) in inverse.iter().enumerate() {
            for edge in network.graph().edges() {
                let (u, v) = (inv.apply(edge.a()) as usize, inv.apply(edge.b()) as usize);
                if distance[u][v].is_none() {
                    let k = u32::try_from(k).expect("depth exceeds u32");
                    distance[u][v] = Some(k);
                    distance[v][u] = Some(k);
                }
            }
        }

        Self {
            num_nodes: n,
            graph_edges: network.graph().edges().to_vec(),
            distance,
            inverse,
            composed,
        }
    }

    /// Number of nodes covered by the matrix.
    #[inline]
    pub fn num_nodes(&self) -> u32 {
        self.num_nodes
    }

    /// Swap distance between two nodes.
    ///
    /// # Panics
    ///
    /// Panics if either node is outside the matrix.
    pub fn distance(&self, i: u32, j: u32) -> Option<u32> {
        self.distance[i as usize][j as usize]
    }

    /// The full distance matrix.
    pub fn distance_matrix(&self) -> &[Vec<Option<u32>>] {
        &self.distance
    }

    /// The composed permutation after `k` layers (origin to position).
    pub fn composed(&self, k: usize) -> &Permutation {
        &self.composed[k]
    }

    /// The inverse composed permutation after `k` layers (position to origin).
    pub fn inverse_composed(&self, k: usize) -> &Permutation {
        &self.inverse[k]
    }

    /// Graph edges re-expressed at depth `k`: pairs of original contents
    /// adjacent after `k` layers.
    pub fn swapped_edges(&self, k: usize) -> Vec<Edge> {
        let inv = &self.inverse[k];
        self.graph_edges
            .iter()
            .map(|edge| edge.map(|n| inv.apply(n)))
            .collect()
    }

    /// Pairs whose distance is exactly `k`.
    pub fn new_connections(&self, k: u32) -> Vec<Edge> {
        let mut pairs = vec![];
        for i in 0..self.num_nodes {
            for j in (i + 1)..self.num_nodes {
                if self.distance[i as usize][j as usize] == Some(k) {
                    pairs.push(Edge::new(i, j));
                }
            }
        }
        pairs
    }

    /// Pairs that never become adjacent.
    pub fn missing_couplings(&self) -> Vec<Edge> {
        let mut pairs = vec![];
        for i in 0..self.num_nodes {
            for j in (i + 1)..self.num_nodes {
                if self.distance[i as usize][j as usize].is_none() {
                    pairs.push(Edge::new(i, j));
                }
            }
        }
        pairs
    }
}
