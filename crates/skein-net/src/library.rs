//! Predefined, parameterized swap networks for common topologies.
//!
//! Each constructor returns an immutable [`SwapNetwork`] together with its
//! active-node list (position `i` of the network corresponds to physical node
//! `active[i]` on the device). The [`NetworkRegistry`] maps an active-node
//! count to a constructor; callers hand a registry to the network selector
//! instead of relying on hard-coded device names.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{NetError, NetResult};
use crate::graph::{CouplingGraph, Edge};
use crate::network::{SwapLayer, SwapNetwork};

/// A network constructor keyed by requested active-node count.
pub type NetworkBuilder = fn(u32) -> NetResult<(SwapNetwork, Vec<u32>)>;

/// Build a line (path) swap network over an explicit node sequence.
///
/// Layers alternate the two matchings of a path: layers at even indices
/// exchange the odd-position edges (`(1,2), (3,4), ...` along the sequence),
/// layers at odd indices the even-position edges (`(0,1), (2,3), ...`). The
/// default layer count of `n - 2` is the smallest that brings every pair of
/// contents adjacent at least once.
///
/// The attached edge coloring assigns color 0 to even-position edges and
/// color 1 to odd-position edges.
pub fn line(nodes: &[u32], layer_count: Option<usize>) -> NetResult<SwapNetwork> {
    let n = nodes.len();
    let distinct: FxHashSet<u32> = nodes.iter().copied().collect();
    if distinct.len() != n {
        return Err(NetError::MalformedPermutation(
            "line nodes must be distinct".into(),
        ));
    }

    let graph = CouplingGraph::path(nodes);
    let layer_count = layer_count.unwrap_or(n.saturating_sub(2));

    let mut layers = Vec::with_capacity(layer_count);
    for k in 0..layer_count {
        let start = if k % 2 == 0 { 1 } else { 0 };
        let edges = (start..n.saturating_sub(1))
            .step_by(2)
            .map(|j| Edge::new(nodes[j], nodes[j + 1]))
            .collect();
        layers.push(SwapLayer::new(edges));
    }

    let mut coloring = FxHashMap::default();
    for j in 0..n.saturating_sub(1) {
        coloring.insert(Edge::new(nodes[j], nodes[j + 1]), (j % 2) as u32);
    }

    SwapNetwork::new(graph, layers, Some(coloring))
}

/// The 5-node tee topology (`0-1-2` with `1-3` and `3-4` hanging off).
///
/// Three hand-tuned layers reach full connectivity.
pub fn tee() -> NetResult<(SwapNetwork, Vec<u32>)> {
    let graph = CouplingGraph::from_edges(5, [(0, 1), (1, 2), (1, 3), (3, 4)]);
    let layers = vec![
        SwapLayer::from_pairs(&[(1, 3)]),
        SwapLayer::from_pairs(&[(0, 1), (3, 4)]),
        SwapLayer::from_pairs(&[(1, 2)]),
    ];
    let coloring = [
        (Edge::new(0, 1), 0),
        (Edge::new(1, 2), 1),
        (Edge::new(1, 3), 2),
        (Edge::new(3, 4), 0),
    ]
    .into_iter()
    .collect();
    let network = SwapNetwork::new(graph, layers, Some(coloring))?;
    Ok((network, (0..5).collect()))
}

/// Base edges of the heavy-7 unit, in canonical positions.
const HEAVY7_EDGES: [(u32, u32); 6] = [(0, 1), (1, 2), (1, 3), (3, 5), (4, 5), (5, 6)];

/// Hand-tuned layer sequence for the heavy-7 unit; reaches full connectivity
/// after six layers.
const HEAVY7_LAYERS: [&[(u32, u32)]; 6] = [
    &[(1, 3), (4, 5)],
    &[(0, 1), (3, 5)],
    &[(1, 3), (5, 6)],
    &[(1, 2), (3, 5)],
    &[(1, 3), (5, 6)],
    &[(3, 5)],
];

/// The 7-node heavy-hex unit (`0-1-2` and `4-5-6` rows bridged by `1-3-5`),
/// in canonical positions `0..7`.
pub fn heavy7() -> NetResult<(SwapNetwork, Vec<u32>)> {
    heavy7_on(&[0, 1, 2, 3, 4, 5, 6])
}

/// The heavy-7 unit placed on explicit physical labels, for devices where
/// the unit does not sit on nodes `0..7`.
pub fn heavy7_on(labels: &[u32; 7]) -> NetResult<(SwapNetwork, Vec<u32>)> {
    let distinct: FxHashSet<u32> = labels.iter().copied().collect();
    if distinct.len() != labels.len() {
        return Err(NetError::MalformedPermutation(
            "heavy-7 labels must be distinct".into(),
        ));
    }
    let remap = |n: u32| labels[n as usize];
    let num_nodes = labels.iter().copied().max().unwrap_or(0) + 1;

    let graph = CouplingGraph::from_edges(
        num_nodes,
        HEAVY7_EDGES.iter().map(|&(u, v)| (remap(u), remap(v))),
    );
    let layers = HEAVY7_LAYERS
        .iter()
        .map(|pairs| {
            SwapLayer::new(
                pairs
                    .iter()
                    .map(|&(u, v)| Edge::new(remap(u), remap(v)))
                    .collect(),
            )
        })
        .collect();
    let coloring = [
        ((0, 1), 0),
        ((1, 2), 1),
        ((1, 3), 2),
        ((3, 5), 0),
        ((4, 5), 1),
        ((5, 6), 2),
    ]
    .into_iter()
    .map(|((u, v), c)| (Edge::new(remap(u), remap(v)), c))
    .collect();

    let network = SwapNetwork::new(graph, layers, Some(coloring))?;
    Ok((network, labels.to_vec()))
}

/// Number of nodes on the double-ring device's longest line.
const DOUBLE_RING_LINE: u32 = 22;

/// Dangling nodes of the double-ring device, in activation order:
/// `(node, line anchor, layer index of the inserted exchange)`.
const DOUBLE_RING_DANGLERS: [(u32, u32, usize); 5] =
    [(22, 4, 3), (23, 9, 7), (24, 13, 11), (25, 17, 15), (26, 20, 19)];

/// Swap network for the 27-node double-ring device, for 22 to 27 active
/// nodes.
///
/// The core is a line network over the device's longest line (22 nodes,
/// labeled `0..22` along the two rings). Each additional active node is a
/// dangler hanging off the line; a single-swap layer at a recorded depth
/// pulls its content onto the line so the line layers can carry it along.
pub fn double_ring(active: u32) -> NetResult<(SwapNetwork, Vec<u32>)> {
    if !(DOUBLE_RING_LINE..=27).contains(&active) {
        return Err(NetError::UnsupportedNodeCount { count: active });
    }
    let danglers = &DOUBLE_RING_DANGLERS[..(active - DOUBLE_RING_LINE) as usize];

    let line_nodes: Vec<u32> = (0..DOUBLE_RING_LINE).collect();
    let base = line(&line_nodes, None)?;

    // Rebuild the graph over the enlarged node range before adding danglers.
    let mut graph = CouplingGraph::from_edges(
        active,
        base.graph().edges().iter().map(|e| e.endpoints()),
    );
    let mut layers = base.layers().to_vec();
    let mut coloring = base.coloring().cloned().unwrap_or_default();

    for &(node, anchor, depth) in danglers {
        graph.add_edge(anchor, node);
        layers.insert(depth, SwapLayer::from_pairs(&[(anchor, node)]));
        coloring.insert(Edge::new(anchor, node), 2);
    }

    let network = SwapNetwork::new(graph, layers, Some(coloring))?;
    Ok((network, (0..active).collect()))
}

/// An explicit map from active-node counts to network constructors.
///
/// Replaces device-name string matching: callers register exactly the
/// topologies their hardware supports and hand the registry to the selector.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    entries: FxHashMap<u32, NetworkBuilder>,
}

impl NetworkRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all predefined networks: tee (5), heavy-7 (7), and
    /// double-ring (22 to 27).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(5, |_| tee());
        registry.register(7, |_| heavy7());
        for count in 22..=27 {
            registry.register(count, double_ring);
        }
        registry
    }

    /// Register a constructor for an active-node count, replacing any
    /// previous entry.
    pub fn register(&mut self, count: u32, builder: NetworkBuilder) {
        self.entries.insert(count, builder);
    }

    /// Build the network registered for `count`.
    pub fn build(&self, count: u32) -> NetResult<(SwapNetwork, Vec<u32>)> {
        match self.entries.get(&count) {
            Some(builder) => builder(count),
            None => Err(NetError::UnsupportedNodeCount { count }),
        }
    }

    /// Check whether a constructor is registered for `count`.
    pub fn supports(&self, count: u32) -> bool {
        self.entries.contains_key(&count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_default_layer_count() {
        let network = line(&[0, 1, 2, 3], None).unwrap();
        assert_eq!(network.len(), 2);
        assert_eq!(network.layer(0).edges(), &[Edge::new(1, 2)]);
        assert_eq!(
            network.layer(1).edges(),
            &[Edge::new(0, 1), Edge::new(2, 3)]
        );
    }

    #[test]
    fn test_line_distances() {
        let network = line(&[0, 1, 2, 3], None).unwrap();
        assert_eq!(network.distance(0, 1), Some(0));
        assert_eq!(network.distance(0, 3), Some(2));
        assert!(network.reaches_full_connectivity());
    }

    #[test]
    fn test_line_coloring() {
        let network = line(&[0, 1, 2, 3, 4], None).unwrap();
        let coloring = network.coloring().unwrap();
        assert_eq!(coloring[&Edge::new(0, 1)], 0);
        assert_eq!(coloring[&Edge::new(1, 2)], 1);
        assert_eq!(coloring[&Edge::new(2, 3)], 0);
    }

    #[test]
    fn test_line_arbitrary_labels() {
        let network = line(&[5, 2, 7], None).unwrap();
        assert_eq!(network.len(), 1);
        assert_eq!(network.distance(5, 2), Some(0));
        assert_eq!(network.distance(5, 7), Some(1));
    }

    #[test]
    fn test_line_rejects_duplicate_labels() {
        assert!(line(&[0, 1, 1], None).is_err());
    }

    #[test]
    fn test_tee_full_connectivity() {
        let (network, active) = tee().unwrap();
        assert_eq!(active, vec![0, 1, 2, 3, 4]);
        assert_eq!(network.len(), 3);
        assert!(network.reaches_full_connectivity());
    }

    #[test]
    fn test_heavy7_full_connectivity() {
        let (network, active) = heavy7().unwrap();
        assert_eq!(active.len(), 7);
        assert_eq!(network.len(), 6);
        assert!(network.reaches_full_connectivity());
    }

    #[test]
    fn test_heavy7_on_device_labels() {
        let labels = [10, 11, 12, 13, 14, 15, 16];
        let (network, active) = heavy7_on(&labels).unwrap();
        assert_eq!(active, labels.to_vec());
        assert!(network.graph().is_connected(10, 11));
        assert!(network.distance(10, 16).is_some());
    }

    #[test]
    fn test_double_ring_sizes() {
        for count in 22..=27 {
            let (network, active) = double_ring(count).unwrap();
            assert_eq!(network.num_nodes(), count);
            assert_eq!(active.len(), count as usize);
            assert_eq!(network.len(), 20 + (count as usize - 22));
        }
    }

    #[test]
    fn test_double_ring_dangler_edges() {
        let (network, _) = double_ring(24).unwrap();
        assert!(network.graph().is_connected(4, 22));
        assert!(network.graph().is_connected(9, 23));
        assert_eq!(network.distance(4, 22), Some(0));
    }

    #[test]
    fn test_double_ring_rejects_out_of_range() {
        assert!(matches!(
            double_ring(21),
            Err(NetError::UnsupportedNodeCount { count: 21 })
        ));
        assert!(matches!(
            double_ring(28),
            Err(NetError::UnsupportedNodeCount { count: 28 })
        ));
    }

    #[test]
    fn test_registry_defaults() {
        let registry = NetworkRegistry::with_defaults();
        assert!(registry.supports(5));
        assert!(registry.supports(7));
        assert!(registry.supports(27));
        assert!(!registry.supports(6));

        let (network, active) = registry.build(5).unwrap();
        assert_eq!(network.num_nodes(), 5);
        assert_eq!(active.len(), 5);

        assert!(matches!(
            registry.build(9),
            Err(NetError::UnsupportedNodeCount { count: 9 })
        ));
    }
}
