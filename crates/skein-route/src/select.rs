//! Network selection against a live device graph.
//!
//! Given a connectivity graph annotated with per-edge quality weights, the
//! selector looks for the best simple path of the required length and turns
//! it into a line network; when the device has no such path it falls back to
//! the predefined-network registry.

use petgraph::algo::all_simple_paths;
use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::FxHashMap;
use tracing::debug;

use skein_net::{library, CouplingGraph, Edge, NetworkRegistry, SwapNetwork};

use crate::error::{RouteError, RouteResult};

/// A connectivity graph with per-edge quality weights in `[0, 1]`.
///
/// Edges without an explicit weight count as perfect (`1.0`).
#[derive(Debug, Clone, Default)]
pub struct WeightedGraph {
    graph: CouplingGraph,
    weights: FxHashMap<Edge, f64>,
}

impl WeightedGraph {
    /// Wrap a connectivity graph with no explicit weights.
    pub fn new(graph: CouplingGraph) -> Self {
        Self {
            graph,
            weights: FxHashMap::default(),
        }
    }

    /// The underlying connectivity graph.
    pub fn graph(&self) -> &CouplingGraph {
        &self.graph
    }

    /// Set the quality weight of an edge. Fails unless `0.0 <= weight <= 1.0`.
    pub fn set_weight(&mut self, u: u32, v: u32, weight: f64) -> RouteResult<()> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(RouteError::InvalidEdgeWeight { weight });
        }
        self.weights.insert(Edge::new(u, v), weight);
        Ok(())
    }

    /// The quality weight of an edge; `1.0` if none was set.
    pub fn weight(&self, edge: &Edge) -> f64 {
        self.weights.get(edge).copied().unwrap_or(1.0)
    }
}

/// Chooses a swap network for a required active-node count.
///
/// The exhaustive path enumeration is exponential in the worst case; the
/// optional budget caps the number of candidate paths examined. With no
/// budget the search runs to completion, however long that takes.
#[derive(Debug, Clone)]
pub struct NetworkSelector {
    registry: NetworkRegistry,
    path_budget: Option<usize>,
}

impl NetworkSelector {
    /// Create a selector over an explicit registry.
    pub fn new(registry: NetworkRegistry) -> Self {
        Self {
            registry,
            path_budget: None,
        }
    }

    /// Create a selector over the default predefined networks.
    pub fn with_defaults() -> Self {
        Self::new(NetworkRegistry::with_defaults())
    }

    /// Cap the number of candidate paths examined before the search stops
    /// with the best path found so far.
    #[must_use]
    pub fn with_path_budget(mut self, budget: usize) -> Self {
        self.path_budget = Some(budget);
        self
    }

    /// Select a network with `active` nodes for the given device.
    ///
    /// Returns the network plus its active-node list: position `i` of the
    /// network corresponds to physical node `active_nodes[i]`.
    pub fn select(
        &self,
        device: &WeightedGraph,
        active: u32,
    ) -> RouteResult<(SwapNetwork, Vec<u32>)> {
        if let Some((score, path)) = self.best_path(device, active) {
            debug!(
                "Selected a {}-node path with quality {:.6}",
                active, score
            );
            let canonical: Vec<u32> = (0..active).collect();
            let network = library::line(&canonical, None)?;
            return Ok((network, path));
        }

        debug!("No {}-node path found, falling back to the registry", active);
        if self.registry.supports(active) {
            return self.registry.build(active).map_err(RouteError::Net);
        }
        Err(RouteError::SelectionFailed { requested: active })
    }

    /// Enumerate simple paths of exactly `active` nodes between every
    /// unordered node pair and keep the one with the largest edge-quality
    /// product. Ties fall to the first path enumerated.
    fn best_path(&self, device: &WeightedGraph, active: u32) -> Option<(f64, Vec<u32>)> {
        let num_nodes = device.graph().num_nodes();
        if active < 2 || active > num_nodes {
            return None;
        }
        let intermediates = (active - 2) as usize;

        let mut petgraph: UnGraph<u32, ()> = UnGraph::default();
        for node in 0..num_nodes {
            petgraph.add_node(node);
        }
        for edge in device.graph().edges() {
            petgraph.add_edge(
                NodeIndex::new(edge.a() as usize),
                NodeIndex::new(edge.b() as usize),
                (),
            );
        }

        let mut best: Option<(f64, Vec<u32>)> = None;
        let mut examined = 0usize;

        'search: for u in 0..num_nodes {
            for v in (u + 1)..num_nodes {
                let paths = all_simple_paths::<Vec<NodeIndex>, _>(
                    &petgraph,
                    NodeIndex::new(u as usize),
                    NodeIndex::new(v as usize),
                    intermediates,
                    Some(intermediates),
                );
                for path in paths {
                    if self.path_budget.is_some_and(|budget| examined >= budget) {
                        debug!("Path search budget of {} exhausted", examined);
                        break 'search;
                    }
                    examined += 1;

                    let labels: Vec<u32> = path
                        .iter()
                        .map(|idx| petgraph[*idx])
                        .collect();
                    let score: f64 = labels
                        .windows(2)
                        .map(|pair| device.weight(&Edge::new(pair[0], pair[1])))
                        .product();
                    if best.as_ref().is_none_or(|(top, _)| score > *top) {
                        best = Some((score, labels));
                    }
                }
            }
        }

        debug!("Examined {} candidate paths", examined);
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_line(n: u32) -> WeightedGraph {
        WeightedGraph::new(CouplingGraph::line(n))
    }

    #[test]
    fn test_weight_default_and_validation() {
        let mut device = weighted_line(3);
        assert_eq!(device.weight(&Edge::new(0, 1)), 1.0);
        device.set_weight(0, 1, 0.5).unwrap();
        assert_eq!(device.weight(&Edge::new(0, 1)), 0.5);
        assert!(matches!(
            device.set_weight(0, 1, 1.5),
            Err(RouteError::InvalidEdgeWeight { .. })
        ));
    }

    #[test]
    fn test_select_prefers_high_quality_path() {
        // A 6-node line where the 0-1 edge is noisy: the best 4-node path
        // avoids it.
        let mut device = weighted_line(6);
        device.set_weight(0, 1, 0.1).unwrap();

        let selector = NetworkSelector::with_defaults();
        let (network, active) = selector.select(&device, 4).unwrap();

        assert_eq!(network.num_nodes(), 4);
        assert_eq!(active.len(), 4);
        assert!(!active.windows(2).any(|p| (p[0], p[1]) == (0, 1) || (p[0], p[1]) == (1, 0)));
    }

    #[test]
    fn test_select_ties_fall_to_first_path() {
        let device = weighted_line(5);
        let selector = NetworkSelector::with_defaults();
        let (_, active) = selector.select(&device, 3).unwrap();
        // All paths are perfect; the first one enumerated wins.
        assert_eq!(active, vec![0, 1, 2]);
    }

    #[test]
    fn test_select_falls_back_to_registry() {
        // A star graph has no simple path of 5 nodes, so selection falls
        // back to the predefined tee network.
        let graph = CouplingGraph::from_edges(5, [(0, 1), (0, 2), (0, 3), (0, 4)]);
        let device = WeightedGraph::new(graph);

        let selector = NetworkSelector::with_defaults();
        let (network, active) = selector.select(&device, 5).unwrap();
        assert_eq!(network.num_nodes(), 5);
        assert_eq!(active.len(), 5);
    }

    #[test]
    fn test_select_fails_without_path_or_registry() {
        let graph = CouplingGraph::from_edges(6, [(0, 1), (0, 2), (0, 3), (0, 4), (0, 5)]);
        let device = WeightedGraph::new(graph);

        let selector = NetworkSelector::with_defaults();
        assert!(matches!(
            selector.select(&device, 6),
            Err(RouteError::SelectionFailed { requested: 6 })
        ));
    }

    #[test]
    fn test_path_budget_stops_search() {
        let device = weighted_line(6);
        let selector = NetworkSelector::with_defaults().with_path_budget(1);
        // One candidate is still enough to produce a network.
        let (network, active) = selector.select(&device, 3).unwrap();
        assert_eq!(network.num_nodes(), 3);
        assert_eq!(active.len(), 3);
    }
}
