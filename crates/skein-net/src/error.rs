//! Error types for the network crate.

use crate::graph::Edge;
use thiserror::Error;

/// Errors that can occur when constructing or transforming swap networks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NetError {
    /// A swap layer references an edge that is not part of the network graph.
    #[error("Swap layer {layer} uses edge {edge} which is not in the network graph")]
    EdgeNotInGraph {
        /// Index of the offending layer.
        layer: usize,
        /// The edge missing from the graph.
        edge: Edge,
    },

    /// A swap layer is not a matching: one node appears in two of its edges.
    #[error("Swap layer {layer} is not a matching: node {node} appears twice")]
    OverlappingLayerEdges {
        /// Index of the offending layer.
        layer: usize,
        /// The node shared by two edges.
        node: u32,
    },

    /// A permutation or vertex mapping is not a valid bijection.
    #[error("Malformed permutation: {0}")]
    MalformedPermutation(String),

    /// The target graph is too small for the network being embedded.
    #[error("Target graph has {available} nodes but the network requires {required}")]
    TargetTooSmall { required: u32, available: u32 },

    /// No predefined network exists for the requested active-node count.
    #[error("No predefined network supports {count} active nodes")]
    UnsupportedNodeCount { count: u32 },
}

/// Result type for network operations.
pub type NetResult<T> = Result<T, NetError>;
