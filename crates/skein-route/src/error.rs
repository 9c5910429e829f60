//! Error types for the routing crate.

use crate::problem::VarId;
use skein_net::NetError;
use thiserror::Error;

/// Errors that can occur during selection, placement, or scheduling.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouteError {
    /// Error from the network crate.
    #[error("Network error: {0}")]
    Net(#[from] NetError),

    /// A logical variable has no physical assignment.
    #[error("Variable {var} has no physical assignment")]
    PlacementIncomplete { var: VarId },

    /// The network has fewer nodes than the problem has variables.
    #[error("Problem requires {required} nodes but the network only has {available}")]
    NetworkTooSmall { required: u32, available: u32 },

    /// An interaction does not resolve to two distinct physical nodes.
    #[error("Interaction between {a} and {b} does not span two distinct nodes")]
    NonLocalInteraction { a: VarId, b: VarId },

    /// A required pair never becomes adjacent within the network's depth.
    #[error("Nodes {phys_a} and {phys_b} never become adjacent within the network")]
    UnreachablePair { phys_a: u32, phys_b: u32 },

    /// No path and no predefined network match the requested size.
    #[error("No path of {requested} nodes and no predefined network of that size")]
    SelectionFailed { requested: u32 },

    /// An edge quality weight is outside `[0, 1]`.
    #[error("Edge quality weight {weight} is outside [0, 1]")]
    InvalidEdgeWeight { weight: f64 },

    /// A variable index is outside the problem's variable range.
    #[error("Variable {var} is outside the problem's {num_vars} variables")]
    VariableOutOfRange { var: VarId, num_vars: u32 },
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
