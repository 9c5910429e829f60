//! Routing dense pairwise interactions over sparse connectivity.
//!
//! This crate turns a weighted interaction problem into an executable
//! sequence of operation layers on a physical device. It builds on
//! [`skein_net`]'s swap networks and adds the three routing stages:
//!
//! 1. **Selection** ([`NetworkSelector`]): pick a swap network for the
//!    device, preferring the best-quality simple path and falling back to a
//!    registry of predefined networks for non-path topologies.
//! 2. **Placement** ([`PlacementOptimizer`]): greedily assign logical
//!    variables to physical nodes so heavily coupled pairs meet early.
//! 3. **Scheduling** ([`LayerScheduler`]): walk the network depth by depth,
//!    emitting each interaction at the first depth its pair becomes
//!    adjacent, fusing interactions with coinciding exchanges, and splitting
//!    conflicting interactions into parallel sublayers.
//!
//! # Example
//!
//! ```
//! use skein_net::library;
//! use skein_route::{InteractionGraph, LayerScheduler, PlacementOptimizer, VarId};
//!
//! let network = library::line(&[0, 1, 2, 3], None).unwrap();
//!
//! let mut problem = InteractionGraph::new(4);
//! problem.set_coupling(VarId(0), VarId(1), 1.0).unwrap();
//! problem.set_coupling(VarId(2), VarId(3), -0.5).unwrap();
//!
//! let placement = PlacementOptimizer::new().optimize(&problem, &network).unwrap();
//! let scheduler = LayerScheduler::new(&problem, &placement, &network).unwrap();
//! let schedule = scheduler.schedule(false);
//!
//! // Both couplings are scheduled somewhere.
//! assert_eq!(schedule.num_ops(), 2);
//! ```

pub mod error;
pub mod placement;
pub mod problem;
pub mod schedule;
pub mod select;

pub use error::{RouteError, RouteResult};
pub use placement::{Placement, PlacementOptimizer};
pub use problem::{is_significant, InteractionGraph, VarId, COUPLING_EPS};
pub use schedule::{LayerScheduler, Op, OpLayer, Schedule};
pub use select::{NetworkSelector, WeightedGraph};
