//! Swap-network definitions and permutation algebra.
//!
//! This crate provides the foundational types for routing dense pairwise
//! interactions over sparse connectivity: an immutable [`SwapNetwork`]
//! (a connectivity graph plus an ordered list of exchange layers), its
//! derived [`NetworkIndex`] (swap-distance matrix and permutation tables),
//! and a small library of predefined networks for common topologies.
//!
//! # Overview
//!
//! A swap network describes how the contents of physical nodes migrate
//! across a device over successive exchange layers. Its index answers the
//! central routing question — after how many layers do two contents become
//! adjacent — in O(1) per pair:
//!
//! ```
//! use skein_net::library;
//!
//! // A line network over four nodes: 0-1-2-3.
//! let network = library::line(&[0, 1, 2, 3], None).unwrap();
//!
//! // Adjacent contents interact immediately; the endpoints meet after
//! // two exchange layers.
//! assert_eq!(network.distance(0, 1), Some(0));
//! assert_eq!(network.distance(0, 3), Some(2));
//! ```
//!
//! # Architecture
//!
//! ```text
//! CouplingGraph + [SwapLayer]           (immutable definition)
//!         │
//!         ▼
//! NetworkIndex::build                   (pure, computed once)
//!         │
//!         ├── distance matrix           first depth each pair meets
//!         ├── composed permutations     origin → position, per depth
//!         └── inverse permutations      position → origin, per depth
//! ```
//!
//! Higher layers (placement optimization, layer scheduling, network
//! selection) consume the index without ever mutating the definition.

pub mod error;
pub mod graph;
pub mod library;
pub mod network;
pub mod perm;

pub use error::{NetError, NetResult};
pub use graph::{CouplingGraph, Edge};
pub use library::{NetworkBuilder, NetworkRegistry};
pub use network::{NetworkIndex, SwapLayer, SwapNetwork};
pub use perm::Permutation;
