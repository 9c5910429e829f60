//! Placements of logical variables onto physical nodes, and the greedy
//! initial-placement optimizer.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use skein_net::{Permutation, SwapNetwork};

use crate::error::{RouteError, RouteResult};
use crate::problem::{is_significant, InteractionGraph, VarId};

/// A bijection between logical variables and physical nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Map from logical variable to physical node.
    logical_to_physical: FxHashMap<VarId, u32>,
    /// Map from physical node to logical variable.
    physical_to_logical: FxHashMap<u32, VarId>,
}

impl Placement {
    /// Create a new empty placement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trivial placement (variable i on node i).
    pub fn trivial(num_vars: u32) -> Self {
        let mut placement = Self::new();
        for i in 0..num_vars {
            placement.add(VarId(i), i);
        }
        placement
    }

    /// Add a mapping from variable to node.
    ///
    /// If either side is already mapped elsewhere, the old mapping is
    /// removed first to keep both maps consistent.
    pub fn add(&mut self, var: VarId, node: u32) {
        if let Some(&old_var) = self.physical_to_logical.get(&node) {
            if old_var != var {
                self.logical_to_physical.remove(&old_var);
            }
        }
        if let Some(&old_node) = self.logical_to_physical.get(&var) {
            if old_node != node {
                self.physical_to_logical.remove(&old_node);
            }
        }
        self.logical_to_physical.insert(var, node);
        self.physical_to_logical.insert(node, var);
    }

    /// Get the physical node for a variable.
    pub fn get_physical(&self, var: VarId) -> Option<u32> {
        self.logical_to_physical.get(&var).copied()
    }

    /// Get the variable on a physical node.
    pub fn get_logical(&self, node: u32) -> Option<VarId> {
        self.physical_to_logical.get(&node).copied()
    }

    /// Exchange the contents of two physical nodes.
    pub fn swap(&mut self, p1: u32, p2: u32) {
        let l1 = self.physical_to_logical.get(&p1).copied();
        let l2 = self.physical_to_logical.get(&p2).copied();

        if let Some(l1) = l1 {
            self.logical_to_physical.insert(l1, p2);
            self.physical_to_logical.insert(p2, l1);
        } else {
            self.physical_to_logical.remove(&p2);
        }

        if let Some(l2) = l2 {
            self.logical_to_physical.insert(l2, p1);
            self.physical_to_logical.insert(p1, l2);
        } else {
            self.physical_to_logical.remove(&p1);
        }
    }

    /// Compose a position permutation onto the placement: a variable on
    /// node `p` lands on `perm[p]`.
    ///
    /// # Panics
    ///
    /// Panics if a mapped node is outside the permutation's domain.
    pub fn permuted(&self, perm: &Permutation) -> Placement {
        let mut out = Placement::new();
        for (var, node) in self.iter() {
            out.add(var, perm.apply(node));
        }
        out
    }

    /// Number of mapped variables.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Check if the placement is empty.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// Iterate over (variable, node) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, u32)> + '_ {
        self.logical_to_physical.iter().map(|(&l, &p)| (l, p))
    }
}

/// Greedy initial-placement optimizer.
///
/// Orders variables by how strongly they interact and assigns each to the
/// free physical node that minimizes the distance-weighted cost to the
/// variables already placed. The heuristic front-loads the heaviest
/// interactions onto short swap distances, which directly bounds the
/// schedule depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementOptimizer;

impl PlacementOptimizer {
    /// Create a new optimizer.
    pub fn new() -> Self {
        Self
    }

    /// Compute an initial placement of `problem`'s variables onto
    /// `network`'s nodes.
    ///
    /// Fails if the problem has more variables than the network has nodes.
    /// The result is always a bijection.
    pub fn optimize(
        &self,
        problem: &InteractionGraph,
        network: &SwapNetwork,
    ) -> RouteResult<Placement> {
        let num_vars = problem.num_vars();
        let num_nodes = network.num_nodes();
        if num_vars > num_nodes {
            return Err(RouteError::NetworkTooSmall {
                required: num_vars,
                available: num_nodes,
            });
        }

        let index = network.index();
        // Unreachable node pairs cost one more than any reachable depth, so
        // they are only used when nothing better is free.
        let unreachable_cost = (network.len() + 1) as f64;

        // Partner counts seed the ordering; weight sums drive it afterwards.
        let mut partners = vec![0u32; num_vars as usize];
        for (i, j, w) in problem.couplings() {
            if is_significant(w) && i != j {
                partners[i.0 as usize] += 1;
                partners[j.0 as usize] += 1;
            }
        }

        let mut placement = Placement::new();
        let mut placed: Vec<(VarId, u32)> = Vec::with_capacity(num_vars as usize);
        let mut unplaced: FxHashSet<VarId> = (0..num_vars).map(VarId).collect();
        let mut used_nodes: FxHashSet<u32> = FxHashSet::default();

        while !unplaced.is_empty() {
            // Pick the next variable: most partners first, then the
            // strongest total attachment to the placed set. Ties fall to
            // the lowest variable index.
            let mut best_var: Option<(f64, VarId)> = None;
            for raw in 0..num_vars {
                let var = VarId(raw);
                if !unplaced.contains(&var) {
                    continue;
                }
                let score = if placed.is_empty() {
                    f64::from(partners[raw as usize])
                } else {
                    placed
                        .iter()
                        .map(|&(other, _)| problem.weight(var, other).abs())
                        .sum()
                };
                if best_var.is_none_or(|(best, _)| score > best) {
                    best_var = Some((score, var));
                }
            }
            let (_, var) = best_var.expect("unplaced set is non-empty");

            // Assign it to the free node with the cheapest distance-weighted
            // cost to everything already placed.
            let mut best_node: Option<(f64, u32)> = None;
            for node in 0..num_nodes {
                if used_nodes.contains(&node) {
                    continue;
                }
                let cost: f64 = placed
                    .iter()
                    .map(|&(other, other_node)| {
                        let w = problem.weight(var, other).abs();
                        if !is_significant(w) {
                            return 0.0;
                        }
                        let d = index
                            .distance(node, other_node)
                            .map_or(unreachable_cost, f64::from);
                        d * w
                    })
                    .sum();
                if best_node.is_none_or(|(best, _)| cost < best) {
                    best_node = Some((cost, node));
                }
            }
            let (_, node) = best_node.expect("more nodes than variables");

            placement.add(var, node);
            placed.push((var, node));
            unplaced.remove(&var);
            used_nodes.insert(node);
        }

        debug!(
            "Placed {} variables on {} nodes",
            placement.len(),
            num_nodes
        );
        Ok(placement)
    }
}
