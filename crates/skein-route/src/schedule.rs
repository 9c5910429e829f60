//! Swap-interleaved layer scheduling.
//!
//! The scheduler walks a swap network depth by depth and emits, for every
//! depth, the interactions whose pair first becomes adjacent there, followed
//! by the network's swap layer. An interaction that lands on an edge the next
//! swap layer also exchanges is fused into a single combined operation.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use skein_net::{Edge, SwapNetwork};

use crate::error::{RouteError, RouteResult};
use crate::placement::Placement;
use crate::problem::{is_significant, InteractionGraph, VarId};

/// A single scheduled operation on physical nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// A pairwise interaction with coefficient `theta`.
    Interaction { a: u32, b: u32, theta: f64 },
    /// A pairwise interaction fused with the exchange of the same edge.
    InteractionSwap { a: u32, b: u32, theta: f64 },
    /// A plain exchange of two adjacent nodes.
    Swap { a: u32, b: u32 },
    /// A local bias term on a single node.
    Local { node: u32, theta: f64 },
}

/// Operations that run simultaneously. Every layer touches each node at most
/// once.
pub type OpLayer = Vec<Op>;

/// The output of the scheduler: ordered operation layers plus the placement
/// the variables end up in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    layers: Vec<OpLayer>,
    final_placement: Placement,
}

impl Schedule {
    /// The ordered operation layers.
    pub fn layers(&self) -> &[OpLayer] {
        &self.layers
    }

    /// Where each variable sits after the schedule has run.
    pub fn final_placement(&self) -> &Placement {
        &self.final_placement
    }

    /// Number of operation layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True if the schedule contains no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total number of operations across all layers.
    pub fn num_ops(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }
}

/// Schedules a problem's interactions over a swap network.
///
/// Construction pre-validates the whole problem against the placement and
/// the network, so [`schedule`](Self::schedule) itself cannot fail: every
/// significant pair is bucketed by the depth at which it first becomes
/// adjacent.
#[derive(Debug)]
pub struct LayerScheduler<'a> {
    problem: &'a InteractionGraph,
    initial: &'a Placement,
    network: &'a SwapNetwork,
    /// `buckets[d]` holds `(origin_a, origin_b, theta)` for pairs whose swap
    /// distance is exactly `d`, in coupling insertion order.
    buckets: Vec<Vec<(u32, u32, f64)>>,
}

impl<'a> LayerScheduler<'a> {
    /// Validate the problem against the placement and network, and bucket
    /// every significant pair by swap distance.
    pub fn new(
        problem: &'a InteractionGraph,
        initial: &'a Placement,
        network: &'a SwapNetwork,
    ) -> RouteResult<Self> {
        let num_nodes = network.num_nodes();
        if problem.num_vars() > num_nodes {
            return Err(RouteError::NetworkTooSmall {
                required: problem.num_vars(),
                available: num_nodes,
            });
        }

        // Every variable must sit on a node inside the network, couplings or
        // not: the final-placement permutation is applied to all of them.
        let mut positions = Vec::with_capacity(problem.num_vars() as usize);
        for raw in 0..problem.num_vars() {
            let var = VarId(raw);
            let node = initial
                .get_physical(var)
                .ok_or(RouteError::PlacementIncomplete { var })?;
            if node >= num_nodes {
                return Err(RouteError::NetworkTooSmall {
                    required: node + 1,
                    available: num_nodes,
                });
            }
            positions.push(node);
        }

        let index = network.index();
        let mut buckets = vec![Vec::new(); network.len() + 1];
        for (i, j, w) in problem.couplings() {
            if !is_significant(w) {
                continue;
            }
            if i == j {
                return Err(RouteError::NonLocalInteraction { a: i, b: j });
            }
            let (pi, pj) = (positions[i.0 as usize], positions[j.0 as usize]);
            if pi == pj {
                return Err(RouteError::NonLocalInteraction { a: i, b: j });
            }
            let depth = index
                .distance(pi, pj)
                .ok_or(RouteError::UnreachablePair {
                    phys_a: pi,
                    phys_b: pj,
                })?;
            buckets[depth as usize].push((pi, pj, w));
        }

        Ok(Self {
            problem,
            initial,
            network,
            buckets,
        })
    }

    /// Produce the operation layers.
    ///
    /// With `reverse` set the layer order is flipped, yielding a schedule
    /// that starts from the forward schedule's final placement and undoes it
    /// back to the initial one. Alternating forward and reversed schedules
    /// repeats the problem without any re-placement in between.
    pub fn schedule(&self, reverse: bool) -> Schedule {
        let index = self.network.index();
        let d_max = self.buckets.iter().rposition(|b| !b.is_empty());

        let mut layers: Vec<OpLayer> = Vec::new();
        let final_placement = match d_max {
            None => self.initial.clone(),
            Some(d_max) => {
                for depth in 0..=d_max {
                    let comp = index.composed(depth);
                    let mut pending: Vec<Edge> = if depth < d_max {
                        self.network.layer(depth).edges().to_vec()
                    } else {
                        Vec::new()
                    };

                    // Interactions at this depth, translated to current
                    // positions. Pairs bucketed at depth `d` are guaranteed
                    // adjacent here.
                    let mut fused: OpLayer = Vec::new();
                    let mut plain: Vec<(Edge, f64)> = Vec::new();
                    for &(pi, pj, theta) in &self.buckets[depth] {
                        let edge = Edge::new(comp.apply(pi), comp.apply(pj));
                        if let Some(pos) = pending.iter().position(|e| *e == edge) {
                            pending.remove(pos);
                            fused.push(Op::InteractionSwap {
                                a: edge.a(),
                                b: edge.b(),
                                theta,
                            });
                        } else {
                            plain.push((edge, theta));
                        }
                    }

                    layers.extend(self.partition_interactions(plain));

                    let mut tail = fused;
                    tail.extend(pending.iter().map(|e| Op::Swap { a: e.a(), b: e.b() }));
                    if !tail.is_empty() {
                        layers.push(tail);
                    }
                }
                self.initial.permuted(index.composed(d_max))
            }
        };

        let locals: OpLayer = self
            .problem
            .biases()
            .filter(|&(_, bias)| is_significant(bias))
            .map(|(var, theta)| Op::Local {
                node: final_placement
                    .get_physical(var)
                    .expect("placement validated at construction"),
                theta,
            })
            .collect();
        if !locals.is_empty() {
            layers.push(locals);
        }

        let final_placement = if reverse {
            layers.reverse();
            self.initial.clone()
        } else {
            final_placement
        };

        debug!(
            "Scheduled {} layers over a depth-{} network",
            layers.len(),
            self.network.len()
        );
        Schedule {
            layers,
            final_placement,
        }
    }

    /// Schedule `reps` repetitions of the problem, alternating forward and
    /// reversed passes so no re-placement is needed between them.
    ///
    /// An even repetition count returns the variables to the initial
    /// placement; an odd count ends at the forward schedule's final one.
    pub fn schedule_repetitions(&self, reps: usize) -> Schedule {
        if reps == 0 {
            return Schedule {
                layers: Vec::new(),
                final_placement: self.initial.clone(),
            };
        }
        let forward = self.schedule(false);
        if reps == 1 {
            return forward;
        }
        let backward = self.schedule(true);

        let mut layers = Vec::with_capacity(forward.len() * reps);
        for rep in 0..reps {
            let pass = if rep % 2 == 0 { &forward } else { &backward };
            layers.extend(pass.layers().iter().cloned());
        }
        let final_placement = if reps % 2 == 0 {
            self.initial.clone()
        } else {
            forward.final_placement().clone()
        };
        Schedule {
            layers,
            final_placement,
        }
    }

    /// Split interactions that share nodes into conflict-free sublayers.
    ///
    /// When the network carries a coloring that covers every edge involved,
    /// interactions are grouped by color in ascending order; otherwise a
    /// greedy maximal-matching pass peels off sublayers in iteration order.
    fn partition_interactions(&self, interactions: Vec<(Edge, f64)>) -> Vec<OpLayer> {
        if interactions.is_empty() {
            return Vec::new();
        }

        if let Some(coloring) = self.network.coloring() {
            if interactions.iter().all(|(e, _)| coloring.contains_key(e)) {
                let mut by_color: BTreeMap<u32, OpLayer> = BTreeMap::new();
                for (edge, theta) in &interactions {
                    by_color.entry(coloring[edge]).or_default().push(Op::Interaction {
                        a: edge.a(),
                        b: edge.b(),
                        theta: *theta,
                    });
                }
                return by_color.into_values().collect();
            }
        }

        let mut remaining = interactions;
        let mut sublayers = Vec::new();
        while !remaining.is_empty() {
            let mut used: FxHashSet<u32> = FxHashSet::default();
            let mut sublayer: OpLayer = Vec::new();
            remaining.retain(|&(edge, theta)| {
                if used.contains(&edge.a()) || used.contains(&edge.b()) {
                    return true;
                }
                used.insert(edge.a());
                used.insert(edge.b());
                sublayer.push(Op::Interaction {
                    a: edge.a(),
                    b: edge.b(),
                    theta,
                });
                false
            });
            sublayers.push(sublayer);
        }
        sublayers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::VarId;
    use skein_net::library;

    fn four_cycle() -> InteractionGraph {
        let mut problem = InteractionGraph::new(4);
        problem.set_coupling(VarId(0), VarId(1), 1.0).unwrap();
        problem.set_coupling(VarId(1), VarId(2), 1.0).unwrap();
        problem.set_coupling(VarId(2), VarId(3), 1.0).unwrap();
        problem.set_coupling(VarId(0), VarId(3), 1.0).unwrap();
        problem
    }

    #[test]
    fn test_four_cycle_on_line4() {
        let network = library::line(&[0, 1, 2, 3], None).unwrap();
        let problem = four_cycle();
        let initial = Placement::trivial(4);
        let scheduler = LayerScheduler::new(&problem, &initial, &network).unwrap();
        let schedule = scheduler.schedule(false);

        let expected: Vec<OpLayer> = vec![
            vec![
                Op::Interaction { a: 0, b: 1, theta: 1.0 },
                Op::Interaction { a: 2, b: 3, theta: 1.0 },
            ],
            vec![Op::InteractionSwap { a: 1, b: 2, theta: 1.0 }],
            vec![Op::Swap { a: 0, b: 1 }, Op::Swap { a: 2, b: 3 }],
            vec![Op::Interaction { a: 1, b: 2, theta: 1.0 }],
        ];
        assert_eq!(schedule.layers(), &expected[..]);

        let fin = schedule.final_placement();
        assert_eq!(fin.get_physical(VarId(0)), Some(1));
        assert_eq!(fin.get_physical(VarId(1)), Some(3));
        assert_eq!(fin.get_physical(VarId(2)), Some(0));
        assert_eq!(fin.get_physical(VarId(3)), Some(2));
    }

    #[test]
    fn test_unreachable_pair() {
        // A single layer cannot bring the line endpoints together.
        let network = library::line(&[0, 1, 2, 3], Some(1)).unwrap();
        let mut problem = InteractionGraph::new(4);
        problem.set_coupling(VarId(0), VarId(3), 1.0).unwrap();
        let initial = Placement::trivial(4);
        assert!(matches!(
            LayerScheduler::new(&problem, &initial, &network),
            Err(RouteError::UnreachablePair {
                phys_a: 0,
                phys_b: 3
            })
        ));
    }

    #[test]
    fn test_rejects_self_interaction() {
        let network = library::line(&[0, 1, 2], None).unwrap();
        let mut problem = InteractionGraph::new(3);
        problem.set_coupling(VarId(1), VarId(1), 1.0).unwrap();
        let initial = Placement::trivial(3);
        assert!(matches!(
            LayerScheduler::new(&problem, &initial, &network),
            Err(RouteError::NonLocalInteraction { .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_node_for_uncoupled_variable() {
        // An uncoupled variable still rides the final permutation, so a
        // placement pointing outside the network must fail up front.
        let network = library::line(&[0, 1, 2], None).unwrap();
        let mut problem = InteractionGraph::new(3);
        problem.set_coupling(VarId(0), VarId(1), 1.0).unwrap();
        let mut initial = Placement::trivial(2);
        initial.add(VarId(2), 7);
        assert!(matches!(
            LayerScheduler::new(&problem, &initial, &network),
            Err(RouteError::NetworkTooSmall {
                required: 8,
                available: 3
            })
        ));
    }

    #[test]
    fn test_rejects_unplaced_uncoupled_variable() {
        let network = library::line(&[0, 1, 2], None).unwrap();
        let mut problem = InteractionGraph::new(3);
        problem.set_coupling(VarId(0), VarId(1), 1.0).unwrap();
        let initial = Placement::trivial(2);
        assert!(matches!(
            LayerScheduler::new(&problem, &initial, &network),
            Err(RouteError::PlacementIncomplete { var: VarId(2) })
        ));
    }

    #[test]
    fn test_rejects_incomplete_placement() {
        let network = library::line(&[0, 1, 2], None).unwrap();
        let mut problem = InteractionGraph::new(3);
        problem.set_coupling(VarId(0), VarId(1), 1.0).unwrap();
        let initial = Placement::new();
        assert!(matches!(
            LayerScheduler::new(&problem, &initial, &network),
            Err(RouteError::PlacementIncomplete { var: VarId(0) })
        ));
    }

    #[test]
    fn test_insignificant_couplings_produce_nothing() {
        let network = library::line(&[0, 1, 2, 3], None).unwrap();
        let mut problem = InteractionGraph::new(4);
        problem.set_coupling(VarId(0), VarId(3), 1e-16).unwrap();
        let initial = Placement::trivial(4);
        let scheduler = LayerScheduler::new(&problem, &initial, &network).unwrap();
        let schedule = scheduler.schedule(false);
        assert!(schedule.is_empty());
        assert_eq!(schedule.final_placement(), &initial);
    }

    #[test]
    fn test_locals_only() {
        let network = library::line(&[0, 1, 2], None).unwrap();
        let mut problem = InteractionGraph::new(3);
        problem.set_bias(VarId(0), 0.5).unwrap();
        problem.set_bias(VarId(2), -0.5).unwrap();
        let initial = Placement::trivial(3);
        let scheduler = LayerScheduler::new(&problem, &initial, &network).unwrap();
        let schedule = scheduler.schedule(false);

        assert_eq!(schedule.len(), 1);
        assert_eq!(
            schedule.layers()[0],
            vec![
                Op::Local { node: 0, theta: 0.5 },
                Op::Local { node: 2, theta: -0.5 },
            ]
        );
        assert_eq!(schedule.final_placement(), &initial);
    }

    #[test]
    fn test_biases_land_on_final_positions() {
        let network = library::line(&[0, 1, 2, 3], None).unwrap();
        let problem = {
            let mut p = four_cycle();
            p.set_bias(VarId(0), 0.25).unwrap();
            p
        };
        let initial = Placement::trivial(4);
        let scheduler = LayerScheduler::new(&problem, &initial, &network).unwrap();
        let schedule = scheduler.schedule(false);

        // Variable 0 ends on node 1, so its bias does too, in the last layer.
        let last = schedule.layers().last().unwrap();
        assert_eq!(last, &vec![Op::Local { node: 1, theta: 0.25 }]);
    }

    #[test]
    fn test_reverse_flips_layers_and_restores_placement() {
        let network = library::line(&[0, 1, 2, 3], None).unwrap();
        let problem = four_cycle();
        let initial = Placement::trivial(4);
        let scheduler = LayerScheduler::new(&problem, &initial, &network).unwrap();

        let forward = scheduler.schedule(false);
        let backward = scheduler.schedule(true);

        let mut flipped = forward.layers().to_vec();
        flipped.reverse();
        assert_eq!(backward.layers(), &flipped[..]);
        assert_eq!(backward.final_placement(), &initial);
    }

    #[test]
    fn test_repetition_parity() {
        let network = library::line(&[0, 1, 2, 3], None).unwrap();
        let problem = four_cycle();
        let initial = Placement::trivial(4);
        let scheduler = LayerScheduler::new(&problem, &initial, &network).unwrap();
        let forward = scheduler.schedule(false);

        for reps in 1..=4 {
            let repeated = scheduler.schedule_repetitions(reps);
            assert_eq!(repeated.len(), forward.len() * reps);
            if reps % 2 == 0 {
                assert_eq!(repeated.final_placement(), &initial);
            } else {
                assert_eq!(repeated.final_placement(), forward.final_placement());
            }
        }
        assert!(scheduler.schedule_repetitions(0).is_empty());
    }

    #[test]
    fn test_greedy_partition_without_coloring() {
        use skein_net::{CouplingGraph, SwapLayer, SwapNetwork};

        // Same line network but with no coloring: interactions that share a
        // node must split into separate sublayers.
        let graph = CouplingGraph::line(3);
        let layers = vec![SwapLayer::from_pairs(&[(1, 2)])];
        let network = SwapNetwork::new(graph, layers, None).unwrap();

        let mut problem = InteractionGraph::new(3);
        problem.set_coupling(VarId(0), VarId(1), 1.0).unwrap();
        problem.set_coupling(VarId(1), VarId(2), 2.0).unwrap();
        let initial = Placement::trivial(3);
        let scheduler = LayerScheduler::new(&problem, &initial, &network).unwrap();
        let schedule = scheduler.schedule(false);

        assert_eq!(schedule.len(), 2);
        assert_eq!(
            schedule.layers()[0],
            vec![Op::Interaction { a: 0, b: 1, theta: 1.0 }]
        );
        assert_eq!(
            schedule.layers()[1],
            vec![Op::Interaction { a: 1, b: 2, theta: 2.0 }]
        );
    }
}
