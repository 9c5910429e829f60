//! Property-based tests for swap-network permutation algebra.
//!
//! Tests the algebraic contracts every valid network must satisfy: the
//! composed and inverse permutation tables are exact inverses at every
//! depth, applying a swap layer twice is the identity, and the distance
//! matrix is symmetric with a zero diagonal.

use proptest::prelude::*;
use skein_net::{library, SwapNetwork};

/// Generate a line swap network with 2-9 nodes and 0..2n layers.
fn arb_line_network() -> impl Strategy<Value = SwapNetwork> {
    (2_u32..=9).prop_flat_map(|n| {
        (Just(n), 0_usize..(2 * n as usize)).prop_map(|(n, layer_count)| {
            let nodes: Vec<u32> = (0..n).collect();
            library::line(&nodes, Some(layer_count)).expect("line network is always valid")
        })
    })
}

proptest! {
    /// `composed_permutation(0)` is the identity, and at every depth the
    /// composed and inverse tables undo each other element-wise.
    #[test]
    fn test_permutation_tables_are_inverses(network in arb_line_network()) {
        prop_assert!(network.composed_permutation(0).is_identity());
        prop_assert!(network.inverse_composed_permutation(0).is_identity());

        for k in 0..=network.len() {
            let composed = network.composed_permutation(k);
            let inverse = network.inverse_composed_permutation(k);
            for i in 0..network.num_nodes() {
                prop_assert_eq!(inverse.apply(composed.apply(i)), i);
                prop_assert_eq!(composed.apply(inverse.apply(i)), i);
            }
        }
    }

    /// Applying the same swap layer twice returns the input unchanged.
    #[test]
    fn test_apply_swap_layer_involution(network in arb_line_network()) {
        let values: Vec<u32> = (0..network.num_nodes()).map(|i| i * 10).collect();
        for k in 0..network.len() {
            let once = network.apply_swap_layer(&values, k);
            let twice = network.apply_swap_layer(&once, k);
            prop_assert_eq!(&twice, &values);
        }
    }

    /// The distance matrix is symmetric with a zero diagonal, and every
    /// defined entry is at most the layer count.
    #[test]
    fn test_distance_matrix_shape(network in arb_line_network()) {
        let n = network.num_nodes();
        for i in 0..n {
            prop_assert_eq!(network.distance(i, i), Some(0));
            for j in 0..n {
                prop_assert_eq!(network.distance(i, j), network.distance(j, i));
                if let Some(d) = network.distance(i, j) {
                    prop_assert!(d as usize <= network.len());
                }
            }
        }
    }

    /// A line network with the default layer count connects every pair.
    #[test]
    fn test_default_line_reaches_full_connectivity(n in 2_u32..=9) {
        let nodes: Vec<u32> = (0..n).collect();
        let network = library::line(&nodes, None).expect("line network is always valid");
        prop_assert!(network.reaches_full_connectivity());
    }
}
