//! Permutations over physical node positions.

use crate::error::{NetError, NetResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bijection on `0..n`.
///
/// Entry `i` is the destination of position `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permutation(Vec<u32>);

impl Permutation {
    /// The identity permutation on `0..n`.
    pub fn identity(n: u32) -> Self {
        Self((0..n).collect())
    }

    /// Create a permutation from its destination table.
    ///
    /// Fails unless `entries` is a bijection onto `0..entries.len()`.
    pub fn from_vec(entries: Vec<u32>) -> NetResult<Self> {
        let n = entries.len();
        let mut seen = vec![false; n];
        for &dest in &entries {
            let dest = dest as usize;
            if dest >= n {
                return Err(NetError::MalformedPermutation(format!(
                    "entry {dest} out of range for length {n}"
                )));
            }
            if seen[dest] {
                return Err(NetError::MalformedPermutation(format!(
                    "destination {dest} appears twice"
                )));
            }
            seen[dest] = true;
        }
        Ok(Self(entries))
    }

    /// Length of the permutation's domain.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty permutation.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The destination of position `i`.
    #[inline]
    pub fn apply(&self, i: u32) -> u32 {
        self.0[i as usize]
    }

    /// The underlying destination table.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// The element-wise inverse: if `self` sends `i` to `j`, the inverse
    /// sends `j` to `i`.
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0u32; self.0.len()];
        for (i, &dest) in self.0.iter().enumerate() {
            inv[dest as usize] = u32::try_from(i).expect("permutation length exceeds u32");
        }
        Self(inv)
    }

    /// Exchange the destinations of positions `i` and `j`.
    pub(crate) fn swap_entries(&mut self, i: u32, j: u32) {
        self.0.swap(i as usize, j as usize);
    }

    /// True if every position maps to itself.
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &d)| i as u32 == d)
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, dest) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dest}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let perm = Permutation::identity(4);
        assert!(perm.is_identity());
        assert_eq!(perm.apply(3), 3);
    }

    #[test]
    fn test_inverse() {
        let perm = Permutation::from_vec(vec![2, 0, 3, 1]).unwrap();
        let inv = perm.inverse();
        for i in 0..4 {
            assert_eq!(inv.apply(perm.apply(i)), i);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            Permutation::from_vec(vec![0, 4, 1]),
            Err(NetError::MalformedPermutation(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate() {
        assert!(matches!(
            Permutation::from_vec(vec![0, 1, 1]),
            Err(NetError::MalformedPermutation(_))
        ));
    }
}
