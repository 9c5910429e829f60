//! Weighted interaction structures over logical variables.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RouteError, RouteResult};

/// Coefficients with absolute value below this threshold are treated as
/// absent and never produce an operation.
pub const COUPLING_EPS: f64 = 1e-14;

/// Check whether a coefficient is large enough to schedule.
#[inline]
pub fn is_significant(w: f64) -> bool {
    w.abs() >= COUPLING_EPS
}

/// Unique identifier for a logical variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub u32);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u32> for VarId {
    fn from(id: u32) -> Self {
        VarId(id)
    }
}

impl From<usize> for VarId {
    fn from(id: usize) -> Self {
        VarId(u32::try_from(id).expect("VarId overflow: exceeds u32::MAX"))
    }
}

/// A symmetric, weighted pairwise-interaction structure over `num_vars`
/// logical variables, with optional per-variable local biases.
///
/// Couplings and biases keep their insertion order, which downstream
/// consumers use for deterministic tie-breaking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionGraph {
    num_vars: u32,
    /// Pair coefficients, normalized with the smaller variable first.
    couplings: Vec<(VarId, VarId, f64)>,
    coupling_index: FxHashMap<(VarId, VarId), usize>,
    /// Local bias coefficients.
    biases: Vec<(VarId, f64)>,
    bias_index: FxHashMap<VarId, usize>,
}

impl InteractionGraph {
    /// Create an empty interaction graph over `num_vars` variables.
    pub fn new(num_vars: u32) -> Self {
        Self {
            num_vars,
            ..Self::default()
        }
    }

    /// Number of logical variables.
    #[inline]
    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    fn check_var(&self, var: VarId) -> RouteResult<()> {
        if var.0 >= self.num_vars {
            return Err(RouteError::VariableOutOfRange {
                var,
                num_vars: self.num_vars,
            });
        }
        Ok(())
    }

    /// Set the coefficient of the unordered pair `{i, j}`, replacing any
    /// previous value.
    pub fn set_coupling(&mut self, i: VarId, j: VarId, weight: f64) -> RouteResult<()> {
        self.check_var(i)?;
        self.check_var(j)?;
        let key = (i.min(j), i.max(j));
        match self.coupling_index.get(&key) {
            Some(&idx) => self.couplings[idx].2 = weight,
            None => {
                self.coupling_index.insert(key, self.couplings.len());
                self.couplings.push((key.0, key.1, weight));
            }
        }
        Ok(())
    }

    /// The coefficient of the unordered pair `{i, j}`; zero if absent.
    pub fn weight(&self, i: VarId, j: VarId) -> f64 {
        let key = (i.min(j), i.max(j));
        self.coupling_index
            .get(&key)
            .map_or(0.0, |&idx| self.couplings[idx].2)
    }

    /// Set the local bias of a variable, replacing any previous value.
    pub fn set_bias(&mut self, var: VarId, bias: f64) -> RouteResult<()> {
        self.check_var(var)?;
        match self.bias_index.get(&var) {
            Some(&idx) => self.biases[idx].1 = bias,
            None => {
                self.bias_index.insert(var, self.biases.len());
                self.biases.push((var, bias));
            }
        }
        Ok(())
    }

    /// The local bias of a variable; zero if absent.
    pub fn bias(&self, var: VarId) -> f64 {
        self.bias_index
            .get(&var)
            .map_or(0.0, |&idx| self.biases[idx].1)
    }

    /// Pair coefficients in insertion order.
    pub fn couplings(&self) -> impl Iterator<Item = (VarId, VarId, f64)> + '_ {
        self.couplings.iter().copied()
    }

    /// Local biases in insertion order.
    pub fn biases(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.biases.iter().copied()
    }
}
