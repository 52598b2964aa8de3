//! Decoded solutions.

use std::collections::BTreeMap;

use super::variables::{Shape, VarKind};

/// Decoded values of one variable for one agent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedVar {
    pub kind: VarKind,
    pub shape: Shape,
    /// Row-major element values.
    pub values: Vec<f64>,
}

/// Typed mapping from variable name (and index tuple) to decoded value.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    vars: BTreeMap<String, DecodedVar>,
}

impl Solution {
    pub(crate) fn new(vars: BTreeMap<String, DecodedVar>) -> Self {
        Self { vars }
    }

    pub fn var(&self, name: &str) -> Option<&DecodedVar> {
        self.vars.get(name)
    }

    /// Value of a scalar variable.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name, &[])
    }

    /// Value at an index tuple; `&[]` for scalars.
    pub fn get(&self, name: &str, index: &[usize]) -> Option<f64> {
        let var = self.vars.get(name)?;
        let flat = var.shape.flat_index(index)?;
        var.values.get(flat).copied()
    }

    /// Integer value at an index tuple, for integer, binary and sequence kinds.
    pub fn integer(&self, name: &str, index: &[usize]) -> Option<i64> {
        let var = self.vars.get(name)?;
        if !var.kind.is_discrete() {
            return None;
        }
        self.get(name, index).map(|v| v as i64)
    }

    /// Binary value at an index tuple.
    pub fn binary(&self, name: &str, index: &[usize]) -> Option<bool> {
        match self.vars.get(name)?.kind {
            VarKind::Binary => self.get(name, index).map(|v| v >= 0.5),
            _ => None,
        }
    }

    /// Permutation held by a sequence variable.
    pub fn permutation(&self, name: &str) -> Option<Vec<usize>> {
        let var = self.vars.get(name)?;
        if var.kind != VarKind::Sequence {
            return None;
        }
        Some(var.values.iter().map(|&v| v as usize).collect())
    }

    /// Variable names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// All `(name, index tuple, value)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec<usize>, f64)> + '_ {
        self.vars.iter().flat_map(|(name, var)| {
            var.values
                .iter()
                .enumerate()
                .map(move |(flat, &v)| (name.as_str(), var.shape.unflatten(flat), v))
        })
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
