//! Spread assignment and chromosome decoding.
//!
//! Every declared variable owns a contiguous range of genes inside a flat
//! chromosome of unit-interval values, in the manner of random-key
//! encodings: the search only ever sees `[0, 1]` genes and the registry maps
//! them back to typed values.

use std::collections::HashMap;

use super::solution::{DecodedVar, Solution};
use super::variables::{Bound, Shape, VarHandle, VarKind, VariableSpec};
use crate::error::{ConfigError, HeurError, SchemaError};

/// Arena of declared variables with their chromosome spreads.
///
/// Built once by the discovery pass and shared read-only afterwards.
/// Variables are addressed by [`VarHandle`]; the name map is only used to
/// reject duplicates and for lookups by callers.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    specs: Vec<VariableSpec>,
    names: HashMap<String, VarHandle>,
    genes: usize,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable and assigns it the next free spread.
    pub fn declare(
        &mut self,
        name: &str,
        kind: VarKind,
        shape: Shape,
        bound: Bound,
    ) -> Result<VarHandle, HeurError> {
        if self.names.contains_key(name) {
            return Err(SchemaError::DuplicateName(name.to_string()).into());
        }
        let bound = validate(name, kind, &shape, bound)?;

        let handle = VarHandle(self.specs.len());
        let width = shape.len();
        let spread = self.genes..self.genes + width;
        self.genes += width;
        self.specs.push(VariableSpec {
            name: name.to_string(),
            kind,
            shape,
            bound,
            spread,
        });
        self.names.insert(name.to_string(), handle);
        Ok(handle)
    }

    /// Chromosome length `N`.
    pub fn chromosome_len(&self) -> usize {
        self.genes
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn spec(&self, handle: VarHandle) -> &VariableSpec {
        &self.specs[handle.0]
    }

    pub fn get(&self, handle: VarHandle) -> Option<&VariableSpec> {
        self.specs.get(handle.0)
    }

    pub fn handle_of(&self, name: &str) -> Option<VarHandle> {
        self.names.get(name).copied()
    }

    /// Specs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableSpec> {
        self.specs.iter()
    }

    /// Decodes a full chromosome into a typed solution.
    pub fn decode(&self, chromosome: &[f64]) -> Solution {
        debug_assert_eq!(chromosome.len(), self.genes);
        let vars = self
            .specs
            .iter()
            .map(|spec| {
                let values = spec.decode(&chromosome[spec.spread()]);
                (
                    spec.name.clone(),
                    DecodedVar {
                        kind: spec.kind,
                        shape: spec.shape.clone(),
                        values,
                    },
                )
            })
            .collect();
        Solution::new(vars)
    }

    /// Encodes typed values back into a chromosome.
    ///
    /// Variables absent from `solution` get genes of 0.
    pub fn encode(&self, solution: &Solution) -> Vec<f64> {
        let mut chromosome = vec![0.0; self.genes];
        for spec in &self.specs {
            if let Some(var) = solution.var(&spec.name) {
                let genes = spec.encode(&var.values);
                chromosome[spec.spread()].copy_from_slice(&genes[..spec.width()]);
            }
        }
        chromosome
    }
}

fn validate(name: &str, kind: VarKind, shape: &Shape, bound: Bound) -> Result<Bound, ConfigError> {
    let invalid = |reason| ConfigError::InvalidBound {
        name: name.to_string(),
        lo: bound.lo,
        hi: bound.hi,
        reason,
    };
    let unsupported = || ConfigError::UnsupportedDimension {
        name: name.to_string(),
        kind: kind.name(),
        shape: shape.dims().to_vec(),
    };

    if shape.is_empty() {
        return Err(unsupported());
    }

    match kind {
        VarKind::Binary => Ok(Bound::unit()),
        VarKind::Sequence => {
            if shape.dims().len() != 1 {
                return Err(unsupported());
            }
            Ok(Bound::new(0.0, (shape.len() - 1) as f64))
        }
        VarKind::Continuous | VarKind::Positive | VarKind::Integer => {
            if !bound.lo.is_finite() || !bound.hi.is_finite() {
                return Err(invalid("bounds must be finite"));
            }
            if bound.lo > bound.hi {
                return Err(invalid("lower bound exceeds upper bound"));
            }
            if kind == VarKind::Positive && bound.lo < 0.0 {
                return Err(invalid("positive variables need a non-negative lower bound"));
            }
            Ok(bound)
        }
    }
}
