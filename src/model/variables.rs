//! Decision variable declarations.

use std::fmt;
use std::ops::Range;

/// Kind of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarKind {
    /// Real value in `[lo, hi]`.
    Continuous,
    /// Real value in `[lo, hi]` with `lo >= 0`.
    Positive,
    /// Integer value in `[lo, hi]`.
    Integer,
    /// 0 or 1.
    Binary,
    /// Permutation of `0..k`.
    Sequence,
}

impl VarKind {
    /// Lowercase name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            VarKind::Continuous => "continuous",
            VarKind::Positive => "positive",
            VarKind::Integer => "integer",
            VarKind::Binary => "binary",
            VarKind::Sequence => "sequence",
        }
    }

    /// Whether decoded values are rounded to integers.
    pub fn is_discrete(self) -> bool {
        matches!(self, VarKind::Integer | VarKind::Binary | VarKind::Sequence)
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index ranges of a variable.
///
/// An empty dimension list is a scalar. `Shape::new(&[3, 4])` is a 3×4 block
/// of elements laid out row-major inside the chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape(Vec<usize>);

impl Shape {
    /// A single element.
    pub fn scalar() -> Self {
        Shape(Vec::new())
    }

    /// One index range of length `n`.
    pub fn vector(n: usize) -> Self {
        Shape(vec![n])
    }

    /// Nested index ranges.
    pub fn new(dims: &[usize]) -> Self {
        Shape(dims.to_vec())
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn is_scalar(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of scalar elements (1 for a scalar).
    pub fn len(&self) -> usize {
        self.0.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major flat offset of an index tuple.
    ///
    /// Returns `None` when the tuple has the wrong arity or is out of range.
    /// A scalar accepts the empty tuple only.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.0.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &dim) in index.iter().zip(&self.0) {
            if i >= dim {
                return None;
            }
            flat = flat * dim + i;
        }
        Some(flat)
    }

    /// Index tuple of a flat offset.
    pub fn unflatten(&self, mut flat: usize) -> Vec<usize> {
        let mut index = vec![0; self.0.len()];
        for (slot, &dim) in index.iter_mut().zip(&self.0).rev() {
            *slot = flat % dim;
            flat /= dim;
        }
        index
    }
}

impl From<()> for Shape {
    fn from(_: ()) -> Self {
        Shape::scalar()
    }
}

impl From<usize> for Shape {
    fn from(n: usize) -> Self {
        Shape::vector(n)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape::new(&dims)
    }
}

/// Closed interval `[lo, hi]` a decoded value lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bound {
    pub lo: f64,
    pub hi: f64,
}

impl Bound {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// `[0, 1]`.
    pub fn unit() -> Self {
        Self { lo: 0.0, hi: 1.0 }
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

impl From<(f64, f64)> for Bound {
    fn from((lo, hi): (f64, f64)) -> Self {
        Bound::new(lo, hi)
    }
}

/// Stable handle of a declared variable, assigned at discovery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarHandle(pub(crate) usize);

impl VarHandle {
    /// Declaration position of the variable.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Immutable description of one declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    pub name: String,
    pub kind: VarKind,
    pub shape: Shape,
    pub bound: Bound,
    pub(crate) spread: Range<usize>,
}

impl VariableSpec {
    /// Column range `[start, end)` inside the chromosome.
    pub fn spread(&self) -> Range<usize> {
        self.spread.clone()
    }

    /// Number of chromosome genes this variable owns.
    pub fn width(&self) -> usize {
        self.spread.len()
    }

    /// Decodes the genes of this variable for one agent into `out`.
    ///
    /// `genes` must hold exactly [`width`](Self::width) values.
    pub fn decode_into(&self, genes: &[f64], out: &mut Vec<f64>) {
        debug_assert_eq!(genes.len(), self.width());
        match self.kind {
            VarKind::Continuous | VarKind::Positive => {
                out.extend(genes.iter().map(|&s| self.bound.lo + s * self.bound.width()));
            }
            VarKind::Integer | VarKind::Binary => {
                out.extend(
                    genes
                        .iter()
                        .map(|&s| (self.bound.lo + s * self.bound.width()).round()),
                );
            }
            VarKind::Sequence => {
                out.extend(argsort(genes).into_iter().map(|i| i as f64));
            }
        }
    }

    /// Decodes the genes of this variable for one agent.
    pub fn decode(&self, genes: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width());
        self.decode_into(genes, &mut out);
        out
    }

    /// Maps decoded values back to unit-interval genes.
    ///
    /// For sequences `values` is a permutation; element `perm[r]` receives
    /// gene `r / k`, so decoding reproduces the permutation.
    pub fn encode(&self, values: &[f64]) -> Vec<f64> {
        match self.kind {
            VarKind::Sequence => {
                let k = values.len().max(1) as f64;
                let mut genes = vec![0.0; values.len()];
                for (rank, &item) in values.iter().enumerate() {
                    if let Some(slot) = genes.get_mut(item as usize) {
                        *slot = rank as f64 / k;
                    }
                }
                genes
            }
            _ => {
                let width = self.bound.width();
                values
                    .iter()
                    .map(|&v| {
                        if width > 0.0 {
                            ((v - self.bound.lo) / width).clamp(0.0, 1.0)
                        } else {
                            0.0
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Stable argsort: positions ordered by ascending key, ties by first occurrence.
pub(crate) fn argsort(keys: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
    order
}
