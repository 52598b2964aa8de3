//! Per-agent values produced while tracing a model.
//!
//! During an evaluation pass every expression is a [`Column`] holding one
//! value per traced agent, so the model function is written once and runs
//! vectorised over the whole population. During discovery the same code
//! runs on single-agent placeholders.

use std::ops::{Add, Deref, Div, Mul, Neg, Sub};

use super::variables::{Shape, VarHandle, VarKind};

/// One value per traced agent.
///
/// Binary operations broadcast a length-1 operand against a longer one.
///
/// # Panics
///
/// Operations between two columns of different lengths greater than one
/// panic, like mismatched shapes in array libraries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column(Vec<f64>);

impl Column {
    pub fn new(values: Vec<f64>) -> Self {
        Column(values)
    }

    /// A column repeating `value` `len` times.
    pub fn constant(value: f64, len: usize) -> Self {
        Column(vec![value; len])
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Column {
        Column(self.0.iter().map(|&v| f(v)).collect())
    }

    pub fn zip_with(&self, other: &Column, f: impl Fn(f64, f64) -> f64) -> Column {
        broadcast(self, other, f)
    }

    pub fn powi(&self, n: i32) -> Column {
        self.map(|v| v.powi(n))
    }

    pub fn powf(&self, n: f64) -> Column {
        self.map(|v| v.powf(n))
    }

    pub fn abs(&self) -> Column {
        self.map(f64::abs)
    }

    pub fn sqrt(&self) -> Column {
        self.map(f64::sqrt)
    }

    /// Element-wise minimum.
    pub fn min(&self, rhs: impl Into<Operand>) -> Column {
        broadcast(self, &rhs.into().into_column(), f64::min)
    }

    /// Element-wise maximum.
    pub fn max(&self, rhs: impl Into<Operand>) -> Column {
        broadcast(self, &rhs.into().into_column(), f64::max)
    }

    /// `self <= rhs`, violated by `max(0, self - rhs)`.
    pub fn le(&self, rhs: impl Into<Operand>) -> Constraint {
        Constraint::new(broadcast(self, &rhs.into().into_column(), |l, r| {
            excess(l - r)
        }))
    }

    /// `self >= rhs`, violated by `max(0, rhs - self)`.
    pub fn ge(&self, rhs: impl Into<Operand>) -> Constraint {
        Constraint::new(broadcast(self, &rhs.into().into_column(), |l, r| {
            excess(r - l)
        }))
    }

    /// `self == rhs`, violated by `|self - rhs|`.
    pub fn equals(&self, rhs: impl Into<Operand>) -> Constraint {
        Constraint::new(broadcast(self, &rhs.into().into_column(), |l, r| {
            (l - r).abs()
        }))
    }

    /// `|self - rhs| <= tolerance`.
    pub fn equals_within(&self, rhs: impl Into<Operand>, tolerance: f64) -> Constraint {
        Constraint::new(broadcast(self, &rhs.into().into_column(), |l, r| {
            excess((l - r).abs() - tolerance)
        }))
    }
}

impl Deref for Column {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column(values)
    }
}

impl std::iter::Sum for Column {
    fn sum<I: Iterator<Item = Column>>(iter: I) -> Column {
        iter.fold(Column(vec![0.0]), |acc, c| &acc + &c)
    }
}

/// Positive part of a difference. NaN stays NaN so the tracer can flag it.
fn excess(d: f64) -> f64 {
    if d.is_nan() {
        d
    } else {
        d.max(0.0)
    }
}

fn broadcast(a: &Column, b: &Column, f: impl Fn(f64, f64) -> f64) -> Column {
    match (a.len(), b.len()) {
        (n, m) if n == m => Column(a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect()),
        (_, 1) => {
            let y = b[0];
            Column(a.iter().map(|&x| f(x, y)).collect())
        }
        (1, _) => {
            let x = a[0];
            Column(b.iter().map(|&y| f(x, y)).collect())
        }
        (n, m) => panic!("column length mismatch: {n} vs {m}"),
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Column> for &Column {
            type Output = Column;
            fn $method(self, rhs: &Column) -> Column {
                broadcast(self, rhs, |a, b| a $op b)
            }
        }

        impl $trait<Column> for Column {
            type Output = Column;
            fn $method(self, rhs: Column) -> Column {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Column> for Column {
            type Output = Column;
            fn $method(self, rhs: &Column) -> Column {
                (&self).$method(rhs)
            }
        }

        impl $trait<Column> for &Column {
            type Output = Column;
            fn $method(self, rhs: Column) -> Column {
                self.$method(&rhs)
            }
        }

        impl $trait<f64> for &Column {
            type Output = Column;
            fn $method(self, rhs: f64) -> Column {
                self.map(|a| a $op rhs)
            }
        }

        impl $trait<f64> for Column {
            type Output = Column;
            fn $method(self, rhs: f64) -> Column {
                (&self).$method(rhs)
            }
        }

        impl $trait<&Column> for f64 {
            type Output = Column;
            fn $method(self, rhs: &Column) -> Column {
                rhs.map(|b| self $op b)
            }
        }

        impl $trait<Column> for f64 {
            type Output = Column;
            fn $method(self, rhs: Column) -> Column {
                self.$method(&rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, +);
impl_binary_op!(Sub, sub, -);
impl_binary_op!(Mul, mul, *);
impl_binary_op!(Div, div, /);

impl Neg for &Column {
    type Output = Column;
    fn neg(self) -> Column {
        self.map(|v| -v)
    }
}

impl Neg for Column {
    type Output = Column;
    fn neg(self) -> Column {
        -&self
    }
}

/// Right-hand side of a comparison or element-wise min/max.
#[derive(Debug, Clone)]
pub enum Operand {
    Scalar(f64),
    Column(Column),
}

impl Operand {
    fn into_column(self) -> Column {
        match self {
            Operand::Scalar(v) => Column(vec![v]),
            Operand::Column(c) => c,
        }
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Scalar(v)
    }
}

impl From<Column> for Operand {
    fn from(c: Column) -> Self {
        Operand::Column(c)
    }
}

impl From<&Column> for Operand {
    fn from(c: &Column) -> Self {
        Operand::Column(c.clone())
    }
}

/// A constraint with its per-agent violation (0 when satisfied).
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    label: Option<String>,
    violation: Column,
}

impl Constraint {
    fn new(violation: Column) -> Self {
        Self {
            label: None,
            violation,
        }
    }

    /// Attaches a label used in diagnostics.
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Non-negative violation per agent.
    pub fn violation(&self) -> &Column {
        &self.violation
    }
}

/// Decoded values of one declared variable for every traced agent.
///
/// Values are stored agent-major: the decoded elements of agent 0, then
/// agent 1, and so on.
#[derive(Debug, Clone)]
pub struct Var {
    handle: VarHandle,
    kind: VarKind,
    shape: Shape,
    agents: usize,
    values: Vec<f64>,
}

impl Var {
    pub(crate) fn new(
        handle: VarHandle,
        kind: VarKind,
        shape: Shape,
        agents: usize,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(values.len(), agents * shape.len());
        Self {
            handle,
            kind,
            shape,
            agents,
            values,
        }
    }

    pub fn handle(&self) -> VarHandle {
        self.handle
    }

    pub fn kind(&self) -> VarKind {
        self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of traced agents.
    pub fn agents(&self) -> usize {
        self.agents
    }

    /// Number of scalar elements.
    pub fn width(&self) -> usize {
        self.shape.len()
    }

    /// Column of a scalar variable (element 0 of any variable).
    pub fn value(&self) -> Column {
        self.element(0)
    }

    /// Column of the element at a row-major flat offset.
    ///
    /// # Panics
    /// Panics if `flat >= self.width()`.
    pub fn element(&self, flat: usize) -> Column {
        let width = self.width();
        assert!(flat < width, "element {flat} out of range for width {width}");
        Column(
            self.values
                .iter()
                .skip(flat)
                .step_by(width)
                .copied()
                .collect(),
        )
    }

    /// Column of the element at an index tuple.
    ///
    /// # Panics
    /// Panics if the tuple does not address an element of the shape.
    pub fn at(&self, index: &[usize]) -> Column {
        match self.get(index) {
            Some(column) => column,
            None => panic!("index {index:?} out of range for shape {:?}", self.shape.dims()),
        }
    }

    /// Column of the element at an index tuple, or `None` when out of range.
    pub fn get(&self, index: &[usize]) -> Option<Column> {
        self.shape.flat_index(index).map(|flat| self.element(flat))
    }

    /// Columns of all elements in row-major order.
    pub fn elements(&self) -> impl Iterator<Item = Column> + '_ {
        (0..self.width()).map(move |flat| self.element(flat))
    }

    /// Per-agent sum over all elements.
    pub fn sum(&self) -> Column {
        Column(
            self.values
                .chunks(self.width())
                .map(|row| row.iter().sum())
                .collect(),
        )
    }

    /// Decoded elements of one agent.
    pub fn agent(&self, agent: usize) -> &[f64] {
        let width = self.width();
        &self.values[agent * width..(agent + 1) * width]
    }
}
