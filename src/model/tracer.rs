//! Two-pass tracing of a user model.
//!
//! A model is a function of a [`TraceContext`]. The same function runs in
//! three modes:
//!
//! - **Discovery**: once, before anything else. Declarations are recorded
//!   into a [`SchemaRegistry`] and return placeholder values decoded from an
//!   all-zero chromosome. Constraints and objectives only record their labels
//!   and directions.
//! - **Evaluate**: once per population evaluation. Declarations return the
//!   decoded values of every agent; constraints accumulate the per-agent
//!   penalty and objectives collect per-agent columns.
//! - **FeasibilityCheck**: like evaluate, but objectives are ignored.
//!
//! Every later pass must declare the same variables in the same order as
//! discovery; any difference is reported as [`SchemaError::Divergent`].

use tracing::debug;

use super::codec::SchemaRegistry;
use super::column::{Column, Constraint, Var};
use super::solution::Solution;
use super::variables::{Bound, Shape, VarHandle, VarKind, VariableSpec};
use crate::error::{HeurError, SchemaError};
use crate::fitness::{Direction, Feasibility};

/// A model function traced by the engine.
///
/// `build` must not have side effects outside `ctx`: it runs once for
/// discovery and again for every evaluation.
pub trait HeurModel: Send + Sync {
    fn build(&self, ctx: &mut TraceContext<'_>) -> Result<(), HeurError>;
}

impl<F> HeurModel for F
where
    F: Fn(&mut TraceContext<'_>) -> Result<(), HeurError> + Send + Sync,
{
    fn build(&self, ctx: &mut TraceContext<'_>) -> Result<(), HeurError> {
        self(ctx)
    }
}

/// Pins a closure to the model signature so its argument lifetime is inferred.
///
/// ```
/// use u_heurmodel::model::{model_fn, TraceContext};
///
/// let model = model_fn(|ctx: &mut TraceContext<'_>| {
///     let x = ctx.continuous("x", (), (0.0, 10.0))?;
///     ctx.minimize(x.value().powi(2))
/// });
/// # let _ = model;
/// ```
pub fn model_fn<F>(f: F) -> F
where
    F: Fn(&mut TraceContext<'_>) -> Result<(), HeurError> + Send + Sync,
{
    f
}

/// Tracing mode of a [`TraceContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Discovery,
    Evaluate,
    FeasibilityCheck,
}

/// Read-only view of the chromosomes of a population block.
///
/// Row `i` occupies `data[i * stride + offset..][..genes]`.
#[derive(Debug, Clone, Copy)]
pub struct ChromosomeView<'a> {
    data: &'a [f64],
    rows: usize,
    stride: usize,
    offset: usize,
    genes: usize,
}

impl<'a> ChromosomeView<'a> {
    /// # Panics
    /// Panics if the last row does not fit in `data`.
    pub fn new(data: &'a [f64], rows: usize, stride: usize, offset: usize, genes: usize) -> Self {
        if rows > 0 {
            assert!(
                (rows - 1) * stride + offset + genes <= data.len(),
                "chromosome view exceeds data"
            );
        }
        Self {
            data,
            rows,
            stride,
            offset,
            genes,
        }
    }

    /// Rows packed back to back.
    pub fn contiguous(data: &'a [f64], genes: usize) -> Self {
        let rows = if genes == 0 { 0 } else { data.len() / genes };
        Self::new(data, rows, genes, 0, genes)
    }

    /// A single chromosome.
    pub fn single(chromosome: &'a [f64]) -> Self {
        Self::new(chromosome, 1, chromosome.len(), 0, chromosome.len())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn genes(&self) -> usize {
        self.genes
    }

    pub fn row(&self, i: usize) -> &'a [f64] {
        let start = i * self.stride + self.offset;
        &self.data[start..start + self.genes]
    }
}

/// Variable schema, constraint labels and objective directions of a model.
#[derive(Debug, Clone)]
pub struct Schema {
    registry: SchemaRegistry,
    constraints: Vec<String>,
    directions: Vec<Direction>,
}

impl Schema {
    /// Declared variables, in declaration order.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Chromosome length `N`.
    pub fn chromosome_len(&self) -> usize {
        self.registry.chromosome_len()
    }

    /// Constraint labels, in registration order.
    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    /// One direction per objective.
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn objectives(&self) -> usize {
        self.directions.len()
    }

    /// Maps a unit-interval chromosome to variable values.
    pub fn decode(&self, chromosome: &[f64]) -> Solution {
        self.registry.decode(chromosome)
    }
}

/// Output of an evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// One column per objective, each with one value per agent.
    pub objectives: Vec<Column>,
    /// Aggregated constraint violation per agent.
    pub penalty: Vec<f64>,
}

enum Stage<'a> {
    Discovery(SchemaRegistry),
    Traced {
        schema: &'a Schema,
        population: ChromosomeView<'a>,
        cursor: usize,
    },
}

/// Handle passed to a model's `build` function.
pub struct TraceContext<'a> {
    mode: Mode,
    stage: Stage<'a>,
    agents: usize,
    labels: Vec<String>,
    constraints: usize,
    directions: Vec<Direction>,
    objectives: Vec<Column>,
    penalty: Vec<f64>,
}

impl<'a> TraceContext<'a> {
    fn discovery() -> Self {
        Self {
            mode: Mode::Discovery,
            stage: Stage::Discovery(SchemaRegistry::new()),
            agents: 1,
            labels: Vec::new(),
            constraints: 0,
            directions: Vec::new(),
            objectives: Vec::new(),
            penalty: vec![0.0],
        }
    }

    fn traced(mode: Mode, schema: &'a Schema, population: ChromosomeView<'a>) -> Self {
        let agents = population.rows();
        Self {
            mode,
            stage: Stage::Traced {
                schema,
                population,
                cursor: 0,
            },
            agents,
            labels: Vec::new(),
            constraints: 0,
            directions: Vec::new(),
            objectives: Vec::with_capacity(schema.objectives()),
            penalty: vec![0.0; agents],
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of agents traced in this pass (1 during discovery).
    pub fn agents(&self) -> usize {
        self.agents
    }

    /// A column holding `value` for every agent.
    pub fn constant(&self, value: f64) -> Column {
        Column::constant(value, self.agents)
    }

    /// Declares a decision variable and returns its values.
    pub fn variable(
        &mut self,
        name: &str,
        kind: VarKind,
        shape: Shape,
        bound: Bound,
    ) -> Result<Var, HeurError> {
        match &mut self.stage {
            Stage::Discovery(registry) => {
                let handle = registry.declare(name, kind, shape, bound)?;
                let spec = registry.spec(handle);
                let values = spec.decode(&vec![0.0; spec.width()]);
                Ok(Var::new(handle, kind, spec.shape.clone(), 1, values))
            }
            Stage::Traced {
                schema,
                population,
                cursor,
            } => {
                let position = *cursor;
                let Some(spec) = schema.registry.get(VarHandle(position)) else {
                    return Err(SchemaError::Divergent {
                        position,
                        expected: "end of declarations".to_string(),
                        found: describe(name, kind, &shape, bound),
                    }
                    .into());
                };
                if !matches_spec(spec, name, kind, &shape, bound) {
                    return Err(SchemaError::Divergent {
                        position,
                        expected: describe(&spec.name, spec.kind, &spec.shape, spec.bound),
                        found: describe(name, kind, &shape, bound),
                    }
                    .into());
                }
                let spread = spec.spread();
                let mut values = Vec::with_capacity(population.rows() * spec.width());
                for row in 0..population.rows() {
                    spec.decode_into(&population.row(row)[spread.clone()], &mut values);
                }
                *cursor += 1;
                Ok(Var::new(
                    VarHandle(position),
                    kind,
                    spec.shape.clone(),
                    population.rows(),
                    values,
                ))
            }
        }
    }

    pub fn continuous(
        &mut self,
        name: &str,
        shape: impl Into<Shape>,
        bound: impl Into<Bound>,
    ) -> Result<Var, HeurError> {
        self.variable(name, VarKind::Continuous, shape.into(), bound.into())
    }

    pub fn positive(
        &mut self,
        name: &str,
        shape: impl Into<Shape>,
        bound: impl Into<Bound>,
    ) -> Result<Var, HeurError> {
        self.variable(name, VarKind::Positive, shape.into(), bound.into())
    }

    pub fn integer(
        &mut self,
        name: &str,
        shape: impl Into<Shape>,
        bound: impl Into<Bound>,
    ) -> Result<Var, HeurError> {
        self.variable(name, VarKind::Integer, shape.into(), bound.into())
    }

    pub fn binary(&mut self, name: &str, shape: impl Into<Shape>) -> Result<Var, HeurError> {
        self.variable(name, VarKind::Binary, shape.into(), Bound::unit())
    }

    /// Declares a permutation of `0..len`.
    pub fn sequence(&mut self, name: &str, len: usize) -> Result<Var, HeurError> {
        self.variable(name, VarKind::Sequence, Shape::vector(len), Bound::unit())
    }

    /// Registers a constraint. Unlabelled constraints are named `c0`, `c1`, ...
    pub fn constraint(&mut self, constraint: Constraint) -> Result<(), HeurError> {
        let index = self.constraints;
        self.constraints += 1;
        match self.mode {
            Mode::Discovery => {
                let label = constraint
                    .label()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("c{index}"));
                self.labels.push(label);
            }
            Mode::Evaluate | Mode::FeasibilityCheck => {
                let violation = constraint.violation();
                check_len(violation.len(), self.agents, || {
                    constraint
                        .label()
                        .map(|l| format!("constraint `{l}`"))
                        .unwrap_or_else(|| format!("constraint c{index}"))
                })?;
                for (row, p) in self.penalty.iter_mut().enumerate() {
                    let v = violation[if violation.len() == 1 { 0 } else { row }];
                    *p += if v.is_nan() { f64::INFINITY } else { v.max(0.0) };
                }
            }
        }
        Ok(())
    }

    /// Registers an objective column.
    pub fn objective(&mut self, direction: Direction, column: Column) -> Result<(), HeurError> {
        let index = self.directions.len();
        self.directions.push(direction);
        if self.mode == Mode::Evaluate {
            check_len(column.len(), self.agents, || format!("objective #{index}"))?;
            let column = if column.len() == self.agents {
                column
            } else {
                Column::constant(column[0], self.agents)
            };
            self.objectives.push(column);
        }
        Ok(())
    }

    pub fn minimize(&mut self, column: Column) -> Result<(), HeurError> {
        self.objective(Direction::Minimize, column)
    }

    pub fn maximize(&mut self, column: Column) -> Result<(), HeurError> {
        self.objective(Direction::Maximize, column)
    }

    fn into_schema(self) -> Result<Schema, HeurError> {
        let Stage::Discovery(registry) = self.stage else {
            unreachable!("into_schema called on a traced pass");
        };
        if registry.chromosome_len() == 0 {
            return Err(SchemaError::EmptySchema.into());
        }
        if self.directions.is_empty() {
            return Err(SchemaError::NoObjective.into());
        }
        Ok(Schema {
            registry,
            constraints: self.labels,
            directions: self.directions,
        })
    }

    fn into_evaluation(self) -> Result<Evaluation, HeurError> {
        let Stage::Traced { schema, cursor, .. } = self.stage else {
            unreachable!("into_evaluation called on a discovery pass");
        };
        if let Some(spec) = schema.registry.get(VarHandle(cursor)) {
            return Err(SchemaError::Divergent {
                position: cursor,
                expected: describe(&spec.name, spec.kind, &spec.shape, spec.bound),
                found: "end of declarations".to_string(),
            }
            .into());
        }
        if self.directions.len() != schema.objectives() {
            return Err(SchemaError::ObjectiveCount {
                expected: schema.objectives(),
                found: self.directions.len(),
            }
            .into());
        }
        if self.constraints != schema.constraints.len() {
            return Err(SchemaError::ConstraintCount {
                expected: schema.constraints.len(),
                found: self.constraints,
            }
            .into());
        }
        Ok(Evaluation {
            objectives: self.objectives,
            penalty: self.penalty,
        })
    }
}

fn matches_spec(spec: &VariableSpec, name: &str, kind: VarKind, shape: &Shape, bound: Bound) -> bool {
    let bound_ok = match kind {
        VarKind::Binary | VarKind::Sequence => true,
        _ => spec.bound == bound,
    };
    spec.name == name && spec.kind == kind && &spec.shape == shape && bound_ok
}

fn describe(name: &str, kind: VarKind, shape: &Shape, bound: Bound) -> String {
    format!(
        "`{name}` {kind} {:?} [{}, {}]",
        shape.dims(),
        bound.lo,
        bound.hi
    )
}

fn check_len(len: usize, agents: usize, what: impl FnOnce() -> String) -> Result<(), HeurError> {
    if len == agents || len == 1 {
        Ok(())
    } else {
        Err(HeurError::model(format!(
            "{} has {len} values for {agents} agents",
            what()
        )))
    }
}

/// A model together with its discovered schema.
///
/// [`discover`](Self::discover) is the only constructor, so every evaluation
/// runs against a schema established beforehand.
pub struct ModelTracer<'m> {
    model: &'m dyn HeurModel,
    schema: Schema,
}

impl<'m> ModelTracer<'m> {
    /// Runs the discovery pass.
    pub fn discover(model: &'m dyn HeurModel) -> Result<Self, HeurError> {
        let mut ctx = TraceContext::discovery();
        model.build(&mut ctx)?;
        let schema = ctx.into_schema()?;
        debug!(
            variables = schema.registry.len(),
            genes = schema.chromosome_len(),
            constraints = schema.constraints.len(),
            objectives = schema.objectives(),
            "model discovered"
        );
        Ok(Self { model, schema })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Evaluates every row of `population`.
    pub fn evaluate(&self, population: ChromosomeView<'_>) -> Result<Evaluation, HeurError> {
        let mut ctx = TraceContext::traced(Mode::Evaluate, &self.schema, population);
        self.model.build(&mut ctx)?;
        ctx.into_evaluation()
    }

    /// Classifies every row of `population` without collecting objectives.
    pub fn check_feasibility(
        &self,
        population: ChromosomeView<'_>,
    ) -> Result<Vec<Feasibility>, HeurError> {
        let mut ctx = TraceContext::traced(Mode::FeasibilityCheck, &self.schema, population);
        self.model.build(&mut ctx)?;
        let constraints = self.schema.constraints.len();
        let evaluation = ctx.into_evaluation()?;
        Ok(evaluation
            .penalty
            .into_iter()
            .map(|p| Feasibility::classify(constraints, p))
            .collect())
    }
}

impl std::fmt::Debug for ModelTracer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelTracer")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
