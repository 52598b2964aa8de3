//! Error types for the heuristic modeling engine.
//!
//! Configuration and schema errors are raised before any iteration runs.
//! Evaluation errors carry the repeat and iteration where the model failed.
//! Infeasible results are not errors; see [`crate::search::Warning`].

use thiserror::Error;

/// Errors in the variable schema or in the consistency of the two tracing passes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// A variable name was declared twice during discovery.
    #[error("variable `{0}` is already declared")]
    DuplicateName(String),

    /// An evaluation pass declared variables in a different order, kind,
    /// shape or bound than the discovery pass.
    #[error("declaration #{position} diverged from discovery: expected {expected}, found {found}")]
    Divergent {
        position: usize,
        expected: String,
        found: String,
    },

    /// An evaluation pass registered a different number of objectives.
    #[error("objective count diverged from discovery: expected {expected}, found {found}")]
    ObjectiveCount { expected: usize, found: usize },

    /// An evaluation pass registered a different number of constraints.
    #[error("constraint count diverged from discovery: expected {expected}, found {found}")]
    ConstraintCount { expected: usize, found: usize },

    /// The model registered no objective.
    #[error("model registers no objective")]
    NoObjective,

    /// The model declared no decision variable.
    #[error("model declares no decision variable")]
    EmptySchema,
}

/// Invalid configuration of the model or the search.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Constraints are registered but the penalty coefficient is zero.
    #[error("{constraints} constraint(s) registered with a zero penalty coefficient")]
    UnpenalizedConstraint { constraints: usize },

    /// A variable bound is not finite, inverted, or invalid for its kind.
    #[error("invalid bound [{lo}, {hi}] for variable `{name}`: {reason}")]
    InvalidBound {
        name: String,
        lo: f64,
        hi: f64,
        reason: &'static str,
    },

    /// The variable kind does not support the requested shape.
    #[error("variable `{name}` of kind {kind} does not support shape {shape:?}")]
    UnsupportedDimension {
        name: String,
        kind: &'static str,
        shape: Vec<usize>,
    },

    /// A numeric parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The option dictionary contains a key nothing consumes.
    #[error("unknown option `{key}` for {scope}")]
    UnknownOption { key: String, scope: &'static str },

    /// The algorithm name is not recognised.
    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),

    /// The algorithm only handles a single objective.
    #[error("{algorithm} does not support {objectives} objectives")]
    UnsupportedMultiObjective {
        algorithm: &'static str,
        objectives: usize,
    },

    /// The population is too small for the algorithm's variation rule.
    #[error("{algorithm} needs at least {required} agents, got {actual}")]
    PopulationTooSmall {
        algorithm: &'static str,
        required: usize,
        actual: usize,
    },
}

/// Top-level error of the engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HeurError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The model failed while evaluating a population.
    #[error("evaluation failed in repeat {repeat} at iteration {iteration}: {source}")]
    Evaluation {
        repeat: usize,
        iteration: usize,
        #[source]
        source: Box<HeurError>,
    },

    /// Error raised by user code inside the model function.
    #[error("model error: {0}")]
    Model(String),
}

impl HeurError {
    /// Creates a user-level model error.
    pub fn model(message: impl Into<String>) -> Self {
        HeurError::Model(message.into())
    }

    /// Wraps an error raised during an evaluation pass.
    pub(crate) fn evaluation(repeat: usize, iteration: usize, source: HeurError) -> Self {
        HeurError::Evaluation {
            repeat,
            iteration,
            source: Box::new(source),
        }
    }

    /// Iteration at which an evaluation error occurred, if any.
    pub fn iteration(&self) -> Option<usize> {
        match self {
            HeurError::Evaluation { iteration, .. } => Some(*iteration),
            _ => None,
        }
    }
}
