//! Search outcomes.

use std::fmt;

use crate::fitness::Feasibility;
use crate::model::Solution;
use crate::strategy::StrategyReport;

/// A reported agent: decoded values, fitness and re-checked status.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub solution: Solution,
    /// Penalized fitness, one entry per objective.
    pub reward: Vec<f64>,
    pub status: Feasibility,
}

/// Non-fatal conditions attached to a result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Warning {
    /// The reported solution violates at least one constraint, or no
    /// feasible agent was found for a multi-objective model.
    InfeasibleResult,
    /// A repeat aborted with an evaluation error; other repeats continued.
    RepeatFailed { repeat: usize, message: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InfeasibleResult => f.write_str("no feasible solution was found"),
            Warning::RepeatFailed { repeat, message } => {
                write!(f, "repeat {repeat} failed: {message}")
            }
        }
    }
}

/// Fitness statistics of one iteration.
///
/// Two-phase strategies (DE, SA, TS) report their incumbent block after
/// acceptance. Single-phase strategies (GA, GWO) report the population as it
/// was evaluated, before survivor selection reorders it. Computed over the
/// first objective, ignoring non-finite entries.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterationStats {
    pub iteration: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

impl IterationStats {
    pub fn from_column(iteration: usize, column: &[f64]) -> Self {
        let finite: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self {
                iteration,
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                std: f64::NAN,
            };
        }
        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            iteration,
            min: finite.iter().copied().fold(f64::INFINITY, f64::min),
            max: finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Outcome of [`SearchRunner::run`](super::SearchRunner::run).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    pub algorithm: String,
    /// The best agent for one objective; the Pareto set for several.
    pub candidates: Vec<Candidate>,
    pub multi_objective: bool,
    pub warnings: Vec<Warning>,
    /// Per-repeat convergence history; empty unless requested.
    pub history: Vec<Vec<IterationStats>>,
    /// Agent evaluations over all successful repeats.
    pub evaluations: usize,
    pub report: StrategyReport,
}

impl SearchResult {
    /// The single best candidate, or the first Pareto member.
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn status(&self) -> Option<Feasibility> {
        self.best().map(|c| c.status)
    }

    pub fn is_feasible(&self) -> bool {
        self.status().is_some_and(Feasibility::is_feasible)
    }
}
