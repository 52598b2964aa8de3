//! Penalized, direction-aware fitness.
//!
//! Raw objective values and the aggregated constraint penalty `p` of an
//! agent are folded into one fitness per objective:
//!
//! ```text
//! fitness = objective - sign(direction) * penalty_coefficient * p²
//! ```
//!
//! with `sign(max) = +1` and `sign(min) = -1`, so the penalty always moves
//! an infeasible agent towards "worse".

use std::cmp::Ordering;
use std::fmt;

use crate::error::ConfigError;
use crate::model::Evaluation;
use crate::population::{Population, Region};

/// Optimization direction of one objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    /// `+1` for maximize, `-1` for minimize.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Minimize => -1.0,
            Direction::Maximize => 1.0,
        }
    }

    /// Sentinel that compares worse than any finite reward.
    pub fn worst(self) -> f64 {
        match self {
            Direction::Minimize => f64::INFINITY,
            Direction::Maximize => f64::NEG_INFINITY,
        }
    }

    /// Whether `a` is strictly better than `b`.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Direction::Minimize => a < b,
            Direction::Maximize => a > b,
        }
    }

    /// Orders `a` before `b` when `a` is better. NaN sorts last.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        let ord = match (a.is_nan(), b.is_nan()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        };
        match self {
            Direction::Minimize => ord,
            Direction::Maximize => ord.reverse(),
        }
    }

    /// Maps a reward onto a minimization scale.
    pub fn to_min(self, value: f64) -> f64 {
        -self.sign() * value
    }
}

/// Feasibility status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feasibility {
    /// The model has no constraints.
    Unconstrained,
    /// Every constraint is satisfied.
    Feasible,
    /// At least one constraint is violated.
    Infeasible,
}

impl Feasibility {
    /// Classifies an aggregated penalty.
    pub fn classify(constraints: usize, penalty: f64) -> Self {
        if constraints == 0 {
            Feasibility::Unconstrained
        } else if penalty == 0.0 {
            Feasibility::Feasible
        } else {
            Feasibility::Infeasible
        }
    }

    pub fn is_feasible(self) -> bool {
        !matches!(self, Feasibility::Infeasible)
    }

    /// Numeric code stored in the population's status column.
    pub(crate) fn code(self) -> f64 {
        match self {
            Feasibility::Unconstrained => 0.0,
            Feasibility::Feasible => 1.0,
            Feasibility::Infeasible => -1.0,
        }
    }

    pub(crate) fn from_code(code: f64) -> Self {
        if code == 0.0 {
            Feasibility::Unconstrained
        } else if code > 0.0 {
            Feasibility::Feasible
        } else {
            Feasibility::Infeasible
        }
    }
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Feasibility::Unconstrained => "feasible (unconstrained)",
            Feasibility::Feasible => "feasible (constrained)",
            Feasibility::Infeasible => "infeasible",
        })
    }
}

/// Turns traced objective and penalty values into fitness and status.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    penalty_coefficient: f64,
    directions: Vec<Direction>,
    constraints: usize,
}

impl FitnessEvaluator {
    /// Creates an evaluator for a model's objectives and constraint count.
    ///
    /// Fails with [`ConfigError::UnpenalizedConstraint`] when constraints
    /// exist and `penalty_coefficient` is zero: the evaluator refuses to
    /// ignore them silently.
    pub fn new(
        penalty_coefficient: f64,
        directions: Vec<Direction>,
        constraints: usize,
    ) -> Result<Self, ConfigError> {
        if !penalty_coefficient.is_finite() || penalty_coefficient < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "penalty_coefficient",
                reason: format!("must be finite and non-negative, got {penalty_coefficient}"),
            });
        }
        if constraints > 0 && penalty_coefficient == 0.0 {
            return Err(ConfigError::UnpenalizedConstraint { constraints });
        }
        Ok(Self {
            penalty_coefficient,
            directions,
            constraints,
        })
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn objectives(&self) -> usize {
        self.directions.len()
    }

    pub fn constraints(&self) -> usize {
        self.constraints
    }

    pub fn penalty_coefficient(&self) -> f64 {
        self.penalty_coefficient
    }

    /// Penalized fitness of one objective value. NaN maps to the worst sentinel.
    pub fn fitness(&self, objective: f64, penalty: f64, direction: Direction) -> f64 {
        let value = objective - direction.sign() * self.penalty_coefficient * penalty * penalty;
        if value.is_nan() {
            direction.worst()
        } else {
            value
        }
    }

    pub fn classify(&self, penalty: f64) -> Feasibility {
        Feasibility::classify(self.constraints, penalty)
    }

    /// Writes fitness and status of every traced agent into `region`.
    pub fn assign(&self, evaluation: &Evaluation, population: &mut Population, region: Region) {
        for row in 0..population.rows() {
            let penalty = evaluation.penalty[row];
            population.set_status(row, region, self.classify(penalty));
            let reward = population.reward_mut(row, region);
            for (k, (slot, &direction)) in reward.iter_mut().zip(&self.directions).enumerate() {
                let objective = evaluation.objectives[k][row];
                *slot = self.fitness(objective, penalty, direction);
            }
        }
    }
}
