//! Trace-once, evaluate-many heuristic modeling engine.
//!
//! A model is written once as a function of a [`TraceContext`]: it declares
//! decision variables, registers constraints and objectives. The engine
//! traces it once to discover the variable schema, then once per iteration
//! to evaluate a whole population at the same time, and drives that schema
//! through a population-search algorithm:
//!
//! - **Genetic Algorithm (GA)**: survivor selection, blend crossover and
//!   uniform gene redraw.
//! - **Differential Evolution (DE)**: `rand/1/bin` with greedy replacement.
//! - **Simulated Annealing (SA)**: single-agent chain with Metropolis
//!   acceptance.
//! - **Tabu Search (TS)**: single-agent chain with an optional FIFO memory.
//! - **Grey Wolf Optimizer (GWO)**: leader-following pack update.
//!
//! Several objectives are handled through non-dominated ranking and a
//! [`ParetoSet`](pareto::ParetoSet) archive.
//!
//! # Example
//!
//! ```
//! use u_heurmodel::model::TraceContext;
//! use u_heurmodel::search::{SearchConfig, SearchRunner};
//! use u_heurmodel::HeurError;
//!
//! fn knapsack(ctx: &mut TraceContext<'_>) -> Result<(), HeurError> {
//!     let take = ctx.binary("take", 4usize)?;
//!     let weights = [3.0, 4.0, 5.0, 6.0];
//!     let values = [4.0, 5.0, 6.0, 8.0];
//!     let weight: u_heurmodel::model::Column =
//!         take.elements().zip(weights).map(|(t, w)| t * w).sum();
//!     let value = take.elements().zip(values).map(|(t, v)| t * v).sum();
//!     ctx.constraint(weight.le(10.0).named("capacity"))?;
//!     ctx.maximize(value)
//! }
//!
//! let config = SearchConfig::default()
//!     .with_penalty_coefficient(100.0)
//!     .with_seed(7);
//! let result = SearchRunner::run(&knapsack, &config).unwrap();
//! assert!(result.is_feasible());
//! ```
//!
//! # Architecture
//!
//! ```text
//! model::{variables, codec}  chromosome <-> typed values
//! model::tracer              discovery / evaluation passes
//! population, fitness        population matrix, penalized fitness
//! strategy + ga/de/sa/tabu/gwo
//! search                     repeats, best record, result
//! ```

pub mod de;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod gwo;
pub mod model;
pub mod options;
pub mod pareto;
pub mod population;
pub mod random;
pub mod sa;
pub mod search;
pub mod strategy;
pub mod tabu;

pub use error::{ConfigError, HeurError, SchemaError};
pub use fitness::{Direction, Feasibility};
pub use model::{model_fn, HeurModel, Solution, TraceContext};
pub use search::{Algorithm, SearchConfig, SearchResult, SearchRunner};
