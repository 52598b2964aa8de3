//! Search orchestration.
//!
//! [`SearchRunner::run`] discovers the model once, builds the fitness
//! evaluator (configuration errors surface here, before any iteration), then
//! drives `repeats` independent runs of the configured [`Algorithm`] and
//! merges their best records.

mod config;
mod result;
mod runner;

pub use config::{Algorithm, SearchConfig};
pub use result::{Candidate, IterationStats, SearchResult, Warning};
pub use runner::SearchRunner;
