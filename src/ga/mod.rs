//! Genetic algorithm.
//!
//! Truncation or tournament survivor selection, blend crossover and uniform
//! gene redraw, operating directly on the unit-interval chromosome matrix.
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Eshelman & Schaffer (1993), "Real-Coded Genetic Algorithms and
//!   Interval-Schemata" (blend crossover)

mod config;
mod selection;
mod strategy;

pub use config::GaConfig;
pub use selection::Selection;
pub use strategy::GaStrategy;
