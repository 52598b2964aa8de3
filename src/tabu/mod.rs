//! Tabu search.
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search, Part I", *ORSA Journal on Computing* 1(3), 190-206.

mod config;
mod strategy;

pub use config::TabuConfig;
pub use strategy::TabuStrategy;
