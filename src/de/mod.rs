//! Differential evolution.
//!
//! # Reference
//!
//! Storn & Price (1997), "Differential Evolution – A Simple and Efficient
//! Heuristic for Global Optimization over Continuous Spaces",
//! *Journal of Global Optimization* 11, 341-359.

mod config;
mod strategy;

pub use config::DeConfig;
pub use strategy::DeStrategy;
