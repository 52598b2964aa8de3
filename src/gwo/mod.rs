//! Grey wolf optimizer.
//!
//! # Reference
//!
//! Mirjalili, Mirjalili & Lewis (2014), "Grey Wolf Optimizer",
//! *Advances in Engineering Software* 69, 46-61.

mod config;
mod strategy;

pub use config::GwoConfig;
pub use strategy::GwoStrategy;
