//! Simulated annealing.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), acceptance criterion

mod config;
mod strategy;

pub use config::{CoolingSchedule, SaConfig};
pub use strategy::SaStrategy;
