//! SA configuration and cooling schedules.

use crate::error::ConfigError;
use crate::options::OptionReader;

/// Temperature as a function of the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// `T(it) = ((S - it) / S) · max_temperature`: reaches zero at the end of
    /// the budget `S`.
    #[default]
    Linear,

    /// `T(it) = max_temperature · alpha^it`.
    Geometric {
        /// Cooling factor in `(0, 1)`.
        alpha: f64,
    },
}

impl CoolingSchedule {
    /// Temperature at `iteration` of a budget of `budget` iterations.
    pub fn temperature(&self, max_temperature: f64, iteration: usize, budget: usize) -> f64 {
        match *self {
            CoolingSchedule::Linear => {
                if budget == 0 {
                    return 0.0;
                }
                let remaining = budget.saturating_sub(iteration) as f64;
                remaining / budget as f64 * max_temperature
            }
            CoolingSchedule::Geometric { alpha } => {
                max_temperature * alpha.powi(iteration.min(i32::MAX as usize) as i32)
            }
        }
    }
}

/// Configuration for simulated annealing.
///
/// Option keys: `max_temperature` (default `100`), `cooling_cycles`
/// (inner evaluations per iteration, default `1`) and `cooling_alpha`
/// (switches to geometric cooling).
///
/// ```
/// use u_heurmodel::sa::{CoolingSchedule, SaConfig};
///
/// let config = SaConfig::default()
///     .with_max_temperature(10.0)
///     .with_cooling_cycles(5)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.98 });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaConfig {
    /// Temperature at iteration 0. Zero turns SA into a strict hill climber.
    pub max_temperature: f64,

    /// Number of evaluations per iteration.
    pub cooling_cycles: usize,

    pub cooling: CoolingSchedule,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            max_temperature: 100.0,
            cooling_cycles: 1,
            cooling: CoolingSchedule::default(),
        }
    }
}

impl SaConfig {
    /// Sets the starting temperature.
    pub fn with_max_temperature(mut self, t: f64) -> Self {
        self.max_temperature = t;
        self
    }

    /// Sets the number of inner evaluations per iteration.
    pub fn with_cooling_cycles(mut self, n: usize) -> Self {
        self.cooling_cycles = n;
        self
    }

    /// Sets the cooling schedule.
    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_temperature.is_finite() || self.max_temperature < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_temperature",
                reason: format!("must be finite and non-negative, got {}", self.max_temperature),
            });
        }
        if self.cooling_cycles == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "cooling_cycles",
                reason: "must be at least 1".into(),
            });
        }
        if let CoolingSchedule::Geometric { alpha } = self.cooling {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err(ConfigError::InvalidParameter {
                    name: "cooling_alpha",
                    reason: format!("must be in (0, 1), got {alpha}"),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn from_options(reader: &mut OptionReader<'_>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(t) = reader.real("max_temperature")? {
            config.max_temperature = t;
        }
        if let Some(n) = reader.count("cooling_cycles")? {
            config.cooling_cycles = n;
        }
        if let Some(alpha) = reader.real("cooling_alpha")? {
            config.cooling = CoolingSchedule::Geometric { alpha };
        }
        Ok(config)
    }
}
