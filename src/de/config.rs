//! DE configuration.

use crate::error::ConfigError;
use crate::options::OptionReader;

/// Configuration for differential evolution (`DE/rand/1/bin`).
///
/// Option keys: `scale_factor` (`F`, default `0.5`) and `crossover_rate`
/// (`CR`, default `0.7`).
///
/// # Examples
///
/// ```
/// use u_heurmodel::de::DeConfig;
///
/// let config = DeConfig::default().with_scale_factor(0.8).with_crossover_rate(0.9);
/// assert_eq!(config.scale_factor, 0.8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeConfig {
    /// Differential weight `F` applied to `x_r1 - x_r2`.
    pub scale_factor: f64,
    /// Probability that a gene is taken from the donor.
    pub crossover_rate: f64,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            scale_factor: 0.5,
            crossover_rate: 0.7,
        }
    }
}

impl DeConfig {
    /// Sets the differential weight `F`, clamped to `[0, 2]`.
    pub fn with_scale_factor(mut self, f: f64) -> Self {
        self.scale_factor = f.clamp(0.0, 2.0);
        self
    }

    /// Sets the binomial crossover rate `CR`, clamped to `[0, 1]`.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.scale_factor) {
            return Err(ConfigError::InvalidParameter {
                name: "scale_factor",
                reason: format!("must be in [0, 2], got {}", self.scale_factor),
            });
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(ConfigError::InvalidParameter {
                name: "crossover_rate",
                reason: format!("must be in [0, 1], got {}", self.crossover_rate),
            });
        }
        Ok(())
    }

    pub(crate) fn from_options(reader: &mut OptionReader<'_>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(f) = reader.real("scale_factor")? {
            config.scale_factor = f;
        }
        if let Some(rate) = reader.real("crossover_rate")? {
            config.crossover_rate = rate;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = DeConfig::default();
        assert_eq!(config.scale_factor, 0.5);
        assert_eq!(config.crossover_rate, 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let config = DeConfig {
            scale_factor: 3.0,
            ..DeConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(DeConfig::default().with_crossover_rate(4.0).crossover_rate, 1.0);
    }
}
