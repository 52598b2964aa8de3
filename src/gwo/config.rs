//! GWO configuration.

use crate::error::ConfigError;
use crate::options::OptionReader;

/// Configuration for the grey wolf optimizer.
///
/// The control parameter decays linearly from `a_max` at iteration 0 to zero
/// at the end of the budget. Option key: `a_max` (default `2`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GwoConfig {
    /// Initial value of the control parameter `a`.
    pub a_max: f64,
}

impl Default for GwoConfig {
    fn default() -> Self {
        Self { a_max: 2.0 }
    }
}

impl GwoConfig {
    /// Sets the initial control parameter.
    pub fn with_a_max(mut self, a_max: f64) -> Self {
        self.a_max = a_max;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.a_max.is_finite() && self.a_max >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "a_max",
                reason: format!("must be finite and non-negative, got {}", self.a_max),
            });
        }
        Ok(())
    }

    pub(crate) fn from_options(reader: &mut OptionReader<'_>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(a_max) = reader.real("a_max")? {
            config.a_max = a_max;
        }
        Ok(config)
    }
}
