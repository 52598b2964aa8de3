//! Tabu search configuration.

use crate::error::ConfigError;
use crate::options::OptionReader;

/// Configuration parameters for tabu search.
///
/// Option keys: `tabu_tenure` (default `7`), `strict` (default `0`) and
/// `resolution` (default `100`).
///
/// ```
/// use u_heurmodel::tabu::TabuConfig;
///
/// let config = TabuConfig::default().with_tabu_tenure(12).with_strict(true);
/// assert_eq!(config.tabu_tenure, 12);
/// assert!(config.strict);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuConfig {
    /// Number of states the FIFO memory holds.
    pub tabu_tenure: usize,

    /// Consult the memory on every iteration.
    ///
    /// When `false`, the memory is only written at iteration 0 and the
    /// search behaves as a random-walk hill climber.
    pub strict: bool,

    /// Genes are quantized to `round(gene · resolution)` before they are
    /// compared against the memory.
    pub resolution: f64,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            tabu_tenure: 7,
            strict: false,
            resolution: 100.0,
        }
    }
}

impl TabuConfig {
    /// Sets the tabu tenure (number of states kept in memory).
    pub fn with_tabu_tenure(mut self, tenure: usize) -> Self {
        self.tabu_tenure = tenure;
        self
    }

    /// Enables or disables the memory check after iteration 0.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the quantization applied to genes before memory lookups.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Rejects a zero tenure and a non-positive resolution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tabu_tenure == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "tabu_tenure",
                reason: "must be at least 1".into(),
            });
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "resolution",
                reason: format!("must be positive, got {}", self.resolution),
            });
        }
        Ok(())
    }

    pub(crate) fn from_options(reader: &mut OptionReader<'_>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(tenure) = reader.count("tabu_tenure")? {
            config.tabu_tenure = tenure;
        }
        if let Some(strict) = reader.flag("strict")? {
            config.strict = strict;
        }
        if let Some(resolution) = reader.real("resolution")? {
            config.resolution = resolution;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TabuConfig::default();
        assert_eq!(config.tabu_tenure, 7);
        assert!(!config.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid() {
        assert!(TabuConfig::default().with_tabu_tenure(0).validate().is_err());
        assert!(TabuConfig::default().with_resolution(0.0).validate().is_err());
    }
}
