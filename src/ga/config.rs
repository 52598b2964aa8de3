//! GA configuration.

use super::selection::Selection;
use crate::error::ConfigError;
use crate::options::OptionReader;

/// Configuration for the genetic algorithm.
///
/// # Option keys
///
/// | key               | meaning                               | default |
/// |-------------------|---------------------------------------|---------|
/// | `selection`       | `0` random survivors, `1` tournament  | `0`     |
/// | `crossover_rate`  | probability of mating with another    | `0.7`   |
/// | `mutation_rate`   | per-gene redraw probability           | `0.1`   |
/// | `survival_lb`     | lower bound of the survival fraction  | `0.2`   |
/// | `survival_ub`     | upper bound of the survival fraction  | `0.8`   |
///
/// ```
/// use u_heurmodel::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_selection(Selection::Tournament)
///     .with_mutation_rate(0.05);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    pub selection: Selection,

    /// Probability that an agent mates with a random other agent instead of itself.
    pub crossover_rate: f64,

    /// Probability that a gene is redrawn uniformly after crossover.
    pub mutation_rate: f64,

    /// The survival fraction of each generation is drawn from
    /// `U(survival_lb, survival_ub)`.
    pub survival_lb: f64,
    pub survival_ub: f64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            crossover_rate: 0.7,
            mutation_rate: 0.1,
            survival_lb: 0.2,
            survival_ub: 0.8,
        }
    }
}

impl GaConfig {
    /// Sets the survivor selection scheme.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the mating probability, clamped to `[0, 1]`.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-gene redraw probability, clamped to `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the survival fraction range; both ends are clamped to `[0, 1]`.
    pub fn with_survival(mut self, lb: f64, ub: f64) -> Self {
        self.survival_lb = lb.clamp(0.0, 1.0);
        self.survival_ub = ub.clamp(0.0, 1.0);
        self
    }

    /// Checks that both rates are probabilities and that
    /// `survival_lb <= survival_ub`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be in [0, 1], got {rate}"),
                });
            }
        }
        if !(self.survival_lb > 0.0 && self.survival_lb <= self.survival_ub && self.survival_ub <= 1.0)
        {
            return Err(ConfigError::InvalidParameter {
                name: "survival_lb",
                reason: format!(
                    "need 0 < survival_lb <= survival_ub <= 1, got [{}, {}]",
                    self.survival_lb, self.survival_ub
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn from_options(reader: &mut OptionReader<'_>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(code) = reader.count("selection")? {
            config.selection = Selection::from_code(code)?;
        }
        if let Some(rate) = reader.real("crossover_rate")? {
            config.crossover_rate = rate;
        }
        if let Some(rate) = reader.real("mutation_rate")? {
            config.mutation_rate = rate;
        }
        if let Some(lb) = reader.real("survival_lb")? {
            config.survival_lb = lb;
        }
        if let Some(ub) = reader.real("survival_ub")? {
            config.survival_ub = ub;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.selection, Selection::Random);
        assert!((config.crossover_rate - 0.7).abs() < 1e-12);
        assert!((config.mutation_rate - 0.1).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clamp_rates() {
        let config = GaConfig::default()
            .with_crossover_rate(-0.5)
            .with_mutation_rate(2.0)
            .with_survival(-1.0, 3.0);
        assert_eq!(config.crossover_rate, 0.0);
        assert_eq!(config.mutation_rate, 1.0);
        assert_eq!(config.survival_ub, 1.0);
        // survival_lb clamps to 0, which is not a usable fraction
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_inverted_survival() {
        let config = GaConfig::default().with_survival(0.9, 0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_options() {
        let opts: Options = [("selection", 1.0), ("mutation_rate", 0.3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let mut reader = OptionReader::new(&opts);
        let config = GaConfig::from_options(&mut reader).unwrap();
        assert_eq!(config.selection, Selection::Tournament);
        assert_eq!(config.mutation_rate, 0.3);
        assert!(reader.finish("ga").is_ok());
    }
}
