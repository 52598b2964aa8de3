//! Search configuration and algorithm selection.

use crate::de::{DeConfig, DeStrategy};
use crate::error::ConfigError;
use crate::ga::{GaConfig, GaStrategy};
use crate::gwo::{GwoConfig, GwoStrategy};
use crate::options::{OptionReader, Options};
use crate::sa::{SaConfig, SaStrategy};
use crate::strategy::Strategy;
use crate::tabu::{TabuConfig, TabuStrategy};

/// Algorithm together with its own parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    Ga(GaConfig),
    De(DeConfig),
    Sa(SaConfig),
    Tabu(TabuConfig),
    Gwo(GwoConfig),
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Ga(GaConfig::default())
    }
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Ga(_) => "ga",
            Algorithm::De(_) => "de",
            Algorithm::Sa(_) => "sa",
            Algorithm::Tabu(_) => "tabu",
            Algorithm::Gwo(_) => "gwo",
        }
    }

    /// Parses `name` (case-insensitive) and reads the algorithm's keys.
    fn parse(name: &str, reader: &mut OptionReader<'_>) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "ga" => GaConfig::from_options(reader).map(Algorithm::Ga),
            "de" => DeConfig::from_options(reader).map(Algorithm::De),
            "sa" => SaConfig::from_options(reader).map(Algorithm::Sa),
            "ts" | "tabu" => TabuConfig::from_options(reader).map(Algorithm::Tabu),
            "gwo" => GwoConfig::from_options(reader).map(Algorithm::Gwo),
            _ => Err(ConfigError::UnknownAlgorithm(name.to_string())),
        }
    }

    /// Fresh strategy state for one repeat.
    pub fn strategy(&self) -> Box<dyn Strategy> {
        match self {
            Algorithm::Ga(c) => Box::new(GaStrategy::new(c.clone())),
            Algorithm::De(c) => Box::new(DeStrategy::new(c.clone())),
            Algorithm::Sa(c) => Box::new(SaStrategy::new(c.clone())),
            Algorithm::Tabu(c) => Box::new(TabuStrategy::new(c.clone())),
            Algorithm::Gwo(c) => Box::new(GwoStrategy::new(c.clone())),
        }
    }
}

/// Configuration of a [`SearchRunner`](super::SearchRunner) run.
///
/// # Option keys
///
/// | key                   | meaning                                  | default |
/// |-----------------------|------------------------------------------|---------|
/// | `population_size`     | agents `T` (forced to 1 for SA and TS)   | `50`    |
/// | `iterations`          | iteration budget `S`                     | `100`   |
/// | `penalty_coefficient` | weight of the squared constraint penalty | `0`     |
/// | `repeats`             | independent runs                         | `1`     |
/// | `seed`                | master seed                              | random  |
/// | `record_history`      | collect per-iteration statistics         | `0`     |
/// | `parallel`            | run repeats on the rayon pool            | `1`     |
/// | `pareto_capacity`     | maximum Pareto archive size              | none    |
///
/// ```
/// use u_heurmodel::search::SearchConfig;
/// use u_heurmodel::options::Options;
///
/// let mut options = Options::new();
/// options.insert("iterations".into(), 200.0);
/// options.insert("crossover_rate".into(), 0.9);
/// let config = SearchConfig::from_options("GA", &options).unwrap();
/// assert_eq!(config.iterations, 200);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    pub population_size: usize,
    pub iterations: usize,
    pub penalty_coefficient: f64,
    pub repeats: usize,
    /// Master seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Only honoured with the `parallel` feature.
    pub parallel: bool,
    pub record_history: bool,
    pub pareto_capacity: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            population_size: 50,
            iterations: 100,
            penalty_coefficient: 0.0,
            repeats: 1,
            seed: None,
            parallel: true,
            record_history: false,
            pareto_capacity: None,
        }
    }
}

impl SearchConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_penalty_coefficient(mut self, coefficient: f64) -> Self {
        self.penalty_coefficient = coefficient;
        self
    }

    pub fn with_repeats(mut self, n: usize) -> Self {
        self.repeats = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn with_pareto_capacity(mut self, capacity: usize) -> Self {
        self.pareto_capacity = Some(capacity);
        self
    }

    /// Builds a configuration from an algorithm name and an option dictionary.
    pub fn from_options(name: &str, options: &Options) -> Result<Self, ConfigError> {
        let mut reader = OptionReader::new(options);
        let algorithm = Algorithm::parse(name, &mut reader)?;
        let mut config = Self::new(algorithm);
        if let Some(n) = reader.count("population_size")? {
            config.population_size = n;
        }
        if let Some(n) = reader.count("iterations")? {
            config.iterations = n;
        }
        if let Some(c) = reader.real("penalty_coefficient")? {
            config.penalty_coefficient = c;
        }
        if let Some(n) = reader.count("repeats")? {
            config.repeats = n;
        }
        config.seed = reader.seed("seed")?;
        if let Some(parallel) = reader.flag("parallel")? {
            config.parallel = parallel;
        }
        if let Some(record) = reader.flag("record_history")? {
            config.record_history = record;
        }
        config.pareto_capacity = reader.count("pareto_capacity")?;
        reader.finish(config.algorithm.name())?;
        Ok(config)
    }

    /// Checks the search-level parameters. Algorithm parameters are checked
    /// by the strategy once the model is known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &'static str, value: usize| {
            if value == 0 {
                Err(ConfigError::InvalidParameter {
                    name,
                    reason: "must be at least 1".into(),
                })
            } else {
                Ok(())
            }
        };
        positive("population_size", self.population_size)?;
        positive("iterations", self.iterations)?;
        positive("repeats", self.repeats)?;
        if let Some(capacity) = self.pareto_capacity {
            positive("pareto_capacity", capacity)?;
        }
        if !self.penalty_coefficient.is_finite() || self.penalty_coefficient < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "penalty_coefficient",
                reason: format!(
                    "must be finite and non-negative, got {}",
                    self.penalty_coefficient
                ),
            });
        }
        Ok(())
    }
}
