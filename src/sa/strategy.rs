//! Single-agent annealing chain.

use rand::Rng;

use super::config::SaConfig;
use crate::error::{ConfigError, HeurError};
use crate::population::{Population, Region};
use crate::random::HeurRng;
use crate::strategy::{
    random_walk, require_single_objective, EvalContext, Progress, Strategy, StrategyReport,
};

/// Simulated annealing over one agent.
///
/// The trial block holds the candidate and the incumbent block the current
/// state. A candidate is accepted when it is better, when no state has been
/// accepted yet, or with probability `exp(-|Δ| / T(it))`.
#[derive(Debug, Clone)]
pub struct SaStrategy {
    config: SaConfig,
    accepted_better: u64,
    accepted_worse: u64,
    rejected: u64,
}

impl SaStrategy {
    pub fn new(config: SaConfig) -> Self {
        Self {
            config,
            accepted_better: 0,
            accepted_worse: 0,
            rejected: 0,
        }
    }

    fn accept(
        &mut self,
        population: &mut Population,
        ctx: &EvalContext<'_, '_>,
        rng: &mut HeurRng,
    ) {
        let direction = ctx.directions()[0];
        let candidate = population.reward(0, Region::New)[0];
        let current = population.reward(0, Region::Old)[0];

        if current == direction.worst() || direction.is_better(candidate, current) {
            population.promote(0);
            self.accepted_better += 1;
            return;
        }

        let progress = ctx.progress();
        let temperature = self.config.cooling.temperature(
            self.config.max_temperature,
            progress.iteration,
            progress.budget,
        );
        let delta = (candidate - current).abs();
        let probability = if temperature > 0.0 && delta.is_finite() {
            (-delta / temperature).exp()
        } else {
            0.0
        };
        if rng.random::<f64>() < probability {
            population.promote(0);
            self.accepted_worse += 1;
        } else {
            self.rejected += 1;
        }
    }
}

impl Strategy for SaStrategy {
    fn name(&self) -> &'static str {
        "sa"
    }

    fn two_phase(&self) -> bool {
        true
    }

    fn agents(&self, _requested: usize) -> usize {
        1
    }

    fn validate(&self, _agents: usize, objectives: usize) -> Result<(), ConfigError> {
        self.config.validate()?;
        require_single_objective(self.name(), objectives)
    }

    fn update(
        &mut self,
        population: &mut Population,
        ctx: &mut EvalContext<'_, '_>,
        rng: &mut HeurRng,
    ) -> Result<(), HeurError> {
        for cycle in 0..self.config.cooling_cycles {
            if cycle > 0 {
                random_walk(population, rng);
            }
            ctx.evaluate(population, Region::New)?;
            self.accept(population, ctx, rng);
        }
        Ok(())
    }

    fn vary(&mut self, population: &mut Population, _progress: Progress, rng: &mut HeurRng) {
        random_walk(population, rng);
    }

    fn report(&self) -> StrategyReport {
        StrategyReport::new()
            .with("accepted_better", self.accepted_better)
            .with("accepted_worse", self.accepted_worse)
            .with("rejected", self.rejected)
    }
}
