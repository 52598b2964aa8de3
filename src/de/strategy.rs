//! DE greedy replacement and `rand/1/bin` variation.

use rand::seq::index;
use rand::Rng;

use super::config::DeConfig;
use crate::error::{ConfigError, HeurError};
use crate::fitness::Direction;
use crate::pareto::sorting::dominates;
use crate::population::{Population, Region};
use crate::random::HeurRng;
use crate::strategy::{require_agents, EvalContext, Progress, Strategy, StrategyReport};

/// Differential evolution with a trial ("new") and incumbent ("old") block.
///
/// After evaluating the trial block, every incumbent is replaced by its
/// trial when the trial is strictly better (one objective) or dominates it
/// (several objectives). Incumbent rewards therefore never get worse.
#[derive(Debug, Clone)]
pub struct DeStrategy {
    config: DeConfig,
    replacements: u64,
    kept: u64,
}

impl DeStrategy {
    pub fn new(config: DeConfig) -> Self {
        Self {
            config,
            replacements: 0,
            kept: 0,
        }
    }
}

fn improves(new: &[f64], old: &[f64], directions: &[Direction]) -> bool {
    match directions {
        [direction] => direction.is_better(new[0], old[0]),
        _ => dominates(new, old, directions),
    }
}

impl Strategy for DeStrategy {
    fn name(&self) -> &'static str {
        "de"
    }

    fn two_phase(&self) -> bool {
        true
    }

    fn validate(&self, agents: usize, _objectives: usize) -> Result<(), ConfigError> {
        self.config.validate()?;
        require_agents(self.name(), 4, agents)
    }

    fn update(
        &mut self,
        population: &mut Population,
        ctx: &mut EvalContext<'_, '_>,
        _rng: &mut HeurRng,
    ) -> Result<(), HeurError> {
        ctx.evaluate(population, Region::New)?;
        for row in 0..population.rows() {
            if improves(
                population.reward(row, Region::New),
                population.reward(row, Region::Old),
                ctx.directions(),
            ) {
                population.promote(row);
                self.replacements += 1;
            } else {
                self.kept += 1;
            }
        }
        Ok(())
    }

    fn vary(&mut self, population: &mut Population, _progress: Progress, rng: &mut HeurRng) {
        let rows = population.rows();
        let genes = population.layout().genes;
        let mut trial = vec![0.0; genes];
        for row in 0..rows {
            // three distinct partners, none equal to `row`
            let picks: Vec<usize> = index::sample(rng, rows - 1, 3)
                .into_iter()
                .map(|k| if k >= row { k + 1 } else { k })
                .collect();
            let forced = rng.random_range(0..genes);
            {
                let base = population.chromosome(picks[0], Region::Old);
                let a = population.chromosome(picks[1], Region::Old);
                let b = population.chromosome(picks[2], Region::Old);
                let current = population.chromosome(row, Region::Old);
                for j in 0..genes {
                    trial[j] = if j == forced || rng.random_bool(self.config.crossover_rate) {
                        base[j] + self.config.scale_factor * (a[j] - b[j])
                    } else {
                        current[j]
                    };
                }
            }
            population
                .chromosome_mut(row, Region::New)
                .copy_from_slice(&trial);
        }
        population.clip(Region::New);
    }

    fn report(&self) -> StrategyReport {
        StrategyReport::new()
            .with("replacements", self.replacements)
            .with("kept", self.kept)
    }
}
