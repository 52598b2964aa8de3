//! GA update and variation rules.

use rand::Rng;

use super::config::GaConfig;
use crate::error::{ConfigError, HeurError};
use crate::population::{Population, Region};
use crate::random::HeurRng;
use crate::strategy::{require_agents, EvalContext, Progress, Strategy, StrategyReport};

/// Genetic algorithm over the chromosome matrix.
///
/// Update: evaluate, rank best first, then apply survivor selection.
/// Vary: every agent picks a mate (itself with probability
/// `1 - crossover_rate`), then per gene either keeps its own gene or takes
/// the blend `self + U(-1, 1) · (mate - self)` with equal odds, then redraws
/// each gene uniformly with probability `mutation_rate`.
#[derive(Debug, Clone)]
pub struct GaStrategy {
    config: GaConfig,
    matings: u64,
    mutations: u64,
}

impl GaStrategy {
    pub fn new(config: GaConfig) -> Self {
        Self {
            config,
            matings: 0,
            mutations: 0,
        }
    }
}

impl Strategy for GaStrategy {
    fn name(&self) -> &'static str {
        "ga"
    }

    fn two_phase(&self) -> bool {
        false
    }

    fn validate(&self, agents: usize, _objectives: usize) -> Result<(), ConfigError> {
        self.config.validate()?;
        require_agents(self.name(), 1, agents)
    }

    fn update(
        &mut self,
        population: &mut Population,
        ctx: &mut EvalContext<'_, '_>,
        rng: &mut HeurRng,
    ) -> Result<(), HeurError> {
        ctx.evaluate(population, Region::New)?;
        population.sort_best_first(Region::New, ctx.directions());

        let fraction = if self.config.survival_lb < self.config.survival_ub {
            rng.random_range(self.config.survival_lb..self.config.survival_ub)
        } else {
            self.config.survival_lb
        };
        let order = self
            .config
            .selection
            .order(population.rows(), fraction, rng);
        population.reorder(&order);
        Ok(())
    }

    fn vary(&mut self, population: &mut Population, _progress: Progress, rng: &mut HeurRng) {
        let parents = population.clone();
        let rows = population.rows();
        for row in 0..rows {
            let mate = if rng.random_bool(self.config.crossover_rate) {
                rng.random_range(0..rows)
            } else {
                row
            };
            if mate != row {
                self.matings += 1;
            }
            let mate_genes = parents.chromosome(mate, Region::New);
            for (gene, &other) in population
                .chromosome_mut(row, Region::New)
                .iter_mut()
                .zip(mate_genes)
            {
                if !rng.random_bool(0.5) {
                    *gene += rng.random_range(-1.0..=1.0) * (other - *gene);
                }
                if rng.random_bool(self.config.mutation_rate) {
                    *gene = rng.random();
                    self.mutations += 1;
                }
            }
        }
        population.clip(Region::New);
    }

    fn report(&self) -> StrategyReport {
        StrategyReport::new()
            .with("matings", self.matings)
            .with("mutations", self.mutations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::Direction;
    use crate::population::Layout;
    use crate::random::create_rng;

    #[test]
    fn test_vary_without_mating_or_mutation_is_identity() {
        let mut rng = create_rng(5);
        let mut pop =
            Population::initialize(6, Layout::single(4, 1), &[Direction::Minimize], &mut rng);
        let before = pop.clone();
        let mut ga = GaStrategy::new(
            GaConfig::default()
                .with_crossover_rate(0.0)
                .with_mutation_rate(0.0),
        );
        ga.vary(&mut pop, Progress { iteration: 0, budget: 1 }, &mut rng);
        for row in 0..6 {
            assert_eq!(pop.chromosome(row, Region::New), before.chromosome(row, Region::New));
        }
        assert_eq!(ga.report().get("matings"), Some(0));
    }

    #[test]
    fn test_full_mutation_redraws_every_gene() {
        let mut rng = create_rng(6);
        let mut pop =
            Population::initialize(3, Layout::single(5, 1), &[Direction::Minimize], &mut rng);
        let mut ga = GaStrategy::new(GaConfig::default().with_mutation_rate(1.0));
        ga.vary(&mut pop, Progress { iteration: 0, budget: 1 }, &mut rng);
        assert_eq!(ga.report().get("mutations"), Some(15));
        for row in 0..3 {
            assert!(pop.chromosome(row, Region::New).iter().all(|g| (0.0..=1.0).contains(g)));
        }
    }

    #[test]
    fn test_ga_has_no_incumbent_block() {
        let ga = GaStrategy::new(GaConfig::default());
        assert!(!ga.two_phase());
        assert!(matches!(ga.incumbent(), Region::New));
    }

    #[test]
    fn test_crossover_mask_keeps_own_genes() {
        const GENES: usize = 1000;
        let mut mated_rows = 0;
        for seed in 0..8 {
            let mut rng = create_rng(seed);
            let mut pop = Population::initialize(
                2,
                Layout::single(GENES, 1),
                &[Direction::Minimize],
                &mut rng,
            );
            pop.chromosome_mut(0, Region::New).fill(0.2);
            pop.chromosome_mut(1, Region::New).fill(0.8);
            let mut ga = GaStrategy::new(
                GaConfig::default()
                    .with_crossover_rate(1.0)
                    .with_mutation_rate(0.0),
            );
            ga.vary(&mut pop, Progress { iteration: 0, budget: 1 }, &mut rng);

            for (row, own, other) in [(0, 0.2, 0.8), (1, 0.8, 0.2)] {
                let genes = pop.chromosome(row, Region::New);
                let kept = genes.iter().filter(|&&g| g == own).count();
                if kept == GENES {
                    // mated with itself
                    continue;
                }
                mated_rows += 1;
                assert!(
                    (400..=600).contains(&kept),
                    "seed {seed} row {row}: {kept} own genes kept"
                );
                let copied = genes.iter().filter(|&&g| g == other).count();
                assert!(copied < 10, "seed {seed} row {row}: {copied} mate genes copied");
            }
        }
        assert!(mated_rows > 0);
    }
}
