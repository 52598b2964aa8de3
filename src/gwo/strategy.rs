//! Leader-following update of the grey wolf optimizer.

use rand::Rng;

use super::config::GwoConfig;
use crate::error::{ConfigError, HeurError};
use crate::population::{Population, Region};
use crate::random::HeurRng;
use crate::strategy::{require_agents, EvalContext, Progress, Strategy, StrategyReport};

/// Grey wolf optimizer.
///
/// Update evaluates and ranks the pack, then copies the three best agents
/// as alpha, beta and delta. Every gene then moves to the mean of
/// `L - A·|C·L - x|` over the three leaders `L`, with `A = 2a·r1 - a`,
/// `C = 2·r2` and `a = a_max·(1 - it/S)`.
#[derive(Debug, Clone)]
pub struct GwoStrategy {
    config: GwoConfig,
    leaders: Vec<Vec<f64>>,
    leader_changes: u64,
}

impl GwoStrategy {
    pub fn new(config: GwoConfig) -> Self {
        Self {
            config,
            leaders: Vec::new(),
            leader_changes: 0,
        }
    }

    pub fn leaders(&self) -> &[Vec<f64>] {
        &self.leaders
    }
}

impl Strategy for GwoStrategy {
    fn name(&self) -> &'static str {
        "gwo"
    }

    fn two_phase(&self) -> bool {
        false
    }

    fn validate(&self, agents: usize, _objectives: usize) -> Result<(), ConfigError> {
        self.config.validate()?;
        require_agents(self.name(), 3, agents)
    }

    fn update(
        &mut self,
        population: &mut Population,
        ctx: &mut EvalContext<'_, '_>,
        _rng: &mut HeurRng,
    ) -> Result<(), HeurError> {
        ctx.evaluate(population, Region::New)?;
        population.sort_best_first(Region::New, ctx.directions());
        let alpha = population.chromosome(0, Region::New);
        if self.leaders.first().map_or(true, |old| old.as_slice() != alpha) {
            self.leader_changes += 1;
        }
        self.leaders = (0..3)
            .map(|row| population.chromosome(row, Region::New).to_vec())
            .collect();
        Ok(())
    }

    fn vary(&mut self, population: &mut Population, progress: Progress, rng: &mut HeurRng) {
        if self.leaders.is_empty() {
            return;
        }
        let a = self.config.a_max * (1.0 - progress.fraction());
        let count = self.leaders.len() as f64;
        for row in 0..population.rows() {
            for (j, x) in population
                .chromosome_mut(row, Region::New)
                .iter_mut()
                .enumerate()
            {
                let mut sum = 0.0;
                for leader in &self.leaders {
                    let big_a = 2.0 * a * rng.random::<f64>() - a;
                    let c = 2.0 * rng.random::<f64>();
                    let l = leader[j];
                    sum += l - big_a * (c * l - *x).abs();
                }
                *x = (sum / count).clamp(0.0, 1.0);
            }
        }
    }

    fn report(&self) -> StrategyReport {
        StrategyReport::new().with("leader_changes", self.leader_changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::Direction;
    use crate::population::Layout;
    use crate::random::create_rng;

    #[test]
    fn test_requires_three_agents() {
        let gwo = GwoStrategy::new(GwoConfig::default());
        assert!(gwo.validate(2, 1).is_err());
        assert!(gwo.validate(3, 1).is_ok());
    }

    #[test]
    fn test_zero_a_collapses_onto_leaders() {
        // with a = 0 every move is exactly the leader position
        let mut rng = create_rng(9);
        let mut pop =
            Population::initialize(5, Layout::single(2, 1), &[Direction::Minimize], &mut rng);
        let mut gwo = GwoStrategy::new(GwoConfig::default().with_a_max(0.0));
        gwo.leaders = vec![vec![0.2, 0.4], vec![0.4, 0.6], vec![0.6, 0.8]];
        gwo.vary(&mut pop, Progress { iteration: 0, budget: 10 }, &mut rng);
        for row in 0..5 {
            let genes = pop.chromosome(row, Region::New);
            assert!((genes[0] - 0.4).abs() < 1e-12);
            assert!((genes[1] - 0.6).abs() < 1e-12);
        }
    }
}
