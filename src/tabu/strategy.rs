//! Single-agent tabu chain.

use std::collections::{HashSet, VecDeque};

use super::config::TabuConfig;
use crate::error::{ConfigError, HeurError};
use crate::fitness::Direction;
use crate::population::{Population, Region};
use crate::random::HeurRng;
use crate::strategy::{
    random_walk, require_single_objective, EvalContext, Progress, Strategy, StrategyReport,
};

type StateKey = Vec<i64>;

/// Tabu search over one agent.
///
/// Iteration 0 commits the evaluated state to memory and as the working
/// state. Afterwards:
///
/// - default: the memory is not consulted; a candidate replaces the working
///   state only when it is better.
/// - `strict`: a candidate whose quantized state is in memory is rejected
///   unless it beats the best reward seen (aspiration); any admissible
///   candidate becomes the working state and is pushed into the FIFO memory.
#[derive(Debug, Clone)]
pub struct TabuStrategy {
    config: TabuConfig,
    queue: VecDeque<StateKey>,
    members: HashSet<StateKey>,
    best: Option<f64>,
    moves: u64,
    rejected: u64,
    tabu_hits: u64,
    aspirations: u64,
}

impl TabuStrategy {
    pub fn new(config: TabuConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            members: HashSet::new(),
            best: None,
            moves: 0,
            rejected: 0,
            tabu_hits: 0,
            aspirations: 0,
        }
    }

    fn key(&self, chromosome: &[f64]) -> StateKey {
        chromosome
            .iter()
            .map(|g| (g * self.config.resolution).round() as i64)
            .collect()
    }

    fn remember(&mut self, key: StateKey) {
        if self.members.contains(&key) {
            return;
        }
        if self.queue.len() >= self.config.tabu_tenure {
            if let Some(expired) = self.queue.pop_front() {
                self.members.remove(&expired);
            }
        }
        self.members.insert(key.clone());
        self.queue.push_back(key);
    }

    fn commit(&mut self, population: &mut Population, direction: Direction) {
        let reward = population.reward(0, Region::New)[0];
        population.promote(0);
        self.moves += 1;
        if self.best.map_or(true, |best| direction.is_better(reward, best)) {
            self.best = Some(reward);
        }
    }

    /// Number of states currently held in memory.
    pub fn memory_len(&self) -> usize {
        self.queue.len()
    }
}

impl Strategy for TabuStrategy {
    fn name(&self) -> &'static str {
        "tabu"
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
        _rng: &mut HeurRng,
    ) -> Result<(), HeurError> {
        ctx.evaluate(population, Region::New)?;
        let direction = ctx.directions()[0];

        if ctx.progress().iteration == 0 {
            let key = self.key(population.chromosome(0, Region::New));
            self.remember(key);
            self.commit(population, direction);
            return Ok(());
        }

        let candidate = population.reward(0, Region::New)[0];
        if !self.config.strict {
            if direction.is_better(candidate, population.reward(0, Region::Old)[0]) {
                self.commit(population, direction);
            } else {
                self.rejected += 1;
            }
            return Ok(());
        }

        let key = self.key(population.chromosome(0, Region::New));
        if self.members.contains(&key) {
            self.tabu_hits += 1;
            let aspires = self
                .best
                .map_or(true, |best| direction.is_better(candidate, best));
            if !aspires {
                self.rejected += 1;
                return Ok(());
            }
            self.aspirations += 1;
        }
        self.remember(key);
        self.commit(population, direction);
        Ok(())
    }

    fn vary(&mut self, population: &mut Population, _progress: Progress, rng: &mut HeurRng) {
        random_walk(population, rng);
    }

    fn report(&self) -> StrategyReport {
        StrategyReport::new()
            .with("moves", self.moves)
            .with("rejected", self.rejected)
            .with("tabu_hits", self.tabu_hits)
            .with("aspirations", self.aspirations)
            .with("memory", self.queue.len() as u64)
    }
}
