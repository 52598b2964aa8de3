//! Shared plumbing for population-search algorithms.
//!
//! A [`Strategy`] only supplies selection, acceptance and variation rules.
//! Evaluating a population block, assigning fitness and tracking the best
//! agent seen so far is done by [`EvalContext`], which every strategy calls
//! from its `update` hook.

use std::collections::BTreeMap;

use rand::Rng;

use crate::error::{ConfigError, HeurError};
use crate::fitness::{Direction, FitnessEvaluator};
use crate::model::ModelTracer;
use crate::pareto::ParetoSet;
use crate::population::{Agent, Population, Region};
use crate::random::HeurRng;

/// Position inside the iteration budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub iteration: usize,
    pub budget: usize,
}

impl Progress {
    /// `iteration / budget`, in `[0, 1)`.
    pub fn fraction(&self) -> f64 {
        if self.budget == 0 {
            0.0
        } else {
            self.iteration as f64 / self.budget as f64
        }
    }
}

/// Named counters reported by a strategy, summed over repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategyReport {
    counters: BTreeMap<String, u64>,
}

impl StrategyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: u64) -> Self {
        self.add(name, value);
        self
    }

    pub fn add(&mut self, name: &str, value: u64) {
        *self.counters.entry(name.to_string()).or_insert(0) += value;
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.counters.get(name).copied()
    }

    pub fn merge(&mut self, other: &StrategyReport) {
        for (name, &value) in &other.counters {
            self.add(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// A population-search algorithm driven for a fixed iteration budget.
///
/// Per iteration the orchestrator calls [`update`](Strategy::update), then
/// [`vary`](Strategy::vary). A fresh strategy is built for every repeat.
pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Whether rows carry an incumbent ("old") block next to the trial block.
    fn two_phase(&self) -> bool;

    /// Number of agents actually used for a requested population size.
    fn agents(&self, requested: usize) -> usize {
        requested
    }

    /// Checks that the strategy can run `agents` agents on `objectives` objectives.
    fn validate(&self, agents: usize, objectives: usize) -> Result<(), ConfigError>;

    /// Hook run once after the population has been sampled.
    fn initialize(&mut self, _population: &mut Population, _rng: &mut HeurRng) {}

    /// Evaluates and applies selection or acceptance.
    fn update(
        &mut self,
        population: &mut Population,
        ctx: &mut EvalContext<'_, '_>,
        rng: &mut HeurRng,
    ) -> Result<(), HeurError>;

    /// Produces the next trial chromosomes.
    fn vary(&mut self, population: &mut Population, progress: Progress, rng: &mut HeurRng);

    /// Block holding the current incumbents, used for convergence history.
    fn incumbent(&self) -> Region {
        if self.two_phase() {
            Region::Old
        } else {
            Region::New
        }
    }

    fn report(&self) -> StrategyReport {
        StrategyReport::new()
    }
}

/// Best agent seen so far.
#[derive(Debug, Clone)]
pub enum BestRecord {
    /// Single objective: the strictly best agent by fitness.
    Single {
        direction: Direction,
        best: Option<Agent>,
    },
    /// Several objectives: the non-dominated feasible agents.
    Pareto(ParetoSet),
}

impl BestRecord {
    pub fn new(directions: &[Direction], pareto_capacity: Option<usize>) -> Self {
        match directions {
            [direction] => BestRecord::Single {
                direction: *direction,
                best: None,
            },
            _ => BestRecord::Pareto(ParetoSet::new(directions.to_vec(), pareto_capacity)),
        }
    }

    /// Offers one evaluated row.
    pub fn observe(&mut self, population: &Population, row: usize, region: Region) {
        match self {
            BestRecord::Single { direction, best } => {
                let reward = population.reward(row, region)[0];
                let improves = match best {
                    None => true,
                    Some(current) => direction.is_better(reward, current.reward[0]),
                };
                if improves {
                    *best = Some(population.agent(row, region));
                }
            }
            BestRecord::Pareto(set) => {
                if population.status(row, region).is_feasible() {
                    set.insert(population.agent(row, region));
                }
            }
        }
    }

    /// Folds another record in; ties keep the existing entry.
    pub fn merge(&mut self, other: BestRecord) {
        match (self, other) {
            (
                BestRecord::Single { direction, best },
                BestRecord::Single {
                    best: Some(candidate),
                    ..
                },
            ) => {
                let improves = match best {
                    None => true,
                    Some(current) => direction.is_better(candidate.reward[0], current.reward[0]),
                };
                if improves {
                    *best = Some(candidate);
                }
            }
            (BestRecord::Pareto(set), BestRecord::Pareto(other)) => set.merge(other),
            _ => {}
        }
    }
}

/// Evaluation services handed to [`Strategy::update`].
pub struct EvalContext<'t, 'm> {
    tracer: &'t ModelTracer<'m>,
    fitness: &'t FitnessEvaluator,
    repeat: usize,
    progress: Progress,
    evaluations: usize,
    evaluated: Vec<f64>,
    record: BestRecord,
}

impl<'t, 'm> EvalContext<'t, 'm> {
    pub fn new(
        tracer: &'t ModelTracer<'m>,
        fitness: &'t FitnessEvaluator,
        repeat: usize,
        record: BestRecord,
    ) -> Self {
        Self {
            tracer,
            fitness,
            repeat,
            progress: Progress {
                iteration: 0,
                budget: 0,
            },
            evaluations: 0,
            evaluated: Vec::new(),
            record,
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = progress;
    }

    pub fn directions(&self) -> &[Direction] {
        self.fitness.directions()
    }

    /// Traces `region` of every row, writes fitness and status, and offers
    /// every row to the best record.
    pub fn evaluate(
        &mut self,
        population: &mut Population,
        region: Region,
    ) -> Result<(), HeurError> {
        let evaluation = self
            .tracer
            .evaluate(population.view(region))
            .map_err(|e| HeurError::evaluation(self.repeat, self.progress.iteration, e))?;
        self.fitness.assign(&evaluation, population, region);
        self.evaluations += population.rows();
        self.evaluated = population.fitness_column(region, 0);
        for row in 0..population.rows() {
            self.record.observe(population, row, region);
        }
        Ok(())
    }

    /// Number of agent evaluations so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// First-objective fitness of the block last passed to
    /// [`evaluate`](Self::evaluate), in row order at evaluation time.
    pub fn evaluated_fitness(&self) -> &[f64] {
        &self.evaluated
    }

    pub fn record(&self) -> &BestRecord {
        &self.record
    }

    pub fn into_record(self) -> BestRecord {
        self.record
    }
}

/// Moves every trial gene by `U(-1, 1)` away from its incumbent, then clips.
pub(crate) fn random_walk(population: &mut Population, rng: &mut HeurRng) {
    for row in 0..population.rows() {
        let old = population.chromosome(row, Region::Old).to_vec();
        for (gene, base) in population.chromosome_mut(row, Region::New).iter_mut().zip(old) {
            *gene = (base + rng.random_range(-1.0..=1.0)).clamp(0.0, 1.0);
        }
    }
}

/// Rejects multi-objective models for single-agent chains.
pub(crate) fn require_single_objective(
    algorithm: &'static str,
    objectives: usize,
) -> Result<(), ConfigError> {
    if objectives > 1 {
        Err(ConfigError::UnsupportedMultiObjective {
            algorithm,
            objectives,
        })
    } else {
        Ok(())
    }
}

/// Rejects populations smaller than `required`.
pub(crate) fn require_agents(
    algorithm: &'static str,
    required: usize,
    actual: usize,
) -> Result<(), ConfigError> {
    if actual < required {
        Err(ConfigError::PopulationTooSmall {
            algorithm,
            required,
            actual,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::Feasibility;
    use crate::population::Layout;
    use crate::random::create_rng;

    #[test]
    fn test_report_merge() {
        let mut a = StrategyReport::new().with("accepted", 2);
        a.merge(&StrategyReport::new().with("accepted", 3).with("rejected", 1));
        assert_eq!(a.get("accepted"), Some(5));
        assert_eq!(a.get("rejected"), Some(1));
        assert_eq!(a.get("missing"), None);
    }

    #[test]
    fn test_single_record_keeps_strictly_better() {
        let mut rng = create_rng(1);
        let mut pop =
            Population::initialize(3, Layout::single(1, 1), &[Direction::Minimize], &mut rng);
        for (row, r) in [5.0, 2.0, 2.0].into_iter().enumerate() {
            pop.reward_mut(row, Region::New)[0] = r;
            pop.chromosome_mut(row, Region::New)[0] = row as f64 / 10.0;
        }
        let mut record = BestRecord::new(&[Direction::Minimize], None);
        for row in 0..3 {
            record.observe(&pop, row, Region::New);
        }
        match record {
            BestRecord::Single {
                best: Some(best), ..
            } => {
                assert_eq!(best.reward, vec![2.0]);
                assert_eq!(best.chromosome, vec![0.1]);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn test_pareto_record_skips_infeasible() {
        let dirs = [Direction::Minimize, Direction::Minimize];
        let mut rng = create_rng(2);
        let mut pop = Population::initialize(2, Layout::single(1, 2), &dirs, &mut rng);
        pop.reward_mut(0, Region::New).copy_from_slice(&[1.0, 1.0]);
        pop.set_status(0, Region::New, Feasibility::Infeasible);
        pop.reward_mut(1, Region::New).copy_from_slice(&[2.0, 2.0]);
        pop.set_status(1, Region::New, Feasibility::Feasible);

        let mut record = BestRecord::new(&dirs, None);
        record.observe(&pop, 0, Region::New);
        record.observe(&pop, 1, Region::New);
        match record {
            BestRecord::Pareto(set) => {
                assert_eq!(set.len(), 1);
                assert_eq!(set.members()[0].reward, vec![2.0, 2.0]);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn test_random_walk_stays_in_unit_interval() {
        let mut rng = create_rng(3);
        let mut pop =
            Population::initialize(1, Layout::two_phase(50, 1), &[Direction::Minimize], &mut rng);
        random_walk(&mut pop, &mut rng);
        assert!(pop
            .chromosome(0, Region::New)
            .iter()
            .all(|g| (0.0..=1.0).contains(g)));
    }
}
