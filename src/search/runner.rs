//! Search orchestration: discovery, repeats and result assembly.

use tracing::{debug, info, warn};

use super::config::SearchConfig;
use super::result::{Candidate, IterationStats, SearchResult, Warning};
use crate::error::HeurError;
use crate::fitness::{Feasibility, FitnessEvaluator};
use crate::model::{ChromosomeView, HeurModel, ModelTracer};
use crate::population::{Agent, Layout, Population};
use crate::random::{create_rng, rng_from, stream_seeds};
use crate::strategy::{BestRecord, EvalContext, Progress, StrategyReport};

struct RepeatOutcome {
    record: BestRecord,
    history: Vec<IterationStats>,
    evaluations: usize,
    report: StrategyReport,
}

/// Runs a model through the configured algorithm.
///
/// ```
/// use u_heurmodel::model::TraceContext;
/// use u_heurmodel::search::{SearchConfig, SearchRunner};
/// use u_heurmodel::HeurError;
///
/// fn model(ctx: &mut TraceContext<'_>) -> Result<(), HeurError> {
///     let x = ctx.continuous("x", (), (-5.0, 5.0))?;
///     ctx.minimize((x.value() - 1.0).powi(2))
/// }
///
/// let config = SearchConfig::default().with_seed(3).with_iterations(50);
/// let result = SearchRunner::run(&model, &config).unwrap();
/// let x = result.best().unwrap().solution.value("x").unwrap();
/// assert!((x - 1.0).abs() < 0.5);
/// ```
pub struct SearchRunner;

impl SearchRunner {
    pub fn run<M: HeurModel>(model: &M, config: &SearchConfig) -> Result<SearchResult, HeurError> {
        config.validate()?;
        let tracer = ModelTracer::discover(model)?;
        let schema = tracer.schema();
        let fitness = FitnessEvaluator::new(
            config.penalty_coefficient,
            schema.directions().to_vec(),
            schema.constraints().len(),
        )?;

        let template = config.algorithm.strategy();
        let agents = template.agents(config.population_size);
        template.validate(agents, schema.objectives())?;

        info!(
            algorithm = template.name(),
            agents,
            iterations = config.iterations,
            repeats = config.repeats,
            genes = schema.chromosome_len(),
            "search started"
        );

        let mut master = rng_from(config.seed);
        let seeds = stream_seeds(&mut master, config.repeats);
        let outcomes = Self::run_repeats(&tracer, &fitness, config, agents, &seeds);

        let mut record = BestRecord::new(fitness.directions(), config.pareto_capacity);
        let mut warnings = Vec::new();
        let mut history = Vec::new();
        let mut report = StrategyReport::new();
        let mut evaluations = 0;
        let mut succeeded = 0;
        let mut first_error = None;

        for (repeat, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(outcome) => {
                    succeeded += 1;
                    record.merge(outcome.record);
                    evaluations += outcome.evaluations;
                    report.merge(&outcome.report);
                    if config.record_history {
                        history.push(outcome.history);
                    }
                }
                Err(err) => {
                    warn!(repeat, error = %err, "repeat failed");
                    warnings.push(Warning::RepeatFailed {
                        repeat,
                        message: err.to_string(),
                    });
                    first_error.get_or_insert(err);
                }
            }
        }
        if succeeded == 0 {
            if let Some(err) = first_error {
                return Err(err);
            }
        }

        let multi_objective = schema.objectives() > 1;
        let agents: Vec<Agent> = match record {
            BestRecord::Single { best, .. } => best.into_iter().collect(),
            BestRecord::Pareto(set) => {
                let direction = set.directions()[0];
                let mut members = set.into_members();
                members.sort_by(|a, b| direction.compare(a.reward[0], b.reward[0]));
                members
            }
        };
        let candidates = agents
            .into_iter()
            .map(|agent| Self::candidate(&tracer, agent))
            .collect::<Result<Vec<_>, _>>()?;

        let status = candidates.first().map(|c| c.status);
        if !status.is_some_and(Feasibility::is_feasible) {
            warn!(algorithm = template.name(), "no feasible solution found");
            warnings.push(Warning::InfeasibleResult);
        }

        info!(
            algorithm = template.name(),
            evaluations,
            candidates = candidates.len(),
            status = ?status,
            "search finished"
        );

        Ok(SearchResult {
            algorithm: template.name().to_string(),
            candidates,
            multi_objective,
            warnings,
            history,
            evaluations,
            report,
        })
    }

    fn run_repeats(
        tracer: &ModelTracer<'_>,
        fitness: &FitnessEvaluator,
        config: &SearchConfig,
        agents: usize,
        seeds: &[u64],
    ) -> Vec<Result<RepeatOutcome, HeurError>> {
        let run = |(repeat, &seed): (usize, &u64)| {
            Self::run_repeat(tracer, fitness, config, agents, repeat, seed)
        };

        #[cfg(feature = "parallel")]
        if config.parallel && seeds.len() > 1 {
            use rayon::prelude::*;
            return seeds.par_iter().enumerate().map(run).collect();
        }

        seeds.iter().enumerate().map(run).collect()
    }

    fn run_repeat(
        tracer: &ModelTracer<'_>,
        fitness: &FitnessEvaluator,
        config: &SearchConfig,
        agents: usize,
        repeat: usize,
        seed: u64,
    ) -> Result<RepeatOutcome, HeurError> {
        let mut rng = create_rng(seed);
        let mut strategy = config.algorithm.strategy();
        let layout = Layout {
            genes: tracer.schema().chromosome_len(),
            objectives: fitness.objectives(),
            two_phase: strategy.two_phase(),
        };
        let mut population = Population::initialize(agents, layout, fitness.directions(), &mut rng);
        strategy.initialize(&mut population, &mut rng);

        let record = BestRecord::new(fitness.directions(), config.pareto_capacity);
        let mut ctx = EvalContext::new(tracer, fitness, repeat, record);
        let mut history = Vec::new();

        for iteration in 0..config.iterations {
            let progress = Progress {
                iteration,
                budget: config.iterations,
            };
            ctx.set_progress(progress);
            strategy.update(&mut population, &mut ctx, &mut rng)?;
            if config.record_history {
                // single-phase strategies reorder rows during selection
                let stats = if strategy.two_phase() {
                    let column = population.fitness_column(strategy.incumbent(), 0);
                    IterationStats::from_column(iteration, &column)
                } else {
                    IterationStats::from_column(iteration, ctx.evaluated_fitness())
                };
                history.push(stats);
            }
            if iteration + 1 < config.iterations {
                strategy.vary(&mut population, progress, &mut rng);
            }
        }

        let evaluations = ctx.evaluations();
        debug!(repeat, seed, evaluations, "repeat finished");
        Ok(RepeatOutcome {
            record: ctx.into_record(),
            history,
            evaluations,
            report: strategy.report(),
        })
    }

    /// Decodes an agent and re-checks its feasibility against the model.
    fn candidate(tracer: &ModelTracer<'_>, agent: Agent) -> Result<Candidate, HeurError> {
        let status = tracer
            .check_feasibility(ChromosomeView::single(&agent.chromosome))?
            .into_iter()
            .next()
            .unwrap_or(agent.status);
        Ok(Candidate {
            solution: tracer.schema().decode(&agent.chromosome),
            reward: agent.reward,
            status,
        })
    }
}
