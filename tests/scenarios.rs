//! End-to-end searches on small models with known optima.

use std::sync::atomic::{AtomicUsize, Ordering};

use u_heurmodel::de::DeConfig;
use u_heurmodel::ga::{GaConfig, Selection};
use u_heurmodel::gwo::GwoConfig;
use u_heurmodel::model::{model_fn, Mode, TraceContext};
use u_heurmodel::options::Options;
use u_heurmodel::pareto::sorting::dominates;
use u_heurmodel::sa::SaConfig;
use u_heurmodel::search::Warning;
use u_heurmodel::tabu::TabuConfig;
use u_heurmodel::{
    Algorithm, ConfigError, Direction, Feasibility, HeurError, SchemaError, SearchConfig,
    SearchRunner,
};

fn square(ctx: &mut TraceContext<'_>) -> Result<(), HeurError> {
    let x = ctx.continuous("x", (), (0.0, 10.0))?;
    ctx.minimize(x.value().powi(2))
}

fn sphere(ctx: &mut TraceContext<'_>) -> Result<(), HeurError> {
    let x = ctx.continuous("x", 3usize, (-5.0, 5.0))?;
    ctx.minimize(x.elements().map(|e| e.powi(2)).sum())
}

fn sphere_value(result: &u_heurmodel::SearchResult) -> f64 {
    let solution = &result.best().unwrap().solution;
    (0..3)
        .map(|i| solution.get("x", &[i]).unwrap().powi(2))
        .sum()
}

#[test]
fn test_ga_minimizes_square() {
    let config = SearchConfig::new(Algorithm::Ga(GaConfig::default()))
        .with_population_size(50)
        .with_iterations(100)
        .with_seed(42);
    let result = SearchRunner::run(&square, &config).unwrap();

    let best = result.best().unwrap();
    let x = best.solution.value("x").unwrap();
    assert!(x.abs() < 0.1, "x = {x}");
    assert_eq!(best.status, Feasibility::Unconstrained);
    assert!(result.warnings.is_empty());
    assert_eq!(result.evaluations, 50 * 100);
}

#[test]
fn test_tournament_selection_converges() {
    let ga = GaConfig::default().with_selection(Selection::Tournament);
    let config = SearchConfig::new(Algorithm::Ga(ga))
        .with_population_size(40)
        .with_iterations(80)
        .with_seed(5);
    let result = SearchRunner::run(&square, &config).unwrap();
    assert!(result.best().unwrap().solution.value("x").unwrap() < 0.2);
}

#[test]
fn test_penalty_drives_binary_to_feasible() {
    let model = model_fn(|ctx: &mut TraceContext<'_>| {
        let x = ctx.binary("x", ())?;
        ctx.constraint(x.value().equals(1.0))?;
        ctx.minimize(x.value())
    });
    let config = SearchConfig::default()
        .with_penalty_coefficient(10.0)
        .with_population_size(10)
        .with_iterations(20)
        .with_seed(1);
    let result = SearchRunner::run(&model, &config).unwrap();

    let best = result.best().unwrap();
    assert_eq!(best.status, Feasibility::Feasible);
    assert_eq!(best.solution.binary("x", &[]), Some(true));
    assert_eq!(best.reward, vec![1.0]);
    assert!(result.is_feasible());
}

#[test]
fn test_unpenalized_constraint_fails_before_evaluation() {
    let calls = AtomicUsize::new(0);
    let model = model_fn(|ctx: &mut TraceContext<'_>| {
        calls.fetch_add(1, Ordering::SeqCst);
        let x = ctx.continuous("x", (), (0.0, 1.0))?;
        ctx.constraint(x.value().le(0.5))?;
        ctx.minimize(x.value())
    });
    let err = SearchRunner::run(&model, &SearchConfig::default().with_seed(0)).unwrap_err();

    assert_eq!(
        err,
        HeurError::Config(ConfigError::UnpenalizedConstraint { constraints: 1 })
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_infeasible_result_is_a_warning() {
    let model = model_fn(|ctx: &mut TraceContext<'_>| {
        let x = ctx.continuous("x", (), (0.0, 1.0))?;
        ctx.constraint(x.value().ge(2.0).named("unreachable"))?;
        ctx.minimize(x.value())
    });
    let config = SearchConfig::default()
        .with_penalty_coefficient(1.0)
        .with_iterations(10)
        .with_seed(9);
    let result = SearchRunner::run(&model, &config).unwrap();

    assert_eq!(result.status(), Some(Feasibility::Infeasible));
    assert!(result.warnings.contains(&Warning::InfeasibleResult));
    let x = result.best().unwrap().solution.value("x").unwrap();
    assert!(x > 0.9, "penalty should push x towards the bound, got {x}");
}

#[test]
fn test_sa_zero_temperature_never_accepts_worse() {
    let cold = SearchConfig::new(Algorithm::Sa(SaConfig::default().with_max_temperature(0.0)))
        .with_iterations(200)
        .with_seed(11);
    let result = SearchRunner::run(&square, &cold).unwrap();
    assert_eq!(result.report.get("accepted_worse"), Some(0));
    assert_eq!(result.evaluations, 200);

    let hot = SearchConfig::new(Algorithm::Sa(SaConfig::default().with_max_temperature(1e6)))
        .with_iterations(200)
        .with_seed(11);
    let result = SearchRunner::run(&square, &hot).unwrap();
    assert!(result.report.get("accepted_worse").unwrap() > 0);
}

#[test]
fn test_sa_rejects_multi_objective() {
    let model = model_fn(|ctx: &mut TraceContext<'_>| {
        let x = ctx.continuous("x", (), (0.0, 1.0))?;
        ctx.minimize(x.value())?;
        ctx.maximize(x.value())
    });
    let config = SearchConfig::new(Algorithm::Sa(SaConfig::default()));
    let err = SearchRunner::run(&model, &config).unwrap_err();
    assert!(matches!(
        err,
        HeurError::Config(ConfigError::UnsupportedMultiObjective { objectives: 2, .. })
    ));
}

#[test]
fn test_strict_tabu_bounds_memory() {
    let tabu = TabuConfig::default().with_tabu_tenure(5).with_strict(true);
    let config = SearchConfig::new(Algorithm::Tabu(tabu))
        .with_iterations(60)
        .with_seed(21);
    let result = SearchRunner::run(&sphere, &config).unwrap();

    assert_eq!(result.algorithm, "tabu");
    assert!(result.report.get("memory").unwrap() <= 5);
    assert!(result.report.get("moves").unwrap() > 0);
    assert!(sphere_value(&result) < 75.0);
}

#[test]
fn test_default_tabu_only_remembers_first_state() {
    let config = SearchConfig::new(Algorithm::Tabu(TabuConfig::default()))
        .with_iterations(50)
        .with_history(true)
        .with_seed(13);
    let result = SearchRunner::run(&square, &config).unwrap();

    let report = &result.report;
    assert_eq!(report.get("memory"), Some(1));
    assert_eq!(report.get("tabu_hits"), Some(0));
    assert_eq!(report.get("aspirations"), Some(0));
    assert_eq!(
        report.get("moves").unwrap() + report.get("rejected").unwrap(),
        50
    );

    let run = &result.history[0];
    assert_eq!(run.len(), 50);
    for pair in run.windows(2) {
        assert!(pair[1].min <= pair[0].min, "{pair:?}");
    }
}

#[test]
fn test_gwo_converges_on_sphere() {
    let config = SearchConfig::new(Algorithm::Gwo(GwoConfig::default()))
        .with_population_size(20)
        .with_iterations(100)
        .with_seed(3);
    let result = SearchRunner::run(&sphere, &config).unwrap();
    let value = sphere_value(&result);
    assert!(value < 0.1, "sphere = {value}");
}

#[test]
fn test_de_history_is_monotone() {
    let config = SearchConfig::new(Algorithm::De(DeConfig::default()))
        .with_population_size(20)
        .with_iterations(40)
        .with_repeats(2)
        .with_parallel(false)
        .with_history(true)
        .with_seed(8);
    let result = SearchRunner::run(&sphere, &config).unwrap();

    assert_eq!(result.history.len(), 2);
    for run in &result.history {
        assert_eq!(run.len(), 40);
        for pair in run.windows(2) {
            assert!(pair[1].min <= pair[0].min);
            assert!(pair[0].min <= pair[0].mean && pair[0].mean <= pair[0].max);
        }
    }
    assert_eq!(result.evaluations, 2 * 20 * 40);
    assert!(sphere_value(&result) < 1.0);
}

#[test]
fn test_ga_history_describes_evaluated_population() {
    let ga = GaConfig::default().with_survival(0.1, 0.1);
    let config = SearchConfig::new(Algorithm::Ga(ga))
        .with_population_size(50)
        .with_iterations(1)
        .with_history(true)
        .with_seed(17);
    let result = SearchRunner::run(&square, &config).unwrap();

    // 50 uniform draws of x on [0, 10]; the five survivors sit near x = 1
    let stats = result.history[0][0];
    assert!(stats.max > 50.0, "{stats:?}");
    assert!(stats.mean > 10.0, "{stats:?}");
    assert!(stats.std > 5.0, "{stats:?}");
}

#[test]
fn test_de_pareto_front() {
    let model = model_fn(|ctx: &mut TraceContext<'_>| {
        let x = ctx.continuous("x", (), (-1.0, 3.0))?;
        ctx.minimize(x.value().powi(2))?;
        ctx.minimize((x.value() - 2.0).powi(2))
    });
    let config = SearchConfig::new(Algorithm::De(DeConfig::default()))
        .with_population_size(30)
        .with_iterations(60)
        .with_pareto_capacity(20)
        .with_seed(4);
    let result = SearchRunner::run(&model, &config).unwrap();

    assert!(result.multi_objective);
    assert!(!result.candidates.is_empty());
    assert!(result.candidates.len() <= 20);
    let directions = [Direction::Minimize, Direction::Minimize];
    for a in &result.candidates {
        let x = a.solution.value("x").unwrap();
        assert!((-0.2..=2.2).contains(&x), "x = {x} is off the front");
        for b in &result.candidates {
            assert!(!dominates(&a.reward, &b.reward, &directions));
        }
    }
    let firsts: Vec<f64> = result.candidates.iter().map(|c| c.reward[0]).collect();
    assert!(firsts.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_divergent_model_is_reported() {
    let model = model_fn(|ctx: &mut TraceContext<'_>| {
        let x = ctx.continuous("x", (), (0.0, 1.0))?;
        if ctx.mode() == Mode::Evaluate {
            ctx.continuous("late", (), (0.0, 1.0))?;
        }
        ctx.minimize(x.value())
    });
    let err = SearchRunner::run(&model, &SearchConfig::default().with_seed(2)).unwrap_err();

    assert_eq!(err.iteration(), Some(0));
    match err {
        HeurError::Evaluation { source, .. } => {
            assert!(matches!(*source, HeurError::Schema(SchemaError::Divergent { .. })));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_model_error_carries_iteration() {
    let evaluations = AtomicUsize::new(0);
    let model = model_fn(|ctx: &mut TraceContext<'_>| {
        let x = ctx.continuous("x", (), (0.0, 1.0))?;
        if ctx.mode() == Mode::Evaluate && evaluations.fetch_add(1, Ordering::SeqCst) >= 2 {
            return Err(HeurError::model("solver backend unavailable"));
        }
        ctx.minimize(x.value())
    });
    let config = SearchConfig::default().with_iterations(10).with_seed(6);
    let err = SearchRunner::run(&model, &config).unwrap_err();

    assert_eq!(err.iteration(), Some(2));
    assert!(err.to_string().contains("solver backend unavailable"));
}

#[test]
fn test_failed_repeat_becomes_warning() {
    let evaluations = AtomicUsize::new(0);
    let model = model_fn(|ctx: &mut TraceContext<'_>| {
        let x = ctx.continuous("x", (), (0.0, 10.0))?;
        if ctx.mode() == Mode::Evaluate && evaluations.fetch_add(1, Ordering::SeqCst) == 15 {
            return Err(HeurError::model("transient failure"));
        }
        ctx.minimize(x.value().powi(2))
    });
    let config = SearchConfig::default()
        .with_iterations(10)
        .with_repeats(2)
        .with_parallel(false)
        .with_seed(12);
    let result = SearchRunner::run(&model, &config).unwrap();

    assert_eq!(result.warnings.len(), 1);
    assert!(matches!(
        &result.warnings[0],
        Warning::RepeatFailed { repeat: 1, message } if message.contains("transient failure")
    ));
    assert_eq!(result.evaluations, 50 * 10);
    assert!(result.best().is_some());
}

#[test]
fn test_same_seed_same_result() {
    let config = SearchConfig::default()
        .with_iterations(20)
        .with_repeats(3)
        .with_seed(77);
    let a = SearchRunner::run(&sphere, &config).unwrap();
    let b = SearchRunner::run(&sphere, &config).unwrap();
    assert_eq!(a.candidates, b.candidates);
    assert_eq!(a.report, b.report);
}

#[test]
fn test_options_dictionary_drives_search() {
    let options: Options = [
        ("tabu_tenure", 3.0),
        ("strict", 1.0),
        ("iterations", 30.0),
        ("seed", 4.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let config = SearchConfig::from_options("TS", &options).unwrap();
    assert_eq!(config.iterations, 30);

    let result = SearchRunner::run(&square, &config).unwrap();
    assert_eq!(result.algorithm, "tabu");
    assert!(result.report.get("memory").unwrap() <= 3);

    let mut unknown = options.clone();
    unknown.insert("mutation_rate".into(), 0.5);
    assert!(matches!(
        SearchConfig::from_options("ts", &unknown),
        Err(ConfigError::UnknownOption { .. })
    ));
}
