//! Property-based tests for the codec, fitness and archive invariants.

use proptest::prelude::*;
use u_heurmodel::fitness::FitnessEvaluator;
use u_heurmodel::model::{Bound, SchemaRegistry, Shape, VarKind};
use u_heurmodel::pareto::sorting::dominates;
use u_heurmodel::pareto::ParetoSet;
use u_heurmodel::population::{Agent, Layout, Population, Region};
use u_heurmodel::random::create_rng;
use u_heurmodel::{Direction, Feasibility};

fn kind_of(code: u8) -> (VarKind, Bound) {
    match code % 5 {
        0 => (VarKind::Continuous, Bound::new(-3.0, 7.0)),
        1 => (VarKind::Positive, Bound::new(0.0, 4.0)),
        2 => (VarKind::Integer, Bound::new(0.0, 10.0)),
        3 => (VarKind::Binary, Bound::unit()),
        _ => (VarKind::Sequence, Bound::unit()),
    }
}

fn registry(decls: &[(u8, usize)]) -> SchemaRegistry {
    let mut reg = SchemaRegistry::new();
    for (i, &(code, len)) in decls.iter().enumerate() {
        let (kind, bound) = kind_of(code);
        reg.declare(&format!("v{i}"), kind, Shape::vector(len), bound)
            .unwrap();
    }
    reg
}

proptest! {
    #[test]
    fn spreads_partition_the_chromosome(
        decls in prop::collection::vec((0u8..5, 1usize..6), 1..8)
    ) {
        let reg = registry(&decls);
        let mut next = 0;
        for spec in reg.iter() {
            prop_assert_eq!(spec.spread().start, next);
            prop_assert_eq!(spec.width(), spec.shape.len());
            next = spec.spread().end;
        }
        prop_assert_eq!(next, reg.chromosome_len());
    }

    #[test]
    fn decoded_values_respect_kind(
        decls in prop::collection::vec((0u8..5, 1usize..6), 1..8),
        seed in any::<u64>()
    ) {
        use rand::Rng;
        let reg = registry(&decls);
        let mut rng = create_rng(seed);
        let genes: Vec<f64> = (0..reg.chromosome_len()).map(|_| rng.random::<f64>()).collect();
        let solution = reg.decode(&genes);

        for spec in reg.iter() {
            let var = solution.var(&spec.name).unwrap();
            prop_assert_eq!(var.values.len(), spec.width());
            match spec.kind {
                VarKind::Sequence => {
                    let mut perm = solution.permutation(&spec.name).unwrap();
                    perm.sort_unstable();
                    prop_assert_eq!(perm, (0..spec.width()).collect::<Vec<_>>());
                }
                kind => {
                    for &v in &var.values {
                        prop_assert!(v >= spec.bound.lo && v <= spec.bound.hi);
                        if kind.is_discrete() {
                            prop_assert_eq!(v, v.round());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn encode_inverts_decode(
        units in prop::collection::vec(0.0f64..=1.0, 1..10),
        code in 0u8..4
    ) {
        let (kind, bound) = kind_of(code);
        let values: Vec<f64> = units
            .iter()
            .map(|u| {
                let v = bound.lo + u * bound.width();
                if kind.is_discrete() { v.round() } else { v }
            })
            .collect();

        let mut reg = SchemaRegistry::new();
        reg.declare("x", kind, Shape::vector(values.len()), bound).unwrap();
        let genes = reg.spec(reg.handle_of("x").unwrap()).encode(&values);
        let decoded = reg.decode(&genes);
        for (i, &v) in values.iter().enumerate() {
            prop_assert!((decoded.get("x", &[i]).unwrap() - v).abs() < 1e-9);
        }
    }

    #[test]
    fn larger_violation_never_improves_fitness(
        objective in -100.0f64..100.0,
        coefficient in 0.01f64..1000.0,
        a in 0.0f64..10.0,
        b in 0.0f64..10.0,
        maximize in any::<bool>()
    ) {
        let direction = if maximize { Direction::Maximize } else { Direction::Minimize };
        let eval = FitnessEvaluator::new(coefficient, vec![direction], 1).unwrap();
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let better = eval.fitness(objective, small, direction);
        let worse = eval.fitness(objective, large, direction);
        prop_assert!(!direction.is_better(worse, better));
        prop_assert_eq!(eval.classify(small) == Feasibility::Feasible, small == 0.0);
    }

    #[test]
    fn pareto_members_are_mutually_non_dominated(
        rewards in prop::collection::vec((0.0f64..10.0, 0.0f64..10.0), 1..40),
        capacity in 1usize..10
    ) {
        let directions = vec![Direction::Minimize, Direction::Maximize];
        let mut set = ParetoSet::new(directions.clone(), Some(capacity));
        for (i, (f1, f2)) in rewards.into_iter().enumerate() {
            set.insert(Agent {
                chromosome: vec![i as f64],
                reward: vec![f1, f2],
                status: Feasibility::Unconstrained,
            });
        }
        prop_assert!(!set.is_empty());
        prop_assert!(set.len() <= capacity);
        for a in set.members() {
            for b in set.members() {
                prop_assert!(!dominates(&a.reward, &b.reward, &directions));
            }
        }
    }

    #[test]
    fn clip_keeps_genes_in_unit_interval(
        genes in prop::collection::vec(-5.0f64..5.0, 1..12),
        seed in any::<u64>()
    ) {
        let mut rng = create_rng(seed);
        let layout = Layout::two_phase(genes.len(), 1);
        let mut pop = Population::initialize(3, layout, &[Direction::Minimize], &mut rng);
        for row in 0..pop.rows() {
            pop.chromosome_mut(row, Region::New).copy_from_slice(&genes);
        }
        pop.clip(Region::New);
        for row in 0..pop.rows() {
            prop_assert!(pop.chromosome(row, Region::New).iter().all(|g| (0.0..=1.0).contains(g)));
        }
    }
}
