use hnco::config::{ControllerConfig, FunctionConfig, ModifierConfig, NeighborhoodConfig};
use hnco::functions::{
    AdditiveGaussianNoise, Cache, CallCounter, DecoratedFunctionFactory, Event,
    ExpressionModifier, FunctionArchive, FunctionMapComposition, LeadingOnes, LinearFunction,
    Negation, OnBudgetFunction, OneMax, ProgressTracker, Report, StopOnMaximum, StopOnTarget,
};
use hnco::maps::{LinearMap, Permutation, Translation};
use hnco::{generator, BitMatrix, BitVector, Function, Map, Stop};
use std::sync::Arc;

fn bv(s: &str) -> BitVector {
    s.parse().unwrap()
}

#[test]
fn concrete_functions() {
    let mut one_max = OneMax::new(6);
    assert_eq!(one_max.evaluate(&bv("101101")), Ok(4.0));
    assert_eq!(one_max.maximum(), Some(6.0));

    let mut leading_ones = LeadingOnes::new(6);
    assert_eq!(leading_ones.evaluate(&bv("110111")), Ok(2.0));
    assert_eq!(leading_ones.evaluate(&bv("111111")), Ok(6.0));

    let mut linear = LinearFunction::new(vec![1.0, -2.0, 0.5]);
    assert_eq!(linear.evaluate(&bv("111")), Ok(-0.5));
    assert_eq!(linear.maximum(), Some(1.5));
}

#[test]
fn incremental_evaluation_matches_full_evaluation() {
    let mut rng = generator(Some(1));
    let mut functions: Vec<Box<dyn Function>> = vec![
        Box::new(OneMax::new(20)),
        Box::new(LinearFunction::random(20, &mut rng)),
        Box::new(Negation::new(Box::new(LinearFunction::random(20, &mut rng)))),
    ];
    for function in functions.iter_mut() {
        assert!(function.provides_incremental_evaluation());
        for _ in 0..10 {
            let x = BitVector::random(20, &mut rng);
            let value = function.evaluate(&x).unwrap();
            let flipped_bits = [1, 7, 13];
            let mut y = x.clone();
            y.flip_bits(&flipped_bits);
            let expected = function.evaluate(&y).unwrap();
            let actual = function
                .evaluate_incrementally(&x, value, &flipped_bits)
                .unwrap();
            assert!((expected - actual).abs() < 1e-9);
        }
    }
}

#[test]
fn composition_requires_matching_sizes() {
    let mut rng = generator(Some(2));
    let map: Arc<dyn Map> = Arc::new(Translation::random(6, &mut rng));
    assert!(FunctionMapComposition::new(Box::new(OneMax::new(5)), map).is_err());
}

#[test]
fn composition_keeps_maximum_only_for_surjective_maps() {
    let mut rng = generator(Some(3));
    let permutation: Arc<dyn Map> = Arc::new(Permutation::random(8, &mut rng));
    let composition = FunctionMapComposition::new(Box::new(OneMax::new(8)), permutation).unwrap();
    assert_eq!(composition.maximum(), Some(8.0));

    let degenerate: Arc<dyn Map> = Arc::new(LinearMap::new(BitMatrix::zeros(8, 4)));
    let composition = FunctionMapComposition::new(Box::new(OneMax::new(8)), degenerate).unwrap();
    assert_eq!(composition.bv_size(), 4);
    assert_eq!(composition.maximum(), None);
    assert!(StopOnMaximum::new(Box::new(composition)).is_err());
}

#[test]
fn composition_evaluates_the_image() {
    let translation = Translation::new(bv("1100"));
    let map: Arc<dyn Map> = Arc::new(translation);
    let mut composition = FunctionMapComposition::new(Box::new(OneMax::new(4)), map).unwrap();
    assert_eq!(composition.evaluate(&bv("1100")), Ok(0.0));
    assert_eq!(composition.evaluate(&bv("0011")), Ok(4.0));
}

#[test]
fn expression_and_negation() {
    let mut squared = ExpressionModifier::new(Box::new(OneMax::new(4)), "x^2 + 1").unwrap();
    assert_eq!(squared.evaluate(&bv("1110")), Ok(10.0));
    assert!(ExpressionModifier::new(Box::new(OneMax::new(4)), "x +").is_err());

    let mut negation = Negation::new(Box::new(OneMax::new(4)));
    assert_eq!(negation.evaluate(&bv("1110")), Ok(-3.0));
}

#[test]
fn gaussian_noise_rejects_negative_deviation() {
    let rng = generator(Some(4));
    assert!(AdditiveGaussianNoise::new(Box::new(OneMax::new(4)), -1.0, rng).is_err());
}

#[test]
fn gaussian_noise_is_reproducible() {
    let x = bv("1010");
    let mut a = AdditiveGaussianNoise::new(Box::new(OneMax::new(4)), 0.5, generator(Some(5))).unwrap();
    let mut b = AdditiveGaussianNoise::new(Box::new(OneMax::new(4)), 0.5, generator(Some(5))).unwrap();
    for _ in 0..5 {
        assert_eq!(a.evaluate(&x), b.evaluate(&x));
    }
}

#[test]
fn cache_forwards_each_point_once() {
    let counter = CallCounter::new(Box::new(OneMax::new(8)));
    let mut cache = Cache::new(Box::new(counter));
    let x = bv("10101010");
    for _ in 0..4 {
        assert_eq!(cache.evaluate(&x), Ok(4.0));
    }
    assert_eq!(cache.num_evaluations(), 4);
    assert_eq!(cache.num_lookups(), 3);
    assert_eq!(cache.lookup_ratio(), 0.75);
    let report = Report::collect(&cache);
    assert_eq!(report.num_evaluations, Some(1));
    assert_eq!(report.lookup_ratio, Some(0.75));
}

#[test]
fn call_counter_skips_stopped_calls() {
    let inner = OnBudgetFunction::new(Box::new(OneMax::new(4)), 2);
    let mut counter = CallCounter::new(Box::new(inner));
    let x = bv("0110");
    assert_eq!(counter.evaluate(&x), Ok(2.0));
    assert_eq!(counter.evaluate_incrementally(&x, 2.0, &[0]), Ok(3.0));
    assert_eq!(counter.evaluate(&x), Err(Stop::LastEvaluation));
    assert_eq!(counter.update(&x, 2.0), Err(Stop::LastEvaluation));
    assert_eq!(counter.num_calls(), 2);
}

#[test]
fn budget_allows_exactly_budget_evaluations() {
    let mut function = OnBudgetFunction::new(Box::new(OneMax::new(4)), 5);
    let x = bv("0110");
    for _ in 0..5 {
        assert_eq!(function.evaluate(&x), Ok(2.0));
    }
    assert_eq!(function.evaluate(&x), Err(Stop::LastEvaluation));
    assert_eq!(function.update(&x, 2.0), Err(Stop::LastEvaluation));
    assert_eq!(function.num_calls(), 5);
}

#[test]
fn stop_on_target() {
    let mut function = StopOnTarget::new(Box::new(OneMax::new(4)), 3.0);
    assert_eq!(function.evaluate(&bv("1100")), Ok(2.0));
    assert!(function.trigger().is_none());
    match function.evaluate(&bv("1110")) {
        Err(Stop::TargetReached(solution)) => {
            assert_eq!(solution.point, bv("1110"));
            assert_eq!(solution.value, 3.0);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(function.trigger().map(|s| s.value), Some(3.0));
}

#[test]
fn stop_on_maximum_through_incremental_evaluation() {
    let mut function = StopOnMaximum::new(Box::new(OneMax::new(4))).unwrap();
    let x = bv("1011");
    match function.evaluate_incrementally(&x, 3.0, &[1]) {
        Err(Stop::MaximumReached(solution)) => assert_eq!(solution.point, bv("1111")),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn progress_tracker_records_last_strict_improvement() {
    let mut tracker = ProgressTracker::new(Box::new(OneMax::new(4)));
    for s in ["0000", "1000", "0100", "1100", "0000", "0011"] {
        tracker.evaluate(&bv(s)).unwrap();
    }
    assert_eq!(
        tracker.last_improvement(),
        Some(Event {
            num_evaluations: 4,
            value: 2.0
        })
    );
    assert_eq!(tracker.num_calls(), 6);
}

#[test]
fn progress_tracker_replays_identically() {
    let mut rng = generator(Some(10));
    let points: Vec<BitVector> = (0..50).map(|_| BitVector::random(12, &mut rng)).collect();
    let weights = LinearFunction::random(12, &mut rng);
    let records: Vec<Option<Event>> = (0..2)
        .map(|_| {
            let mut tracker = ProgressTracker::new(Box::new(weights.clone()));
            for x in &points {
                tracker.evaluate(x).unwrap();
            }
            tracker.last_improvement()
        })
        .collect();
    assert!(records[0].is_some());
    assert_eq!(records[0], records[1]);
}

#[test]
fn progress_tracker_counts_the_stopping_evaluation() {
    let tracker = ProgressTracker::new(Box::new(OneMax::new(4)));
    let mut function = StopOnMaximum::new(Box::new(tracker)).unwrap();
    assert_eq!(function.evaluate(&bv("0111")), Ok(3.0));
    assert!(function.evaluate(&bv("1111")).is_err());
    let report = Report::collect(&function);
    assert_eq!(report.num_evaluations, Some(2));
    assert_eq!(
        report.last_improvement,
        Some(Event {
            num_evaluations: 2,
            value: 4.0
        })
    );
}

fn factory_with(
    config: &FunctionConfig,
    controllers: ControllerConfig,
) -> DecoratedFunctionFactory<'_> {
    DecoratedFunctionFactory::new(config, None, ModifierConfig::default(), controllers, 42).unwrap()
}

#[test]
fn cache_inside_budget_counts_lookups() {
    let config = FunctionConfig::OneMax { size: 8 };
    let factory = factory_with(
        &config,
        ControllerConfig {
            budget: 3,
            cache: true,
            cache_budget: true,
            ..ControllerConfig::default()
        },
    );
    let mut functions = factory.make_functions(1).unwrap();
    let x = bv("11110000");
    for _ in 0..3 {
        assert_eq!(functions[0].evaluate(&x), Ok(4.0));
    }
    assert_eq!(functions[0].evaluate(&x), Err(Stop::LastEvaluation));
}

#[test]
fn budget_inside_cache_counts_distinct_points() {
    let config = FunctionConfig::OneMax { size: 8 };
    let factory = factory_with(
        &config,
        ControllerConfig {
            budget: 3,
            cache: true,
            cache_budget: false,
            ..ControllerConfig::default()
        },
    );
    let mut functions = factory.make_functions(1).unwrap();
    let x = bv("11110000");
    for _ in 0..10 {
        assert_eq!(functions[0].evaluate(&x), Ok(4.0));
    }
    assert_eq!(functions[0].evaluate(&bv("11111000")), Ok(5.0));
    assert_eq!(functions[0].evaluate(&bv("11111100")), Ok(6.0));
    assert_eq!(
        functions[0].evaluate(&bv("11111110")),
        Err(Stop::LastEvaluation)
    );
}

#[test]
fn factory_rejects_stop_on_maximum_without_maximum() {
    let config = FunctionConfig::OneMax { size: 8 };
    let modifiers = ModifierConfig {
        additive_gaussian_noise: Some(1.0),
        ..ModifierConfig::default()
    };
    let controllers = ControllerConfig {
        stop_on_maximum: true,
        ..ControllerConfig::default()
    };
    let factory = DecoratedFunctionFactory::new(&config, None, modifiers, controllers, 7).unwrap();
    assert!(factory.make_functions(1).is_err());
}

#[test]
fn prior_noise_radius_is_checked_against_the_function_size() {
    let config = FunctionConfig::OneMax { size: 4 };
    let with_noise = |radius| ModifierConfig {
        prior_noise: Some(NeighborhoodConfig::HammingBall { radius }),
        ..ModifierConfig::default()
    };
    let factory = DecoratedFunctionFactory::new(
        &config,
        None,
        with_noise(6),
        ControllerConfig::default(),
        9,
    )
    .unwrap();
    assert!(factory.make_functions(1).is_err());
    let factory = DecoratedFunctionFactory::new(
        &config,
        None,
        with_noise(4),
        ControllerConfig::default(),
        9,
    )
    .unwrap();
    let mut functions = factory.make_functions(1).unwrap();
    let value = functions[0].evaluate(&bv("0000")).unwrap();
    assert!((1.0..=4.0).contains(&value));
}

#[test]
fn helper_functions_compute_the_same_function() {
    let config = FunctionConfig::Linear {
        size: Some(16),
        weights: None,
    };
    let factory = factory_with(&config, ControllerConfig::default());
    let mut functions = factory.make_functions(3).unwrap();
    let mut rng = generator(Some(8));
    for _ in 0..10 {
        let x = BitVector::random(16, &mut rng);
        let value = functions[0].evaluate(&x).unwrap();
        assert_eq!(functions[1].evaluate(&x), Ok(value));
        assert_eq!(functions[2].evaluate(&x), Ok(value));
    }
}

#[test]
fn saved_functions_load_with_the_same_values() {
    let mut rng = generator(Some(9));
    let function = LinearFunction::random(12, &mut rng);
    let path = std::env::temp_dir().join(format!("hnco-{}-function.json", std::process::id()));
    FunctionArchive::Linear(function.clone()).save(&path).unwrap();
    let mut loaded = FunctionArchive::load(&path).unwrap().into_function();
    std::fs::remove_file(&path).unwrap();
    let mut function = function;
    for _ in 0..10 {
        let x = BitVector::random(12, &mut rng);
        assert_eq!(loaded.evaluate(&x), function.evaluate(&x));
    }
}
