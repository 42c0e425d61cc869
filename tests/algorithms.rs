use hnco::algorithms::{
    make_algorithm, Comparison, FirstAscentHillClimbing, MuPlusLambdaEa, OnePlusOneEa,
    RandomLocalSearch, RandomSearch, SteepestAscentHillClimbing,
};
use hnco::config::{
    AlgorithmConfig, ControllerConfig, FunctionConfig, MapConfig, MapType, ModifierConfig,
    NeighborhoodConfig,
};
use hnco::functions::DecoratedFunctionFactory;
use hnco::neighborhoods::{HammingBallIterator, SingleBitFlip, SingleBitFlipIterator};
use hnco::search::{self, SearchReport, StopReason};
use hnco::{generator, Algorithm, BitVector, Function, Map};

fn make_functions(
    config: &FunctionConfig,
    controllers: ControllerConfig,
    num_threads: usize,
) -> Vec<Box<dyn Function>> {
    DecoratedFunctionFactory::new(config, None, ModifierConfig::default(), controllers, 2024)
        .unwrap()
        .make_functions(num_threads)
        .unwrap()
}

fn run(algorithm: &mut dyn Algorithm, functions: &mut [Box<dyn Function>]) -> SearchReport {
    let mut rng = generator(Some(1));
    search::run(algorithm, functions, &mut rng)
}

fn one_max(size: usize) -> FunctionConfig {
    FunctionConfig::OneMax { size }
}

#[test]
fn random_local_search_solves_one_max() {
    let mut functions = make_functions(
        &one_max(8),
        ControllerConfig {
            budget: 100,
            stop_on_maximum: true,
            ..ControllerConfig::default()
        },
        1,
    );
    let mut algorithm = RandomLocalSearch::new(8, Box::new(SingleBitFlip::new()))
        .with_comparison(Comparison::Strict)
        .with_patience(0);
    let report = run(&mut algorithm, &mut functions);
    assert_eq!(report.stop, StopReason::MaximumReached);
    assert!(report.success);
    assert_eq!(report.solution.point, BitVector::ones(8));
    assert_eq!(report.solution.value, 8.0);
    let num_evaluations = report.report.num_evaluations.unwrap();
    assert!(num_evaluations <= 100);
    let last_improvement = report.report.last_improvement.unwrap();
    assert_eq!(last_improvement.value, 8.0);
    assert_eq!(last_improvement.num_evaluations, num_evaluations);
}

#[test]
fn incremental_local_search_solves_one_max() {
    let mut functions = make_functions(
        &one_max(16),
        ControllerConfig {
            stop_on_maximum: true,
            ..ControllerConfig::default()
        },
        1,
    );
    let mut algorithm = RandomLocalSearch::new(16, Box::new(SingleBitFlip::new()))
        .with_patience(0)
        .with_incremental_evaluation(true);
    let report = run(&mut algorithm, &mut functions);
    assert_eq!(report.stop, StopReason::MaximumReached);
    assert_eq!(report.solution.point, BitVector::ones(16));
}

#[test]
fn impatient_local_search_stops_at_local_maximum() {
    let mut functions = make_functions(&one_max(6), ControllerConfig::default(), 1);
    let mut algorithm = RandomLocalSearch::new(6, Box::new(SingleBitFlip::new()))
        .with_comparison(Comparison::Strict)
        .with_patience(10);
    let report = run(&mut algorithm, &mut functions);
    assert_eq!(report.stop, StopReason::LocalMaximum);
    assert!(!report.success);
    assert_eq!(
        report.solution.value,
        report.solution.point.hamming_weight() as f64
    );
    assert_eq!(algorithm.solution(), &report.solution);
}

#[test]
fn exhausted_budget_keeps_a_consistent_solution() {
    let mut functions = make_functions(
        &one_max(20),
        ControllerConfig {
            budget: 50,
            ..ControllerConfig::default()
        },
        1,
    );
    let mut algorithm = RandomSearch::new(20);
    let report = run(&mut algorithm, &mut functions);
    assert_eq!(report.stop, StopReason::LastEvaluation);
    assert_eq!(report.report.num_evaluations, Some(50));
    assert_eq!(
        report.solution.value,
        report.solution.point.hamming_weight() as f64
    );
}

#[test]
fn local_search_with_budget_syncs_its_point() {
    let mut functions = make_functions(
        &one_max(30),
        ControllerConfig {
            budget: 40,
            ..ControllerConfig::default()
        },
        1,
    );
    let mut algorithm = RandomLocalSearch::new(30, Box::new(SingleBitFlip::new())).with_patience(0);
    let report = run(&mut algorithm, &mut functions);
    assert_eq!(report.stop, StopReason::LastEvaluation);
    assert_eq!(
        report.solution.value,
        report.solution.point.hamming_weight() as f64
    );
}

#[test]
fn finite_iterations_complete() {
    let mut functions = make_functions(&one_max(10), ControllerConfig::default(), 1);
    let mut algorithm = RandomSearch::new(10).with_num_iterations(5);
    let report = run(&mut algorithm, &mut functions);
    assert_eq!(report.stop, StopReason::Completed);
    assert_eq!(report.report.num_evaluations, Some(6));
}

#[test]
fn hill_climbers_reach_the_maximum_of_one_max() {
    let climbers: Vec<Box<dyn Algorithm>> = vec![
        Box::new(FirstAscentHillClimbing::new(
            10,
            Box::new(SingleBitFlipIterator::new(10)),
        )),
        Box::new(SteepestAscentHillClimbing::new(
            10,
            Box::new(SingleBitFlipIterator::new(10)),
        )),
        Box::new(SteepestAscentHillClimbing::new(
            10,
            Box::new(HammingBallIterator::new(10, 2).unwrap()),
        )),
    ];
    for mut algorithm in climbers {
        let mut functions = make_functions(&one_max(10), ControllerConfig::default(), 1);
        let report = run(algorithm.as_mut(), &mut functions);
        assert_eq!(report.stop, StopReason::LocalMaximum);
        assert_eq!(report.solution.point, BitVector::ones(10));
        assert_eq!(report.solution.value, 10.0);
    }
}

#[test]
fn one_plus_one_ea_solves_one_max() {
    let mut functions = make_functions(
        &one_max(20),
        ControllerConfig {
            stop_on_maximum: true,
            ..ControllerConfig::default()
        },
        1,
    );
    let mut algorithm = OnePlusOneEa::new(20, 1.0, false, true).unwrap();
    let report = run(&mut algorithm, &mut functions);
    assert_eq!(report.stop, StopReason::MaximumReached);
    assert_eq!(report.solution.value, 20.0);
}

#[test]
fn parallel_evaluation_respects_the_budget_exactly() {
    let mut functions = make_functions(
        &one_max(40),
        ControllerConfig {
            budget: 250,
            ..ControllerConfig::default()
        },
        2,
    );
    assert_eq!(functions.len(), 2);
    let mut algorithm = MuPlusLambdaEa::new(40, 5, 20, 1.0, false, 2).unwrap();
    let report = run(&mut algorithm, &mut functions);
    assert_eq!(report.stop, StopReason::LastEvaluation);
    assert_eq!(report.report.num_evaluations, Some(250));
    assert_eq!(
        report.solution.value,
        report.solution.point.hamming_weight() as f64
    );
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let config = FunctionConfig::Linear {
        size: Some(24),
        weights: None,
    };
    let controllers = ControllerConfig {
        budget: 500,
        ..ControllerConfig::default()
    };
    let mut reports = vec![];
    for num_threads in [1, 3] {
        let mut functions = make_functions(&config, controllers.clone(), num_threads);
        let mut algorithm = MuPlusLambdaEa::new(24, 4, 12, 1.0, false, num_threads).unwrap();
        reports.push(run(&mut algorithm, &mut functions));
    }
    assert_eq!(reports[0].solution, reports[1].solution);
    assert_eq!(reports[0].report.num_evaluations, Some(500));
    assert_eq!(reports[1].report.num_evaluations, Some(500));
}

#[test]
fn search_through_a_map() {
    let config = one_max(12);
    let map = MapConfig {
        r#type: MapType::TsAffine,
        input_size: None,
        surjective: false,
        length: None,
        sampling_mode: None,
        path: None,
    };
    let factory = DecoratedFunctionFactory::new(
        &config,
        Some(&map),
        ModifierConfig::default(),
        ControllerConfig {
            stop_on_maximum: true,
            budget: 10_000,
            ..ControllerConfig::default()
        },
        5,
    )
    .unwrap();
    let mut functions = factory.make_functions(1).unwrap();
    let mut algorithm = make_algorithm(
        &AlgorithmConfig::RandomLocalSearch {
            neighborhood: NeighborhoodConfig::SingleBitFlip,
            strict: false,
            patience: 0,
            incremental_evaluation: false,
            num_iterations: 0,
            log: false,
        },
        12,
        1,
    )
    .unwrap();
    let report = run(algorithm.as_mut(), &mut functions);
    assert!(matches!(
        report.stop,
        StopReason::MaximumReached | StopReason::LastEvaluation
    ));
    let image = factory.map().unwrap().map(&report.solution.point);
    assert_eq!(image.hamming_weight() as f64, report.solution.value);
}

#[test]
fn algorithms_from_configuration() {
    let configs = [
        "type: random_search\nnum_iterations: 10",
        "type: random_local_search\nneighborhood:\n  type: hamming_ball\n  radius: 2",
        "type: first_ascent_hill_climbing",
        "type: steepest_ascent_hill_climbing\niterator:\n  type: hamming_sphere\n  radius: 2",
        "type: one_plus_one_ea\nmutation_rate: 2.0",
        "type: mu_plus_lambda_ea\nmu: 3\nlambda: 6",
    ];
    for config in configs {
        let config: AlgorithmConfig = serde_yaml::from_str(config).unwrap();
        let algorithm = make_algorithm(&config, 8, 1).unwrap();
        assert_eq!(algorithm.bv_size(), 8);
    }
    let config: AlgorithmConfig =
        serde_yaml::from_str("type: mu_plus_lambda_ea\nmu: 0\nlambda: 6").unwrap();
    assert!(make_algorithm(&config, 8, 1).is_err());
}

#[test]
fn radius_longer_than_the_bit_vector_is_rejected() {
    let configs = [
        "type: random_local_search\nneighborhood:\n  type: hamming_sphere\n  radius: 10",
        "type: random_local_search\nneighborhood:\n  type: hamming_ball\n  radius: 9",
        "type: steepest_ascent_hill_climbing\niterator:\n  type: hamming_ball\n  radius: 9",
    ];
    for config in configs {
        let config: AlgorithmConfig = serde_yaml::from_str(config).unwrap();
        assert!(make_algorithm(&config, 8, 1).is_err());
    }
    let config: AlgorithmConfig = serde_yaml::from_str(
        "type: random_local_search\nneighborhood:\n  type: hamming_sphere\n  radius: 8",
    )
    .unwrap();
    assert!(make_algorithm(&config, 8, 1).is_ok());
}
