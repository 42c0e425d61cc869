use criterion::{criterion_group, criterion_main, Criterion};
use hnco::algorithms::RandomLocalSearch;
use hnco::functions::{LinearFunction, OnBudgetFunction};
use hnco::maps::{LinearMap, SamplingMode, TsAffineMap};
use hnco::neighborhoods::SingleBitFlip;
use hnco::{generator, search, BitVector, Function, Map};

fn 求值(c: &mut Criterion) {
    let mut rng = generator(Some(0));
    let mut function = LinearFunction::random(1000, &mut rng);
    let x = BitVector::random(1000, &mut rng);
    c.bench_function("线性函数完整求值", |b| b.iter(|| function.evaluate(&x)));
    let value = function.evaluate(&x).unwrap();
    c.bench_function("线性函数增量求值", |b| {
        b.iter(|| function.evaluate_incrementally(&x, value, &[17]))
    });
}

fn 映射(c: &mut Criterion) {
    let mut rng = generator(Some(0));
    let x = BitVector::random(500, &mut rng);
    let linear = LinearMap::random(500, 500, false, &mut rng).unwrap();
    c.bench_function("稠密线性映射", |b| b.iter(|| linear.map(&x)));
    let ts = TsAffineMap::random(500, 500, SamplingMode::Unconstrained, &mut rng);
    c.bench_function("初等变换序列仿射映射", |b| b.iter(|| ts.map(&x)));
    c.bench_function("矩阵的秩", |b| b.iter(|| linear.matrix().compute_rank()));
}

fn 局部搜索(c: &mut Criterion) {
    c.bench_function("随机局部搜索一万次求值", |b| {
        b.iter(|| {
            let mut rng = generator(Some(0));
            let inner = LinearFunction::random(200, &mut rng);
            let mut functions: Vec<Box<dyn Function>> =
                vec![Box::new(OnBudgetFunction::new(Box::new(inner), 10_000))];
            let mut algorithm = RandomLocalSearch::new(200, Box::new(SingleBitFlip::new()))
                .with_patience(0)
                .with_incremental_evaluation(true);
            search::run(&mut algorithm, &mut functions, &mut rng)
        })
    });
}

criterion_group!(benches, 求值, 映射, 局部搜索);
criterion_main!(benches);
