//! 优化算法
//!
//! 每个算法都记录迄今为止最好的解，并通过统一的 `maximize` 入口运行。
//! 迭代式的算法只需实现 `IterativeAlgorithm` 中的 init 和 iterate。
//! 求值返回的 `Stop` 直接用 `?` 向上传递，由搜索驱动统一处理。

use crate::bit_vector::{BitVector, Generator};
use crate::config::AlgorithmConfig;
use crate::error::{Error, Stop};
use crate::functions::Function;
use crate::neighborhoods::{make_iterator, make_neighborhood};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod evolutionary;
pub mod local_search;
pub mod population;
pub mod random_search;

pub use evolutionary::{MuPlusLambdaEa, OnePlusOneEa};
pub use local_search::{FirstAscentHillClimbing, RandomLocalSearch, SteepestAscentHillClimbing};
pub use population::Population;
pub use random_search::RandomSearch;

/// 一个点及其函数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub point: BitVector,
    pub value: f64,
}

impl Solution {
    pub fn new(point: BitVector, value: f64) -> Self {
        Self { point, value }
    }
}

/// 接受新解的比较方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// 严格更大才接受
    Strict,
    /// 不小于就接受，允许在平台上移动
    #[default]
    NonStrict,
}

impl Comparison {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Comparison::Strict
        } else {
            Comparison::NonStrict
        }
    }

    pub fn accepts(self, candidate: f64, current: f64) -> bool {
        match self {
            Comparison::Strict => candidate > current,
            Comparison::NonStrict => candidate >= current,
        }
    }
}

/// 算法内部记录的最好解，只能通过更新操作改变
#[derive(Debug, Clone)]
pub struct BestSolution {
    solution: Solution,
    comparison: Comparison,
}

impl BestSolution {
    /// 初始值为 -∞，任何一次求值都会替换它
    pub fn new(n: usize, comparison: Comparison) -> Self {
        Self {
            solution: Solution::new(BitVector::zeros(n), f64::NEG_INFINITY),
            comparison,
        }
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn point(&self) -> &BitVector {
        &self.solution.point
    }

    pub fn value(&self) -> f64 {
        self.solution.value
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// 随机抽取一个点作为初始解
    pub fn random_solution(
        &mut self,
        function: &mut dyn Function,
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        self.solution.point.randomize(rng);
        self.solution.value = function.evaluate(&self.solution.point)?;
        Ok(())
    }

    /// 无条件设置
    pub fn set_solution(&mut self, point: &BitVector, value: f64) {
        self.solution.point.clone_from(point);
        self.solution.value = value;
    }

    pub fn set_value(&mut self, value: f64) {
        self.solution.value = value;
    }

    pub fn set_point(&mut self, point: &BitVector) {
        self.solution.point.clone_from(point);
    }

    /// 按比较方式决定是否替换，返回是否替换
    pub fn update(&mut self, point: &BitVector, value: f64) -> bool {
        if self.comparison.accepts(value, self.solution.value) {
            self.set_solution(point, value);
            true
        } else {
            false
        }
    }

    /// 先求值再按比较方式决定是否替换
    pub fn update_solution(
        &mut self,
        point: &BitVector,
        function: &mut dyn Function,
    ) -> Result<bool, Stop> {
        let value = function.evaluate(point)?;
        Ok(self.update(point, value))
    }
}

/// 所有算法的统一入口
///
/// functions 中每个线程一个函数，它们计算的是同一个目标；只有第一个函数带有控制器。
pub trait Algorithm {
    fn bv_size(&self) -> usize;

    fn maximize(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop>;

    /// 求值被停止条件打断之后，修复记录的解
    fn finalize(&mut self) {}

    fn solution(&self) -> &Solution;
}

/// 迭代式算法：init 之后反复 iterate
pub trait IterativeAlgorithm {
    /// 迭代次数，0 表示一直运行到停止条件出现
    fn num_iterations(&self) -> usize;

    fn init(&mut self, functions: &mut [Box<dyn Function>], rng: &mut Generator)
        -> Result<(), Stop>;

    fn iterate(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop>;

    fn something_to_log(&self) -> bool {
        false
    }

    fn log(&self, iteration: usize) {
        let _ = iteration;
    }
}

/// 迭代式算法的主循环
pub fn run_iterations<A: IterativeAlgorithm + ?Sized>(
    algorithm: &mut A,
    functions: &mut [Box<dyn Function>],
    rng: &mut Generator,
) -> Result<(), Stop> {
    assert!(!functions.is_empty(), "至少需要一个函数");
    algorithm.init(functions, rng)?;
    let num_iterations = algorithm.num_iterations();
    let mut iteration = 0;
    while num_iterations == 0 || iteration < num_iterations {
        algorithm.iterate(functions, rng)?;
        iteration += 1;
        if algorithm.something_to_log() {
            algorithm.log(iteration);
        }
    }
    debug!("完成了 {iteration} 次迭代");
    Ok(())
}

/// 按配置创建算法，n 为位向量的长度
pub fn make_algorithm(
    config: &AlgorithmConfig,
    n: usize,
    num_threads: usize,
) -> Result<Box<dyn Algorithm>, Error> {
    let algorithm: Box<dyn Algorithm> = match config {
        AlgorithmConfig::RandomSearch { num_iterations } => {
            Box::new(RandomSearch::new(n).with_num_iterations(*num_iterations))
        }
        AlgorithmConfig::RandomLocalSearch {
            neighborhood,
            strict,
            patience,
            incremental_evaluation,
            num_iterations,
            log,
        } => Box::new(
            RandomLocalSearch::new(n, make_neighborhood(neighborhood, n)?)
                .with_comparison(Comparison::from_strict(*strict))
                .with_patience(*patience)
                .with_incremental_evaluation(*incremental_evaluation)
                .with_num_iterations(*num_iterations)
                .with_log(*log),
        ),
        AlgorithmConfig::FirstAscentHillClimbing {
            iterator,
            num_iterations,
        } => Box::new(
            FirstAscentHillClimbing::new(n, make_iterator(iterator, n)?)
                .with_num_iterations(*num_iterations),
        ),
        AlgorithmConfig::SteepestAscentHillClimbing {
            iterator,
            num_iterations,
        } => Box::new(
            SteepestAscentHillClimbing::new(n, make_iterator(iterator, n)?)
                .with_num_iterations(*num_iterations),
        ),
        AlgorithmConfig::OnePlusOneEa {
            mutation_rate,
            allow_no_mutation,
            incremental_evaluation,
            num_iterations,
        } => Box::new(
            OnePlusOneEa::new(
                n,
                mutation_rate.unwrap_or(1.0),
                *allow_no_mutation,
                *incremental_evaluation,
            )?
            .with_num_iterations(*num_iterations),
        ),
        AlgorithmConfig::MuPlusLambdaEa {
            mu,
            lambda,
            mutation_rate,
            allow_no_mutation,
            num_iterations,
            log,
        } => Box::new(
            MuPlusLambdaEa::new(
                n,
                *mu,
                *lambda,
                mutation_rate.unwrap_or(1.0),
                *allow_no_mutation,
                num_threads,
            )?
            .with_num_iterations(*num_iterations)
            .with_log(*log),
        ),
    };
    Ok(algorithm)
}
