//! 进化算法

use super::population::{make_thread_pool, Population};
use super::{
    run_iterations, Algorithm, BestSolution, Comparison, IterativeAlgorithm, RandomLocalSearch,
    Solution,
};
use crate::bit_vector::Generator;
use crate::error::{Error, Stop};
use crate::functions::Function;
use crate::neighborhoods::{Neighborhood, StandardBitMutation};
use rand::Rng;
use rayon::ThreadPool;
use tracing::debug;

/// (1+1) 进化算法
///
/// 等价于以标准位变异为邻域、不严格比较、耐心无限的随机局部搜索。
pub struct OnePlusOneEa {
    search: RandomLocalSearch,
}

impl OnePlusOneEa {
    /// expected_flips 是每次变异期望翻转的位数，常用的取值为 1，即变异率 1/n
    pub fn new(
        n: usize,
        expected_flips: f64,
        allow_no_mutation: bool,
        incremental_evaluation: bool,
    ) -> Result<Self, Error> {
        let mutation = StandardBitMutation::with_expected_flips(expected_flips)?
            .allow_no_mutation(allow_no_mutation);
        let search = RandomLocalSearch::new(n, Box::new(mutation))
            .with_comparison(Comparison::NonStrict)
            .with_patience(0)
            .with_incremental_evaluation(incremental_evaluation);
        Ok(Self { search })
    }

    pub fn with_num_iterations(mut self, num_iterations: usize) -> Self {
        self.search = self.search.with_num_iterations(num_iterations);
        self
    }
}

impl Algorithm for OnePlusOneEa {
    fn bv_size(&self) -> usize {
        self.search.bv_size()
    }

    fn maximize(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        self.search.maximize(functions, rng)
    }

    fn finalize(&mut self) {
        self.search.finalize();
    }

    fn solution(&self) -> &Solution {
        self.search.solution()
    }
}

/// (μ+λ) 进化算法
///
/// 每一代从父代中均匀地选 λ 个个体做标准位变异，再从父代和子代中选出最好的 μ 个。
/// 有多个函数时，种群在固定大小的线程池中并行求值。
pub struct MuPlusLambdaEa {
    parents: Population,
    offspring: Population,
    mutation: StandardBitMutation,
    best: BestSolution,
    pool: ThreadPool,
    num_iterations: usize,
    log: bool,
}

impl MuPlusLambdaEa {
    pub fn new(
        n: usize,
        mu: usize,
        lambda: usize,
        expected_flips: f64,
        allow_no_mutation: bool,
        num_threads: usize,
    ) -> Result<Self, Error> {
        if mu == 0 || lambda == 0 {
            return Err("μ 和 λ 都必须为正数".into());
        }
        let mutation = StandardBitMutation::with_expected_flips(expected_flips)?
            .allow_no_mutation(allow_no_mutation);
        Ok(Self {
            parents: Population::new(mu, n),
            offspring: Population::new(lambda, n),
            mutation,
            best: BestSolution::new(n, Comparison::Strict),
            pool: make_thread_pool(num_threads.max(1))?,
            num_iterations: 0,
            log: false,
        })
    }

    pub fn with_num_iterations(mut self, num_iterations: usize) -> Self {
        self.num_iterations = num_iterations;
        self
    }

    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    pub fn parents(&self) -> &Population {
        &self.parents
    }

    fn update_best(&mut self) {
        let (point, value) = self.parents.best(0);
        self.best.update(point, value);
    }
}

impl IterativeAlgorithm for MuPlusLambdaEa {
    fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    fn init(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        self.parents.random(rng);
        self.parents.evaluate_in_parallel(functions, &self.pool)?;
        self.parents.sort();
        self.update_best();
        Ok(())
    }

    fn iterate(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        for i in 0..self.offspring.len() {
            let parent = rng.random_range(0..self.parents.len());
            let child = self.offspring.get_mut(i);
            child.clone_from(self.parents.get(parent));
            self.mutation.mutate(child, rng);
        }
        self.offspring.evaluate_in_parallel(functions, &self.pool)?;
        self.offspring.sort();
        self.parents.plus_selection(&self.offspring);
        self.update_best();
        Ok(())
    }

    fn something_to_log(&self) -> bool {
        self.log
    }

    fn log(&self, iteration: usize) {
        debug!("第 {iteration} 代，最好值 {}", self.parents.best(0).1);
    }
}

impl Algorithm for MuPlusLambdaEa {
    fn bv_size(&self) -> usize {
        self.best.point().len()
    }

    fn maximize(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        run_iterations(self, functions, rng)
    }

    fn solution(&self) -> &Solution {
        self.best.solution()
    }
}
