//! 局部搜索

use super::{run_iterations, Algorithm, BestSolution, Comparison, IterativeAlgorithm, Solution};
use crate::bit_vector::{BitVector, Generator};
use crate::error::Stop;
use crate::functions::Function;
use crate::neighborhoods::{Neighborhood, NeighborhoodIterator};
use rand::seq::IndexedRandom;
use tracing::debug;

/// 随机局部搜索
///
/// 每次迭代在邻域中随机提出一个候选点，按比较方式决定接受或放弃。
/// 连续放弃的次数达到 patience 时返回 `Stop::LocalMaximum`；patience 为 0 时不限。
/// 记录的解的函数值随时与邻域原点保持一致，位向量本身只在 finalize 或停止时同步。
pub struct RandomLocalSearch {
    neighborhood: Box<dyn Neighborhood>,
    best: BestSolution,
    starting_point: Option<BitVector>,
    patience: usize,
    num_failures: usize,
    incremental_evaluation: bool,
    num_iterations: usize,
    log: bool,
}

impl RandomLocalSearch {
    pub fn new(n: usize, neighborhood: Box<dyn Neighborhood>) -> Self {
        Self {
            neighborhood,
            best: BestSolution::new(n, Comparison::NonStrict),
            starting_point: None,
            patience: 50,
            num_failures: 0,
            incremental_evaluation: false,
            num_iterations: 0,
            log: false,
        }
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        let n = self.best.point().len();
        self.best = BestSolution::new(n, comparison);
        self
    }

    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    pub fn with_incremental_evaluation(mut self, incremental_evaluation: bool) -> Self {
        self.incremental_evaluation = incremental_evaluation;
        self
    }

    pub fn with_num_iterations(mut self, num_iterations: usize) -> Self {
        self.num_iterations = num_iterations;
        self
    }

    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// 从给定的点出发，而不是随机初始化
    pub fn with_starting_point(mut self, starting_point: BitVector) -> Self {
        assert_eq!(starting_point.len(), self.best.point().len());
        self.starting_point = Some(starting_point);
        self
    }

    pub fn num_failures(&self) -> usize {
        self.num_failures
    }

    pub fn neighborhood(&self) -> &dyn Neighborhood {
        self.neighborhood.as_ref()
    }
}

impl IterativeAlgorithm for RandomLocalSearch {
    fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    fn init(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        let function = functions[0].as_mut();
        match &self.starting_point {
            Some(x) => {
                let value = function.evaluate(x)?;
                self.best.set_solution(x, value);
            }
            None => self.best.random_solution(function, rng)?,
        }
        self.neighborhood.set_origin(self.best.point());
        self.num_failures = 0;
        Ok(())
    }

    fn iterate(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        let function = functions[0].as_mut();
        self.neighborhood.propose(rng);
        let value = if self.incremental_evaluation && function.provides_incremental_evaluation() {
            function.evaluate_incrementally(
                self.neighborhood.origin(),
                self.best.value(),
                self.neighborhood.flipped_bits(),
            )?
        } else {
            function.evaluate(self.neighborhood.candidate())?
        };
        if self.best.comparison().accepts(value, self.best.value()) {
            self.neighborhood.keep();
            self.best.set_value(value);
            self.num_failures = 0;
        } else {
            self.neighborhood.forget();
            self.num_failures += 1;
            if self.patience > 0 && self.num_failures >= self.patience {
                self.best.set_point(self.neighborhood.origin());
                return Err(Stop::LocalMaximum(self.best.solution().clone()));
            }
        }
        Ok(())
    }

    fn something_to_log(&self) -> bool {
        self.log
    }

    fn log(&self, iteration: usize) {
        debug!(
            "第 {iteration} 次迭代，当前值 {}，连续失败 {} 次",
            self.best.value(),
            self.num_failures
        );
    }
}

impl Algorithm for RandomLocalSearch {
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

    /// 把邻域的原点同步为记录的解
    fn finalize(&mut self) {
        if !self.neighborhood.origin().is_empty() {
            self.best.set_point(self.neighborhood.origin());
        }
    }

    fn solution(&self) -> &Solution {
        self.best.solution()
    }
}

/// 首次上升爬山：枚举邻域，遇到第一个严格更好的邻居就移动过去
pub struct FirstAscentHillClimbing {
    iterator: Box<dyn NeighborhoodIterator>,
    best: BestSolution,
    num_iterations: usize,
}

impl FirstAscentHillClimbing {
    pub fn new(n: usize, iterator: Box<dyn NeighborhoodIterator>) -> Self {
        Self {
            iterator,
            best: BestSolution::new(n, Comparison::Strict),
            num_iterations: 0,
        }
    }

    pub fn with_num_iterations(mut self, num_iterations: usize) -> Self {
        self.num_iterations = num_iterations;
        self
    }
}

impl IterativeAlgorithm for FirstAscentHillClimbing {
    fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    fn init(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        self.best.random_solution(functions[0].as_mut(), rng)
    }

    fn iterate(
        &mut self,
        functions: &mut [Box<dyn Function>],
        _rng: &mut Generator,
    ) -> Result<(), Stop> {
        let function = functions[0].as_mut();
        self.iterator.set_origin(self.best.point());
        self.iterator.init();
        while self.iterator.has_next() {
            let value = function.evaluate(self.iterator.next())?;
            if value > self.best.value() {
                self.best.set_solution(self.iterator.candidate(), value);
                return Ok(());
            }
        }
        Err(Stop::LocalMaximum(self.best.solution().clone()))
    }
}

impl Algorithm for FirstAscentHillClimbing {
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

/// 最陡上升爬山：枚举整个邻域，移动到最好的邻居，并列时随机选一个
pub struct SteepestAscentHillClimbing {
    iterator: Box<dyn NeighborhoodIterator>,
    best: BestSolution,
    candidates: Vec<BitVector>,
    num_iterations: usize,
}

impl SteepestAscentHillClimbing {
    pub fn new(n: usize, iterator: Box<dyn NeighborhoodIterator>) -> Self {
        Self {
            iterator,
            best: BestSolution::new(n, Comparison::Strict),
            candidates: Vec::new(),
            num_iterations: 0,
        }
    }

    pub fn with_num_iterations(mut self, num_iterations: usize) -> Self {
        self.num_iterations = num_iterations;
        self
    }
}

impl IterativeAlgorithm for SteepestAscentHillClimbing {
    fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    fn init(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        self.best.random_solution(functions[0].as_mut(), rng)
    }

    fn iterate(
        &mut self,
        functions: &mut [Box<dyn Function>],
        rng: &mut Generator,
    ) -> Result<(), Stop> {
        let function = functions[0].as_mut();
        self.iterator.set_origin(self.best.point());
        self.iterator.init();
        self.candidates.clear();
        let mut max = f64::NEG_INFINITY;
        while self.iterator.has_next() {
            let value = function.evaluate(self.iterator.next())?;
            if value > max {
                max = value;
                self.candidates.clear();
            }
            if value == max {
                self.candidates.push(self.iterator.candidate().clone());
            }
        }
        if max > self.best.value() {
            if let Some(point) = self.candidates.choose(rng) {
                self.best.set_solution(point, max);
                return Ok(());
            }
        }
        Err(Stop::LocalMaximum(self.best.solution().clone()))
    }
}

impl Algorithm for SteepestAscentHillClimbing {
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
