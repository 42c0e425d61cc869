use super::{run_iterations, Algorithm, BestSolution, Comparison, IterativeAlgorithm, Solution};
use crate::bit_vector::{BitVector, Generator};
use crate::error::Stop;
use crate::functions::Function;

/// 随机搜索：每次迭代独立均匀地抽取一个点
pub struct RandomSearch {
    best: BestSolution,
    candidate: BitVector,
    num_iterations: usize,
}

impl RandomSearch {
    pub fn new(n: usize) -> Self {
        Self {
            best: BestSolution::new(n, Comparison::Strict),
            candidate: BitVector::zeros(n),
            num_iterations: 0,
        }
    }

    pub fn with_num_iterations(mut self, num_iterations: usize) -> Self {
        self.num_iterations = num_iterations;
        self
    }
}

impl IterativeAlgorithm for RandomSearch {
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
        self.candidate.randomize(rng);
        self.best
            .update_solution(&self.candidate, functions[0].as_mut())?;
        Ok(())
    }
}

impl Algorithm for RandomSearch {
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
