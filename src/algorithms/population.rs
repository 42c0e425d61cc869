//! 种群以及种群的并行求值
//!
//! 并行求值时第 k 个线程只使用第 k 个函数，各线程之间不共享任何可变状态。
//! 各线程用 `evaluate_safely` 绕过控制器求值，之后在调用线程上按顺序对第一个函数调用 `update`，
//! 这样预算、缓存、进度记录和停止条件看到的求值次数与顺序求值完全一样。

use crate::bit_vector::{BitVector, Generator};
use crate::error::{Error, Stop};
use crate::functions::Function;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct Population {
    bvs: Vec<BitVector>,
    values: Vec<f64>,
    /// 按函数值从大到小排列的下标
    order: Vec<usize>,
}

impl Population {
    pub fn new(size: usize, n: usize) -> Self {
        Self {
            bvs: vec![BitVector::zeros(n); size],
            values: vec![f64::NEG_INFINITY; size],
            order: (0..size).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bvs.is_empty()
    }

    pub fn random(&mut self, rng: &mut Generator) {
        for bv in self.bvs.iter_mut() {
            bv.randomize(rng);
        }
    }

    pub fn get(&self, i: usize) -> &BitVector {
        &self.bvs[i]
    }

    pub fn get_mut(&mut self, i: usize) -> &mut BitVector {
        &mut self.bvs[i]
    }

    pub fn value(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// 排序之后第 rank 好的个体
    pub fn best(&self, rank: usize) -> (&BitVector, f64) {
        let i = self.order[rank];
        (&self.bvs[i], self.values[i])
    }

    pub fn evaluate(&mut self, function: &mut dyn Function) -> Result<(), Stop> {
        for (bv, value) in self.bvs.iter().zip(self.values.iter_mut()) {
            *value = function.evaluate(bv)?;
        }
        Ok(())
    }

    /// 在线程池中并行求值，线程数等于函数的个数
    pub fn evaluate_in_parallel(
        &mut self,
        functions: &mut [Box<dyn Function>],
        pool: &ThreadPool,
    ) -> Result<(), Stop> {
        if functions.len() == 1 || self.bvs.is_empty() {
            return self.evaluate(functions[0].as_mut());
        }
        let chunk_size = self.bvs.len().div_ceil(functions.len());
        let bvs = &self.bvs;
        let values = &mut self.values;
        pool.install(|| {
            functions
                .par_iter_mut()
                .zip(bvs.par_chunks(chunk_size))
                .zip(values.par_chunks_mut(chunk_size))
                .try_for_each(|((function, bvs), values)| {
                    for (bv, value) in bvs.iter().zip(values.iter_mut()) {
                        *value = function.evaluate_safely(bv)?;
                    }
                    Ok::<(), Stop>(())
                })
        })?;
        let primary = functions[0].as_mut();
        for (bv, &value) in self.bvs.iter().zip(self.values.iter()) {
            primary.update(bv, value)?;
        }
        Ok(())
    }

    /// 按函数值从大到小排序，值相同时保持原有顺序
    pub fn sort(&mut self) {
        let values = &self.values;
        self.order
            .sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));
    }

    /// 从父代和子代的并集中选出最好的 len 个作为新的父代，值相同时优先子代
    pub fn plus_selection(&mut self, offspring: &Population) {
        let mut merged: Vec<(f64, &BitVector)> = offspring
            .order
            .iter()
            .map(|&i| (offspring.values[i], &offspring.bvs[i]))
            .chain(self.order.iter().map(|&i| (self.values[i], &self.bvs[i])))
            .collect();
        merged.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        let size = self.len();
        let (values, bvs): (Vec<f64>, Vec<BitVector>) = merged
            .into_iter()
            .take(size)
            .map(|(value, bv)| (value, bv.clone()))
            .unzip();
        self.values = values;
        self.bvs = bvs;
        self.order = (0..size).collect();
    }
}

/// 固定大小的线程池
pub fn make_thread_pool(num_threads: usize) -> Result<ThreadPool, Error> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| Error::from(format!("无法创建线程池：{e}")))
}
