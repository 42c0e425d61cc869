//! 控制器：观察或限制求值，但不改变函数值
//!
//! 控制器通过返回 `Err(Stop)` 终止搜索。并行求值时，辅助线程调用 `evaluate_safely` 绕过控制器，
//! 再由主链条上的 `update` 补记，所以每个控制器都要同时处理 evaluate、evaluate_incrementally
//! 和 update 三条路径。

use super::{Function, Report};
use crate::algorithms::Solution;
use crate::bit_vector::BitVector;
use crate::error::{Error, Stop};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::time::Duration;
use tracing::info;
use web_time::Instant;

/// 统计调用次数
pub struct CallCounter {
    function: Box<dyn Function>,
    num_calls: usize,
}

impl CallCounter {
    pub fn new(function: Box<dyn Function>) -> Self {
        Self {
            function,
            num_calls: 0,
        }
    }

    pub fn num_calls(&self) -> usize {
        self.num_calls
    }
}

impl Function for CallCounter {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        let value = self.function.evaluate(x)?;
        self.num_calls += 1;
        Ok(value)
    }

    fn evaluate_incrementally(
        &mut self,
        x: &BitVector,
        value: f64,
        flipped_bits: &[usize],
    ) -> Result<f64, Stop> {
        let value = self.function.evaluate_incrementally(x, value, flipped_bits)?;
        self.num_calls += 1;
        Ok(value)
    }

    fn provides_incremental_evaluation(&self) -> bool {
        self.function.provides_incremental_evaluation()
    }

    fn evaluate_safely(&mut self, x: &BitVector) -> Result<f64, Stop> {
        self.function.evaluate_safely(x)
    }

    fn update(&mut self, x: &BitVector, value: f64) -> Result<(), Stop> {
        self.function.update(x, value)?;
        self.num_calls += 1;
        Ok(())
    }

    fn maximum(&self) -> Option<f64> {
        self.function.maximum()
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }

    fn report(&self, report: &mut Report) {
        report.num_evaluations.get_or_insert(self.num_calls);
        self.function.report(report);
    }
}

/// 预算：恰好允许 budget 次求值，第 budget + 1 次返回 `Stop::LastEvaluation`
pub struct OnBudgetFunction {
    function: Box<dyn Function>,
    budget: usize,
    num_calls: usize,
}

impl OnBudgetFunction {
    pub fn new(function: Box<dyn Function>, budget: usize) -> Self {
        Self {
            function,
            budget,
            num_calls: 0,
        }
    }

    pub fn num_calls(&self) -> usize {
        self.num_calls
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    fn spend(&mut self) -> Result<(), Stop> {
        if self.num_calls == self.budget {
            return Err(Stop::LastEvaluation);
        }
        self.num_calls += 1;
        Ok(())
    }
}

impl Function for OnBudgetFunction {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        self.spend()?;
        self.function.evaluate(x)
    }

    fn evaluate_incrementally(
        &mut self,
        x: &BitVector,
        value: f64,
        flipped_bits: &[usize],
    ) -> Result<f64, Stop> {
        self.spend()?;
        self.function.evaluate_incrementally(x, value, flipped_bits)
    }

    fn provides_incremental_evaluation(&self) -> bool {
        self.function.provides_incremental_evaluation()
    }

    fn evaluate_safely(&mut self, x: &BitVector) -> Result<f64, Stop> {
        self.function.evaluate_safely(x)
    }

    fn update(&mut self, x: &BitVector, value: f64) -> Result<(), Stop> {
        self.spend()?;
        self.function.update(x, value)
    }

    fn maximum(&self) -> Option<f64> {
        self.function.maximum()
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }

    fn report(&self, report: &mut Report) {
        report.num_evaluations.get_or_insert(self.num_calls);
        self.function.report(report);
    }
}

/// 缓存：同一个输入最多只交给内层函数求值一次
///
/// 不支持增量求值，增量求值退化为完整求值后查表。
pub struct Cache {
    function: Box<dyn Function>,
    cache: FxHashMap<BitVector, f64>,
    num_evaluations: usize,
    num_lookups: usize,
}

impl Cache {
    pub fn new(function: Box<dyn Function>) -> Self {
        Self {
            function,
            cache: FxHashMap::default(),
            num_evaluations: 0,
            num_lookups: 0,
        }
    }

    pub fn num_evaluations(&self) -> usize {
        self.num_evaluations
    }

    pub fn num_lookups(&self) -> usize {
        self.num_lookups
    }

    /// 命中次数与总调用次数之比
    pub fn lookup_ratio(&self) -> f64 {
        if self.num_evaluations == 0 {
            0.0
        } else {
            self.num_lookups as f64 / self.num_evaluations as f64
        }
    }
}

impl Function for Cache {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        self.num_evaluations += 1;
        if let Some(&value) = self.cache.get(x) {
            self.num_lookups += 1;
            return Ok(value);
        }
        let value = self.function.evaluate(x)?;
        self.cache.insert(x.clone(), value);
        Ok(value)
    }

    fn evaluate_safely(&mut self, x: &BitVector) -> Result<f64, Stop> {
        match self.cache.get(x) {
            Some(&value) => Ok(value),
            None => self.function.evaluate_safely(x),
        }
    }

    fn update(&mut self, x: &BitVector, value: f64) -> Result<(), Stop> {
        self.num_evaluations += 1;
        if self.cache.contains_key(x) {
            self.num_lookups += 1;
            return Ok(());
        }
        self.function.update(x, value)?;
        self.cache.insert(x.clone(), value);
        Ok(())
    }

    fn maximum(&self) -> Option<f64> {
        self.function.maximum()
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }

    fn report(&self, report: &mut Report) {
        report.lookup_ratio.get_or_insert(self.lookup_ratio());
        self.function.report(report);
    }
}

/// 一次改进：第几次求值得到了什么值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub num_evaluations: usize,
    pub value: f64,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.num_evaluations, self.value)
    }
}

/// 记录最后一次严格改进，可选记录求值用时
pub struct ProgressTracker {
    function: Box<dyn Function>,
    num_calls: usize,
    last_improvement: Option<Event>,
    log_improvement: bool,
    record_evaluation_time: bool,
    evaluation_time: Duration,
}

impl ProgressTracker {
    pub fn new(function: Box<dyn Function>) -> Self {
        Self {
            function,
            num_calls: 0,
            last_improvement: None,
            log_improvement: false,
            record_evaluation_time: false,
            evaluation_time: Duration::ZERO,
        }
    }

    pub fn with_log_improvement(mut self, log_improvement: bool) -> Self {
        self.log_improvement = log_improvement;
        self
    }

    pub fn with_record_evaluation_time(mut self, record_evaluation_time: bool) -> Self {
        self.record_evaluation_time = record_evaluation_time;
        self
    }

    pub fn num_calls(&self) -> usize {
        self.num_calls
    }

    pub fn last_improvement(&self) -> Option<Event> {
        self.last_improvement
    }

    pub fn evaluation_time(&self) -> Duration {
        self.evaluation_time
    }

    fn update_last_improvement(&mut self, value: f64) {
        self.num_calls += 1;
        let improved = match self.last_improvement {
            None => true,
            Some(event) => value > event.value,
        };
        if improved {
            let event = Event {
                num_evaluations: self.num_calls,
                value,
            };
            self.last_improvement = Some(event);
            if self.log_improvement {
                info!("{event}");
            }
        }
    }

    /// 记下内层的结果；内层在达到目标时返回的值同样算作一次求值
    fn track(&mut self, result: Result<f64, Stop>) -> Result<f64, Stop> {
        match result {
            Ok(value) => {
                self.update_last_improvement(value);
                Ok(value)
            }
            Err(stop) => {
                if let Stop::TargetReached(solution) | Stop::MaximumReached(solution) = &stop {
                    self.update_last_improvement(solution.value);
                }
                Err(stop)
            }
        }
    }

    fn timed<T>(&mut self, f: impl FnOnce(&mut dyn Function) -> T) -> T {
        if self.record_evaluation_time {
            let start = Instant::now();
            let result = f(self.function.as_mut());
            self.evaluation_time += start.elapsed();
            result
        } else {
            f(self.function.as_mut())
        }
    }
}

impl Function for ProgressTracker {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        let result = self.timed(|function| function.evaluate(x));
        self.track(result)
    }

    fn evaluate_incrementally(
        &mut self,
        x: &BitVector,
        value: f64,
        flipped_bits: &[usize],
    ) -> Result<f64, Stop> {
        let result =
            self.timed(|function| function.evaluate_incrementally(x, value, flipped_bits));
        self.track(result)
    }

    fn provides_incremental_evaluation(&self) -> bool {
        self.function.provides_incremental_evaluation()
    }

    fn evaluate_safely(&mut self, x: &BitVector) -> Result<f64, Stop> {
        self.timed(|function| function.evaluate_safely(x))
    }

    fn update(&mut self, x: &BitVector, value: f64) -> Result<(), Stop> {
        let result = self.function.update(x, value).map(|_| value);
        self.track(result).map(|_| ())
    }

    fn maximum(&self) -> Option<f64> {
        self.function.maximum()
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }

    fn report(&self, report: &mut Report) {
        report.num_evaluations.get_or_insert(self.num_calls);
        if let Some(event) = self.last_improvement {
            report.last_improvement.get_or_insert(event);
        }
        if self.record_evaluation_time {
            report
                .evaluation_time
                .get_or_insert(self.evaluation_time.as_secs_f64());
        }
        self.function.report(report);
    }
}

/// 函数值不小于目标时停止
pub struct StopOnTarget {
    function: Box<dyn Function>,
    target: f64,
    trigger: Option<Solution>,
}

impl StopOnTarget {
    pub fn new(function: Box<dyn Function>, target: f64) -> Self {
        Self {
            function,
            target,
            trigger: None,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// 触发停止的解
    pub fn trigger(&self) -> Option<&Solution> {
        self.trigger.as_ref()
    }

    fn check(&mut self, x: &BitVector, value: f64) -> Result<f64, Stop> {
        if value >= self.target {
            let solution = Solution::new(x.clone(), value);
            self.trigger = Some(solution.clone());
            return Err(Stop::TargetReached(solution));
        }
        Ok(value)
    }
}

impl Function for StopOnTarget {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        let value = self.function.evaluate(x)?;
        self.check(x, value)
    }

    fn evaluate_incrementally(
        &mut self,
        x: &BitVector,
        value: f64,
        flipped_bits: &[usize],
    ) -> Result<f64, Stop> {
        let value = self
            .function
            .evaluate_incrementally(x, value, flipped_bits)?;
        if value >= self.target {
            let mut y = x.clone();
            y.flip_bits(flipped_bits);
            return self.check(&y, value);
        }
        Ok(value)
    }

    fn provides_incremental_evaluation(&self) -> bool {
        self.function.provides_incremental_evaluation()
    }

    fn evaluate_safely(&mut self, x: &BitVector) -> Result<f64, Stop> {
        self.function.evaluate_safely(x)
    }

    fn update(&mut self, x: &BitVector, value: f64) -> Result<(), Stop> {
        self.function.update(x, value)?;
        self.check(x, value).map(|_| ())
    }

    fn maximum(&self) -> Option<f64> {
        self.function.maximum()
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }
}

/// 达到已知最大值时停止
pub struct StopOnMaximum {
    function: Box<dyn Function>,
    maximum: f64,
}

impl StopOnMaximum {
    /// 函数没有已知最大值时无法构造
    pub fn new(function: Box<dyn Function>) -> Result<Self, Error> {
        let maximum = function
            .maximum()
            .ok_or_else(|| Error::from("函数没有已知的最大值，无法在达到最大值时停止"))?;
        Ok(Self { function, maximum })
    }

    fn check(&self, x: &BitVector, value: f64) -> Result<f64, Stop> {
        if value >= self.maximum {
            return Err(Stop::MaximumReached(Solution::new(x.clone(), value)));
        }
        Ok(value)
    }
}

impl Function for StopOnMaximum {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        let value = self.function.evaluate(x)?;
        self.check(x, value)
    }

    fn evaluate_incrementally(
        &mut self,
        x: &BitVector,
        value: f64,
        flipped_bits: &[usize],
    ) -> Result<f64, Stop> {
        let value = self
            .function
            .evaluate_incrementally(x, value, flipped_bits)?;
        if value >= self.maximum {
            let mut y = x.clone();
            y.flip_bits(flipped_bits);
            return self.check(&y, value);
        }
        Ok(value)
    }

    fn provides_incremental_evaluation(&self) -> bool {
        self.function.provides_incremental_evaluation()
    }

    fn evaluate_safely(&mut self, x: &BitVector) -> Result<f64, Stop> {
        self.function.evaluate_safely(x)
    }

    fn update(&mut self, x: &BitVector, value: f64) -> Result<(), Stop> {
        self.function.update(x, value)?;
        self.check(x, value).map(|_| ())
    }

    fn maximum(&self) -> Option<f64> {
        Some(self.maximum)
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }
}
