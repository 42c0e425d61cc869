//! 目标函数
//!
//! 算法只认识 `Function` 接口。具体的函数在最内层，外面依次套上修饰器（改变函数值）和控制器
//! （计数、缓存、预算、停止条件），链条的最外层才是算法真正求值的函数。

use crate::bit_vector::BitVector;
use crate::error::Stop;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::io;

pub mod collection;
pub mod controllers;
pub mod expression;
pub mod factory;
pub mod modifiers;

pub use collection::{FunctionArchive, LeadingOnes, LinearFunction, OneMax};
pub use controllers::{
    Cache, CallCounter, Event, OnBudgetFunction, ProgressTracker, StopOnMaximum, StopOnTarget,
};
pub use factory::{DecoratedFunctionFactory, FunctionFactory};
pub use modifiers::{
    AdditiveGaussianNoise, ExpressionModifier, FunctionMapComposition, Negation, PriorNoise,
};

/// 定义在定长位向量上的实值函数
///
/// 求值返回 `Result<f64, Stop>`：只有控制器会返回 `Err`，表示搜索应当停止。
/// 修饰器和控制器各自独占内层函数。
pub trait Function: Send {
    fn bv_size(&self) -> usize;

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop>;

    /// 已知 x 的函数值为 value，求翻转 flipped_bits 之后的函数值
    ///
    /// 默认实现复制 x 再完整求值，支持增量求值的函数应当重写这个方法。
    fn evaluate_incrementally(
        &mut self,
        x: &BitVector,
        value: f64,
        flipped_bits: &[usize],
    ) -> Result<f64, Stop> {
        let _ = value;
        let mut y = x.clone();
        y.flip_bits(flipped_bits);
        self.evaluate(&y)
    }

    fn provides_incremental_evaluation(&self) -> bool {
        false
    }

    /// 绕过所有控制器求值，用于并行求值时的辅助线程
    fn evaluate_safely(&mut self, x: &BitVector) -> Result<f64, Stop> {
        self.evaluate(x)
    }

    /// 通知控制器：x 的函数值已经在别处算出，为 value
    fn update(&mut self, x: &BitVector, value: f64) -> Result<(), Stop> {
        let _ = (x, value);
        Ok(())
    }

    /// 已知的全局最大值
    fn maximum(&self) -> Option<f64> {
        None
    }

    fn has_known_maximum(&self) -> bool {
        self.maximum().is_some()
    }

    /// 以便于阅读的方式输出一个解
    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "{x}")
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        let _ = sink;
        Ok(())
    }

    /// 修饰器返回被修饰的函数
    fn decorated(&self) -> Option<&dyn Function> {
        None
    }

    /// 沿着链条收集控制器的统计信息
    fn report(&self, report: &mut Report) {
        if let Some(function) = self.decorated() {
            function.report(report);
        }
    }
}

/// 控制器的统计信息，链条中靠外的控制器优先写入
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// 总调用次数
    pub num_evaluations: Option<usize>,
    /// 最后一次改进
    pub last_improvement: Option<Event>,
    /// 求值总用时，单位为秒
    pub evaluation_time: Option<f64>,
    /// 缓存命中率
    pub lookup_ratio: Option<f64>,
}

impl Report {
    pub fn collect(function: &dyn Function) -> Self {
        let mut report = Report::default();
        function.report(&mut report);
        report
    }
}
