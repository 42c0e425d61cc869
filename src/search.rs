//! 搜索驱动：运行算法，处理停止条件，汇总结果

use crate::algorithms::{Algorithm, Solution};
use crate::bit_vector::Generator;
use crate::error::Stop;
use crate::functions::{Function, Report};
use serde::Serialize;
use std::fmt;
use tracing::info;
use web_time::Instant;

/// 搜索结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// 算法完成了设定的迭代次数
    Completed,
    LastEvaluation,
    TargetReached,
    MaximumReached,
    LocalMaximum,
}

impl StopReason {
    /// 是否达到了目标或最大值
    pub fn is_success(self) -> bool {
        matches!(self, StopReason::TargetReached | StopReason::MaximumReached)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StopReason::Completed => "completed",
            StopReason::LastEvaluation => "last evaluation",
            StopReason::TargetReached => "target reached",
            StopReason::MaximumReached => "maximum reached",
            StopReason::LocalMaximum => "local maximum",
        };
        write!(f, "{name}")
    }
}

/// 一次搜索的结果
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub solution: Solution,
    pub stop: StopReason,
    pub success: bool,
    /// 总用时，单位为秒
    pub total_time: f64,
    #[serde(flatten)]
    pub report: Report,
}

/// 运行算法直到完成或者出现停止条件
///
/// 停止条件在这里被处理恰好一次。达到目标或最大值时，解取自停止条件本身；
/// 其余情况先调用 finalize 修复算法记录的解，再取算法的解。
pub fn run(
    algorithm: &mut dyn Algorithm,
    functions: &mut [Box<dyn Function>],
    rng: &mut Generator,
) -> SearchReport {
    let start = Instant::now();
    let result = algorithm.maximize(functions, rng);
    let total_time = start.elapsed();
    let (stop, solution) = match result {
        Ok(()) => {
            algorithm.finalize();
            (StopReason::Completed, algorithm.solution().clone())
        }
        Err(Stop::LastEvaluation) => {
            algorithm.finalize();
            (StopReason::LastEvaluation, algorithm.solution().clone())
        }
        Err(Stop::TargetReached(solution)) => (StopReason::TargetReached, solution),
        Err(Stop::MaximumReached(solution)) => (StopReason::MaximumReached, solution),
        Err(Stop::LocalMaximum(solution)) => {
            algorithm.finalize();
            (StopReason::LocalMaximum, solution)
        }
    };
    info!("搜索结束（{stop}），最好值为 {}", solution.value);
    SearchReport {
        solution,
        stop,
        success: stop.is_success(),
        total_time: total_time.as_secs_f64(),
        report: Report::collect(functions[0].as_ref()),
    }
}

