use crate::algorithms::Solution;
use std::fmt;

/// 配置错误：参数不合法、文件无法读取等，在构造阶段发现，直接终止本次运行
#[derive(Debug, Clone)]
pub struct Error {
    pub message: String,
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Self { message: value }
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// 停止条件
///
/// 由控制器或算法在求值链中抛出，沿着调用栈一路传递到搜索驱动，由驱动恰好处理一次。
/// 除了预算耗尽以外，每种条件都带着触发时已知的最好解。
#[derive(Debug, Clone, PartialEq)]
pub enum Stop {
    /// 预算耗尽，本次求值没有结果
    LastEvaluation,
    /// 达到了设定的目标值
    TargetReached(Solution),
    /// 达到了函数的已知最大值
    MaximumReached(Solution),
    /// 局部搜索连续失败次数超过耐心值
    LocalMaximum(Solution),
}

impl Stop {
    /// 停止条件附带的解
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Stop::LastEvaluation => None,
            Stop::TargetReached(solution)
            | Stop::MaximumReached(solution)
            | Stop::LocalMaximum(solution) => Some(solution),
        }
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stop::LastEvaluation => write!(f, "last evaluation"),
            Stop::TargetReached(s) => write!(f, "target reached: {}", s.value),
            Stop::MaximumReached(s) => write!(f, "maximum reached: {}", s.value),
            Stop::LocalMaximum(s) => write!(f, "local maximum: {}", s.value),
        }
    }
}

impl std::error::Error for Stop {}
