//! 配置文件
//!
//! 配置文件是 YAML 格式，包含函数、映射、修饰器、控制器和算法五个部分。

use crate::maps::SamplingMode;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::path::PathBuf;

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 随机数种子，不填时从系统取种，实际使用的种子会写回输出目录
    pub seed: Option<u64>,
    /// 并行求值的线程数
    #[serde(default = "default_threads")]
    pub threads: usize,
    pub function: FunctionConfig,
    pub map: Option<MapConfig>,
    #[serde(default)]
    pub modifiers: ModifierConfig,
    #[serde(default)]
    pub controllers: ControllerConfig,
    pub algorithm: AlgorithmConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_threads() -> usize {
    1
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunctionConfig {
    OneMax {
        size: usize,
    },
    /// 给出 weights 时使用给定的权重，否则随机生成 size 个权重
    Linear {
        size: Option<usize>,
        weights: Option<Vec<f64>>,
    },
    LeadingOnes {
        size: usize,
    },
    Load {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
    Translation,
    Permutation,
    PermutationTranslation,
    Linear,
    Affine,
    TsAffine,
    Load,
}

/// 映射的输出长度总是等于函数的长度
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub r#type: MapType,
    /// 线性和仿射映射的输入长度，默认等于函数的长度
    pub input_size: Option<usize>,
    #[serde(default)]
    pub surjective: bool,
    /// 初等变换序列的长度
    pub length: Option<usize>,
    pub sampling_mode: Option<SamplingMode>,
    pub path: Option<PathBuf>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NeighborhoodConfig {
    SingleBitFlip,
    /// rate 是期望翻转的位数，每一位的翻转概率为 rate / n
    StandardBitMutation {
        rate: Option<f64>,
        #[serde(default)]
        allow_no_mutation: bool,
    },
    HammingBall {
        radius: usize,
    },
    HammingSphere {
        radius: usize,
    },
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        NeighborhoodConfig::SingleBitFlip
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IteratorConfig {
    SingleBitFlip,
    HammingSphere { radius: usize },
    HammingBall { radius: usize },
}

impl Default for IteratorConfig {
    fn default() -> Self {
        IteratorConfig::SingleBitFlip
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierConfig {
    pub prior_noise: Option<NeighborhoodConfig>,
    /// 作用在函数值上的表达式，变量为 x
    pub expression: Option<String>,
    pub negation: bool,
    /// 加性高斯噪声的标准差
    pub additive_gaussian_noise: Option<f64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// 求值预算，0 表示不限
    pub budget: usize,
    pub cache: bool,
    /// 同时开启预算和缓存时，是否连缓存命中也计入预算
    pub cache_budget: bool,
    pub stop_on_maximum: bool,
    pub target: Option<f64>,
    pub log_improvement: bool,
    pub record_evaluation_time: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlgorithmConfig {
    RandomSearch {
        #[serde(default)]
        num_iterations: usize,
    },
    RandomLocalSearch {
        #[serde(default)]
        neighborhood: NeighborhoodConfig,
        #[serde(default)]
        strict: bool,
        /// 连续失败多少次后认为到达局部最优，0 表示不限
        #[serde(default = "default_patience")]
        patience: usize,
        #[serde(default)]
        incremental_evaluation: bool,
        #[serde(default)]
        num_iterations: usize,
        #[serde(default)]
        log: bool,
    },
    FirstAscentHillClimbing {
        #[serde(default)]
        iterator: IteratorConfig,
        #[serde(default)]
        num_iterations: usize,
    },
    SteepestAscentHillClimbing {
        #[serde(default)]
        iterator: IteratorConfig,
        #[serde(default)]
        num_iterations: usize,
    },
    OnePlusOneEa {
        mutation_rate: Option<f64>,
        #[serde(default)]
        allow_no_mutation: bool,
        #[serde(default)]
        incremental_evaluation: bool,
        #[serde(default)]
        num_iterations: usize,
    },
    MuPlusLambdaEa {
        #[serde(default = "default_mu")]
        mu: usize,
        #[serde(default = "default_lambda")]
        lambda: usize,
        mutation_rate: Option<f64>,
        #[serde(default)]
        allow_no_mutation: bool,
        #[serde(default)]
        num_iterations: usize,
        #[serde(default)]
        log: bool,
    },
}

fn default_patience() -> usize {
    50
}

fn default_mu() -> usize {
    10
}

fn default_lambda() -> usize {
    100
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 输出经过映射变换之后、原函数空间中的解
    pub concrete_solution: bool,
    /// 用函数自己的方式描述解
    pub describe_solution: bool,
}
