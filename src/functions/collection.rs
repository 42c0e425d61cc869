//! 几个常用的测试函数
//!
//! 它们是求值链最内层的具体函数，也可以存成文件再载入。

use super::Function;
use crate::bit_vector::{BitVector, Generator};
use crate::error::{Error, Stop};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::{read_to_string, write};
use std::io;
use std::path::Path;

/// 一的个数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneMax {
    bv_size: usize,
}

impl OneMax {
    pub fn new(bv_size: usize) -> Self {
        Self { bv_size }
    }
}

impl Function for OneMax {
    fn bv_size(&self) -> usize {
        self.bv_size
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        assert_eq!(x.len(), self.bv_size);
        Ok(x.hamming_weight() as f64)
    }

    fn evaluate_incrementally(
        &mut self,
        x: &BitVector,
        value: f64,
        flipped_bits: &[usize],
    ) -> Result<f64, Stop> {
        let delta: f64 = flipped_bits
            .iter()
            .map(|&i| if x[i] { -1.0 } else { 1.0 })
            .sum();
        Ok(value + delta)
    }

    fn provides_incremental_evaluation(&self) -> bool {
        true
    }

    fn maximum(&self) -> Option<f64> {
        Some(self.bv_size as f64)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "OneMax")
    }
}

/// 线性函数 f(x) = Σ w_i x_i
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearFunction {
    weights: Vec<f64>,
}

impl LinearFunction {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// 权重服从 [-1, 1] 上的均匀分布
    pub fn random(bv_size: usize, rng: &mut Generator) -> Self {
        Self {
            weights: (0..bv_size).map(|_| rng.random_range(-1.0..=1.0)).collect(),
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Function for LinearFunction {
    fn bv_size(&self) -> usize {
        self.weights.len()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        assert_eq!(x.len(), self.weights.len());
        Ok(self
            .weights
            .iter()
            .zip(x.iter())
            .filter(|(_, b)| *b)
            .map(|(w, _)| w)
            .sum())
    }

    fn evaluate_incrementally(
        &mut self,
        x: &BitVector,
        value: f64,
        flipped_bits: &[usize],
    ) -> Result<f64, Stop> {
        let delta: f64 = flipped_bits
            .iter()
            .map(|&i| if x[i] { -self.weights[i] } else { self.weights[i] })
            .sum();
        Ok(value + delta)
    }

    fn provides_incremental_evaluation(&self) -> bool {
        true
    }

    /// 所有正权重之和
    fn maximum(&self) -> Option<f64> {
        Some(self.weights.iter().filter(|&&w| w > 0.0).sum())
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "{x}")?;
        let misplaced = (0..x.len())
            .filter(|&i| x[i] != (self.weights[i] > 0.0))
            .count();
        writeln!(sink, "与最优解不同的位数：{misplaced}")
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "LinearFunction")
    }
}

/// 从第一位开始连续的一的个数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadingOnes {
    bv_size: usize,
}

impl LeadingOnes {
    pub fn new(bv_size: usize) -> Self {
        Self { bv_size }
    }
}

impl Function for LeadingOnes {
    fn bv_size(&self) -> usize {
        self.bv_size
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        assert_eq!(x.len(), self.bv_size);
        Ok(x.iter().take_while(|&b| b).count() as f64)
    }

    fn maximum(&self) -> Option<f64> {
        Some(self.bv_size as f64)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "LeadingOnes")
    }
}

const NAME: &str = "hnco::function";
const VERSION: u32 = 1;

/// 可以存为文件的函数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunctionArchive {
    OneMax(OneMax),
    Linear(LinearFunction),
    LeadingOnes(LeadingOnes),
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    name: String,
    version: u32,
    payload: FunctionArchive,
}

impl FunctionArchive {
    pub fn into_function(self) -> Box<dyn Function> {
        match self {
            FunctionArchive::OneMax(f) => Box::new(f),
            FunctionArchive::Linear(f) => Box::new(f),
            FunctionArchive::LeadingOnes(f) => Box::new(f),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let envelope = Envelope {
            name: NAME.to_string(),
            version: VERSION,
            payload: self.clone(),
        };
        write(path, serde_json::to_string_pretty(&envelope)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = read_to_string(path)
            .map_err(|e| Error::from(format!("无法读取函数文件 {}：{e}", path.display())))?;
        let envelope: Envelope = serde_json::from_str(&content)?;
        if envelope.name != NAME || envelope.version != VERSION {
            return Err(format!(
                "函数文件 {} 的格式为 {} v{}，需要 {NAME} v{VERSION}",
                path.display(),
                envelope.name,
                envelope.version
            )
            .into());
        }
        Ok(envelope.payload)
    }
}
