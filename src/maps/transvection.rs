//! 初等变换（transvection）与由它们的乘积定义的仿射映射
//!
//! 初等变换 τ(i, j) = I + E(i, j) 把第 j 位加到第 i 位上。
//! 初等变换都是可逆的，所以它们的乘积总是满射，不需要稠密矩阵和拒绝采样。

use super::{Map, MapArchive};
use crate::bit_matrix::BitMatrix;
use crate::bit_vector::{BitVector, Generator};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transvection {
    pub row_index: usize,
    pub column_index: usize,
}

impl Transvection {
    pub fn new(row_index: usize, column_index: usize) -> Self {
        Self {
            row_index,
            column_index,
        }
    }

    pub fn is_valid(&self, n: usize) -> bool {
        self.row_index != self.column_index && self.row_index < n && self.column_index < n
    }

    /// 行列下标不同的均匀随机初等变换
    pub fn random(n: usize, rng: &mut Generator) -> Self {
        assert!(n > 1);
        loop {
            let i = rng.random_range(0..n);
            let j = rng.random_range(0..n);
            if i != j {
                return Self::new(i, j);
            }
        }
    }

    /// 随机生成一个与 a 不可交换的初等变换
    pub fn random_non_commuting(n: usize, a: &Transvection, rng: &mut Generator) -> Self {
        assert!(n > 1);
        let result = if rng.random::<bool>() {
            let row_index = a.column_index;
            Self::new(row_index, random_other(n, row_index, rng))
        } else {
            let column_index = a.row_index;
            Self::new(random_other(n, column_index, rng), column_index)
        };
        debug_assert!(!result.commutes_with(a));
        result
    }

    /// x[row] += x[column]
    pub fn multiply(&self, bv: &mut BitVector) {
        assert!(self.is_valid(bv.len()));
        if bv[self.column_index] {
            bv.flip(self.row_index);
        }
    }

    /// 左乘矩阵：第 column 行加到第 row 行
    pub fn multiply_matrix(&self, matrix: &mut BitMatrix) {
        assert!(self.is_valid(matrix.num_rows()));
        matrix.add_rows(self.column_index, self.row_index);
    }

    pub fn commutes_with(&self, other: &Transvection) -> bool {
        self.row_index != other.column_index && other.row_index != self.column_index
    }

    /// 四个下标两两不同
    pub fn is_disjoint_from(&self, other: &Transvection) -> bool {
        self.row_index != other.row_index
            && self.row_index != other.column_index
            && self.column_index != other.row_index
            && self.column_index != other.column_index
    }
}

fn random_other(n: usize, excluded: usize, rng: &mut Generator) -> usize {
    loop {
        let i = rng.random_range(0..n);
        if i != excluded {
            return i;
        }
    }
}

fn shuffled_variables(n: usize, rng: &mut Generator) -> Vec<usize> {
    let mut variables: Vec<usize> = (0..n).collect();
    variables.shuffle(rng);
    variables
}

/// 初等变换序列的采样方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// 每个初等变换独立均匀采样
    #[default]
    Unconstrained,
    /// 所有初等变换两两可交换
    Commuting,
    /// 行下标互不相同
    UniqueSource,
    /// 列下标互不相同
    UniqueDestination,
    /// 所有下标互不相同
    Disjoint,
    /// 相邻的初等变换不可交换
    NonCommuting,
}

/// 按顺序作用的初等变换序列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransvectionSequence {
    transvections: Vec<Transvection>,
}

impl TransvectionSequence {
    pub fn new(transvections: Vec<Transvection>) -> Self {
        Self { transvections }
    }

    pub fn random(n: usize, length: usize, mode: SamplingMode, rng: &mut Generator) -> Self {
        assert!(n > 1);
        let transvections = match mode {
            SamplingMode::Unconstrained => (0..length)
                .map(|_| Transvection::random(n, rng))
                .collect(),
            SamplingMode::Commuting => Self::random_commuting(n, length, rng),
            SamplingMode::UniqueSource => Self::random_unique(n, length, true, rng),
            SamplingMode::UniqueDestination => Self::random_unique(n, length, false, rng),
            SamplingMode::Disjoint => Self::random_disjoint(n, length, rng),
            SamplingMode::NonCommuting => {
                let mut transvections: Vec<Transvection> = Vec::with_capacity(length);
                for i in 0..length {
                    let tv = match i {
                        0 => Transvection::random(n, rng),
                        _ => Transvection::random_non_commuting(n, &transvections[i - 1], rng),
                    };
                    transvections.push(tv);
                }
                transvections
            }
        };
        Self { transvections }
    }

    /// 把变量随机分成两组 A、B，只取 A 中的行、B 中的列，这样的初等变换两两可交换。
    /// 分组的大小是随机的，但要保证 |A| · |B| 不小于需要的长度。
    fn random_commuting(n: usize, length: usize, rng: &mut Generator) -> Vec<Transvection> {
        if length == 0 {
            return vec![];
        }
        let k = n / 2;
        let length_max = if n % 2 == 0 { k * k } else { k * (k + 1) };
        let mut length = length;
        if length > length_max {
            warn!("可交换的初等变换序列最长为 {length_max}，请求的长度 {length} 被截断");
            length = length_max;
        }
        let variables = shuffled_variables(n, rng);
        let m = ((n * n) as f64 / 4.0 - length as f64).max(0.0).sqrt();
        let split = if n % 2 == 0 {
            let bound = (k - 1).min(m as usize);
            let r = rng.random_range(0..=bound);
            if rng.random::<bool>() {
                k + r
            } else {
                k - r
            }
        } else {
            let bound = k.min((m + 0.5) as usize).max(1);
            let r = rng.random_range(1..=bound);
            if rng.random::<bool>() {
                k + r
            } else {
                k + 1 - r
            }
        };
        let mut transvections: Vec<Transvection> = (0..split)
            .cartesian_product(split..n)
            .map(|(i, j)| Transvection::new(variables[i], variables[j]))
            .collect();
        transvections.shuffle(rng);
        transvections.truncate(length);
        transvections
    }

    fn random_unique(
        n: usize,
        length: usize,
        unique_row: bool,
        rng: &mut Generator,
    ) -> Vec<Transvection> {
        let mut length = length;
        if length > n - 1 {
            warn!("初等变换序列最长为 {}，请求的长度 {length} 被截断", n - 1);
            length = n - 1;
        }
        let variables = shuffled_variables(n, rng);
        let mut transvections: Vec<Transvection> = (0..length)
            .map(|i| {
                let other = variables[rng.random_range(length..n)];
                if unique_row {
                    Transvection::new(variables[i], other)
                } else {
                    Transvection::new(other, variables[i])
                }
            })
            .collect();
        transvections.shuffle(rng);
        transvections
    }

    fn random_disjoint(n: usize, length: usize, rng: &mut Generator) -> Vec<Transvection> {
        let mut length = length;
        if 2 * length > n {
            warn!("互不相交的初等变换序列最长为 {}，请求的长度 {length} 被截断", n / 2);
            length = n / 2;
        }
        let variables = shuffled_variables(n, rng);
        (0..length)
            .map(|i| Transvection::new(variables[2 * i], variables[2 * i + 1]))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transvections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transvections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transvection> {
        self.transvections.iter()
    }

    pub fn is_valid(&self, n: usize) -> bool {
        self.transvections.iter().all(|tv| tv.is_valid(n))
    }

    pub fn multiply(&self, bv: &mut BitVector) {
        for tv in &self.transvections {
            tv.multiply(bv);
        }
    }

    pub fn multiply_matrix(&self, matrix: &mut BitMatrix) {
        for tv in &self.transvections {
            tv.multiply_matrix(matrix);
        }
    }

    /// 每个初等变换都是自己的逆，所以逆序列就是倒序
    pub fn inverse(&self) -> TransvectionSequence {
        Self {
            transvections: self.transvections.iter().rev().copied().collect(),
        }
    }

    /// 序列对应的稠密矩阵
    pub fn to_matrix(&self, n: usize) -> BitMatrix {
        let mut matrix = BitMatrix::identity(n);
        self.multiply_matrix(&mut matrix);
        matrix
    }
}

/// y = T x + b，其中 T 是初等变换序列的乘积
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TsAffineMap {
    sequence: TransvectionSequence,
    bv: BitVector,
}

impl TsAffineMap {
    pub fn new(sequence: TransvectionSequence, bv: BitVector) -> Self {
        assert!(sequence.is_valid(bv.len()));
        Self { sequence, bv }
    }

    pub fn random(n: usize, length: usize, mode: SamplingMode, rng: &mut Generator) -> Self {
        let bv = BitVector::random(n, rng);
        let sequence = TransvectionSequence::random(n, length, mode, rng);
        Self { sequence, bv }
    }

    pub fn sequence(&self) -> &TransvectionSequence {
        &self.sequence
    }

    pub fn vector(&self) -> &BitVector {
        &self.bv
    }

    /// 求逆映射 x = T⁻¹ (y + b) = T⁻¹ y + T⁻¹ b
    pub fn inverse(&self) -> TsAffineMap {
        let sequence = self.sequence.inverse();
        let mut bv = self.bv.clone();
        sequence.multiply(&mut bv);
        Self { sequence, bv }
    }
}

impl Map for TsAffineMap {
    fn map_into(&self, input: &BitVector, output: &mut BitVector) {
        assert_eq!(input.len(), self.bv.len());
        output.clone_from(input);
        self.sequence.multiply(output);
        output.add_assign(&self.bv);
    }

    fn input_size(&self) -> usize {
        self.bv.len()
    }

    fn output_size(&self) -> usize {
        self.bv.len()
    }

    fn is_surjective(&self) -> bool {
        true
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        let sequence = self
            .sequence
            .iter()
            .map(|tv| format!("({}, {})", tv.row_index, tv.column_index))
            .join(" :: ");
        writeln!(sink, "TsAffineMap: {sequence}")?;
        writeln!(sink, "{}", self.bv)
    }

    fn to_archive(&self) -> MapArchive {
        MapArchive::TsAffine(self.clone())
    }
}
