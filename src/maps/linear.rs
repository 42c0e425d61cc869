//! 线性映射与仿射映射
//!
//! 随机满射通过拒绝采样得到：反复生成随机矩阵，直到它满行秩为止。
//! 行数远小于列数时几乎一次成功；行数接近列数时，随机方阵满秩的概率约为 0.29，
//! 期望试验次数明显增加，每次试验还要做一次 O(rows² · cols) 的消元，矩阵很大时需要注意。

use super::{Map, MapArchive};
use crate::bit_matrix::BitMatrix;
use crate::bit_vector::{BitVector, Generator};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::io;
use tracing::debug;

/// 生成 rows × cols 的随机矩阵；要求满射时拒绝采样直到满行秩
fn random_matrix(
    rows: usize,
    cols: usize,
    surjective: bool,
    rng: &mut Generator,
) -> Result<BitMatrix, Error> {
    if surjective && rows > cols {
        return Err(format!("行数 {rows} 大于列数 {cols}，不存在满射的线性映射").into());
    }
    let mut trials = 1;
    let mut matrix = BitMatrix::random(rows, cols, rng);
    if surjective {
        while matrix.compute_rank() != rows {
            matrix = BitMatrix::random(rows, cols, rng);
            trials += 1;
        }
        debug!("经过 {trials} 次采样得到 {rows} × {cols} 的满射矩阵");
    }
    Ok(matrix)
}

/// 线性映射 y = A x
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearMap {
    matrix: BitMatrix,
}

impl LinearMap {
    pub fn new(matrix: BitMatrix) -> Self {
        Self { matrix }
    }

    pub fn random(
        rows: usize,
        cols: usize,
        surjective: bool,
        rng: &mut Generator,
    ) -> Result<Self, Error> {
        Ok(Self {
            matrix: random_matrix(rows, cols, surjective, rng)?,
        })
    }

    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }
}

impl Map for LinearMap {
    fn map_into(&self, input: &BitVector, output: &mut BitVector) {
        self.matrix.multiply(input, output);
    }

    fn input_size(&self) -> usize {
        self.matrix.num_columns()
    }

    fn output_size(&self) -> usize {
        self.matrix.num_rows()
    }

    fn is_surjective(&self) -> bool {
        self.matrix.compute_rank() == self.matrix.num_rows()
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "LinearMap:")?;
        write!(sink, "{}", self.matrix)
    }

    fn to_archive(&self) -> MapArchive {
        MapArchive::Linear(self.clone())
    }
}

/// 仿射映射 y = A x + b，b 只平移像集，不影响满射性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffineMap {
    matrix: BitMatrix,
    bv: BitVector,
}

impl AffineMap {
    pub fn new(matrix: BitMatrix, bv: BitVector) -> Self {
        assert_eq!(matrix.num_rows(), bv.len());
        Self { matrix, bv }
    }

    pub fn random(
        rows: usize,
        cols: usize,
        surjective: bool,
        rng: &mut Generator,
    ) -> Result<Self, Error> {
        let matrix = random_matrix(rows, cols, surjective, rng)?;
        let bv = BitVector::random(rows, rng);
        Ok(Self { matrix, bv })
    }

    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    pub fn vector(&self) -> &BitVector {
        &self.bv
    }
}

impl Map for AffineMap {
    fn map_into(&self, input: &BitVector, output: &mut BitVector) {
        self.matrix.multiply(input, output);
        output.add_assign(&self.bv);
    }

    fn input_size(&self) -> usize {
        self.matrix.num_columns()
    }

    fn output_size(&self) -> usize {
        self.matrix.num_rows()
    }

    fn is_surjective(&self) -> bool {
        self.matrix.compute_rank() == self.matrix.num_rows()
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "AffineMap:")?;
        write!(sink, "{}", self.matrix)?;
        writeln!(sink, "{}", self.bv)
    }

    fn to_archive(&self) -> MapArchive {
        MapArchive::Affine(self.clone())
    }
}
