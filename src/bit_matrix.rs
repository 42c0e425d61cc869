//! GF(2) 上的矩阵
//!
//! 矩阵按行存储，每一行是一个按字存储的位向量，行加法就是逐字异或。

use crate::bit_vector::{BitVector, Generator};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitMatrix {
    rows: Vec<BitVector>,
    num_columns: usize,
}

impl BitMatrix {
    pub fn zeros(num_rows: usize, num_columns: usize) -> Self {
        Self {
            rows: vec![BitVector::zeros(num_columns); num_rows],
            num_columns,
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::zeros(n, n);
        for i in 0..n {
            matrix.rows[i].set(i, true);
        }
        matrix
    }

    pub fn random(num_rows: usize, num_columns: usize, rng: &mut Generator) -> Self {
        Self {
            rows: (0..num_rows)
                .map(|_| BitVector::random(num_columns, rng))
                .collect(),
            num_columns,
        }
    }

    pub fn from_rows(rows: Vec<BitVector>) -> Self {
        let num_columns = rows.first().map_or(0, BitVector::len);
        assert!(rows.iter().all(|row| row.len() == num_columns));
        Self { rows, num_columns }
    }

    /// 每一行的长度都等于列数
    pub fn is_valid(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.num_columns)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn row(&self, i: usize) -> &BitVector {
        &self.rows[i]
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.rows[i].get(j)
    }

    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        self.rows[i].set(j, value);
    }

    pub fn is_square(&self) -> bool {
        self.num_rows() == self.num_columns
    }

    pub fn is_identity(&self) -> bool {
        self.is_square()
            && (0..self.num_rows())
                .all(|i| (0..self.num_columns).all(|j| self.get(i, j) == (i == j)))
    }

    /// 对角线以下全为零
    pub fn is_upper_triangular(&self) -> bool {
        (0..self.num_rows()).all(|i| (0..i.min(self.num_columns)).all(|j| !self.get(i, j)))
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
    }

    /// 把第 source 行加到第 destination 行上
    pub fn add_rows(&mut self, source: usize, destination: usize) {
        assert_ne!(source, destination);
        let (row, target) = if source < destination {
            let (head, tail) = self.rows.split_at_mut(destination);
            (&head[source], &mut tail[0])
        } else {
            let (head, tail) = self.rows.split_at_mut(source);
            (&tail[0], &mut head[destination])
        };
        target.add_assign(row);
    }

    /// y = A x
    pub fn multiply(&self, x: &BitVector, y: &mut BitVector) {
        assert_eq!(x.len(), self.num_columns);
        assert_eq!(y.len(), self.num_rows());
        for (i, row) in self.rows.iter().enumerate() {
            y.set(i, row.dot(x));
        }
    }

    /// 矩阵乘法 A B
    pub fn product(&self, other: &BitMatrix) -> BitMatrix {
        assert_eq!(self.num_columns, other.num_rows());
        let transposed = other.transpose();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                transposed
                    .rows
                    .iter()
                    .map(|column| row.dot(column))
                    .collect::<BitVector>()
            })
            .collect();
        BitMatrix {
            rows,
            num_columns: other.num_columns,
        }
    }

    pub fn transpose(&self) -> BitMatrix {
        let mut result = BitMatrix::zeros(self.num_columns, self.num_rows());
        for i in 0..self.num_rows() {
            for j in 0..self.num_columns {
                result.set(j, i, self.get(i, j));
            }
        }
        result
    }

    /// 原地化为行阶梯形
    pub fn row_echelon_form(&mut self) {
        let mut pivot_row = 0;
        for j in 0..self.num_columns {
            if pivot_row == self.num_rows() {
                break;
            }
            let found = (pivot_row..self.num_rows()).find(|&i| self.get(i, j));
            if let Some(i) = found {
                self.swap_rows(pivot_row, i);
                for k in pivot_row + 1..self.num_rows() {
                    if self.get(k, j) {
                        self.add_rows(pivot_row, k);
                    }
                }
                pivot_row += 1;
            }
        }
    }

    /// 行阶梯形矩阵的秩，即非零行的个数
    pub fn rank(&self) -> usize {
        self.rows.iter().filter(|row| !row.is_zero()).count()
    }

    /// 对任意矩阵求秩，不修改原矩阵
    pub fn compute_rank(&self) -> usize {
        let mut copy = self.clone();
        copy.row_echelon_form();
        copy.rank()
    }

    /// Gauss-Jordan 消元求逆，不可逆时返回 None
    pub fn inverse(&self) -> Option<BitMatrix> {
        assert!(self.is_square());
        let n = self.num_rows();
        let mut a = self.clone();
        let mut b = BitMatrix::identity(n);
        for j in 0..n {
            let pivot = (j..n).find(|&i| a.get(i, j))?;
            a.swap_rows(j, pivot);
            b.swap_rows(j, pivot);
            for i in 0..n {
                if i != j && a.get(i, j) {
                    a.add_rows(j, i);
                    b.add_rows(j, i);
                }
            }
        }
        debug_assert!(a.is_identity());
        Some(b)
    }
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
