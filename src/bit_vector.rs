//! 位向量
//!
//! 搜索空间中的点都是定长的位向量，底层按字存储。稀疏位向量只记录下标，用来描述一次移动翻转了哪些位。

use crate::error::Error;
use bitvec::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::FromIterator;
use std::ops::Index;
use std::str::FromStr;

/// 所有需要随机性的组件共用的生成器类型，由调用者显式传入
pub type Generator = StdRng;

/// 用种子创建生成器；不给种子时从系统生成器取种
pub fn generator(seed: Option<u64>) -> Generator {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// 按升序排列的下标序列，表示被翻转的位
pub type SparseBitVector = Vec<usize>;

const WORD_SIZE: usize = usize::BITS as usize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitVector {
    bits: BitVec,
}

impl BitVector {
    /// 长度为 n 的全零向量
    pub fn zeros(n: usize) -> Self {
        Self { bits: bitvec![0; n] }
    }

    pub fn ones(n: usize) -> Self {
        Self { bits: bitvec![1; n] }
    }

    pub fn random(n: usize, rng: &mut Generator) -> Self {
        (0..n).map(|_| rng.random::<bool>()).collect()
    }

    /// 把 x 随机重新采样为均匀分布的向量
    pub fn randomize(&mut self, rng: &mut Generator) {
        for i in 0..self.len() {
            self.bits.set(i, rng.random::<bool>());
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        self.bits[i]
    }

    #[inline]
    pub fn set(&mut self, i: usize, value: bool) {
        self.bits.set(i, value);
    }

    #[inline]
    pub fn flip(&mut self, i: usize) {
        let value = self.bits[i];
        self.bits.set(i, !value);
    }

    /// 翻转稀疏位向量中列出的所有位
    pub fn flip_bits(&mut self, flipped_bits: &[usize]) {
        for &i in flipped_bits {
            self.flip(i);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }

    pub fn as_bitslice(&self) -> &BitSlice {
        self.bits.as_bitslice()
    }

    pub fn hamming_weight(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn hamming_distance(&self, other: &BitVector) -> usize {
        assert_eq!(self.len(), other.len());
        self.zip_words(other)
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum()
    }

    pub fn is_zero(&self) -> bool {
        self.bits.not_any()
    }

    /// GF(2) 上的加法，即逐位异或
    pub fn add_assign(&mut self, other: &BitVector) {
        assert_eq!(self.len(), other.len());
        self.bits ^= other.bits.as_bitslice();
    }

    /// GF(2) 上的内积
    pub fn dot(&self, other: &BitVector) -> bool {
        assert_eq!(self.len(), other.len());
        self.zip_words(other)
            .fold(0, |acc, (a, b)| acc ^ (a & b).count_ones())
            % 2
            == 1
    }

    /// 与另一个向量不同的位
    pub fn difference(&self, other: &BitVector) -> SparseBitVector {
        let mut sum = self.clone();
        sum.add_assign(other);
        sum.to_sparse()
    }

    pub fn to_sparse(&self) -> SparseBitVector {
        self.bits.iter_ones().collect()
    }

    /// 逐字读出两个等长向量，最后一个字只含有效位
    fn zip_words<'a>(
        &'a self,
        other: &'a BitVector,
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.bits
            .chunks(WORD_SIZE)
            .zip(other.bits.chunks(WORD_SIZE))
            .map(|(a, b)| (a.load_le::<usize>(), b.load_le::<usize>()))
    }
}

impl From<Vec<bool>> for BitVector {
    fn from(bits: Vec<bool>) -> Self {
        bits.into_iter().collect()
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for BitVector {
    type Output = bool;

    fn index(&self, i: usize) -> &bool {
        &self.bits[i]
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.iter() {
            write!(f, "{}", if b { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl FromStr for BitVector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(Error::from(format!("位向量中出现了非法字符 {c:?}"))),
            })
            .collect()
    }
}

impl Serialize for BitVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BitVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: Error| serde::de::Error::custom(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let x: BitVector = "0110 1".parse().unwrap();
        assert_eq!(x.len(), 5);
        assert_eq!(x.to_string(), "01101");
        assert_eq!(x.to_sparse(), vec![1, 2, 4]);
        assert!("0120".parse::<BitVector>().is_err());
    }

    #[test]
    fn operations_span_several_words() {
        let mut rng = generator(Some(3));
        let x = BitVector::random(150, &mut rng);
        let y = BitVector::random(150, &mut rng);
        let naive_dot = x
            .iter()
            .zip(y.iter())
            .fold(false, |acc, (a, b)| acc ^ (a && b));
        assert_eq!(x.dot(&y), naive_dot);
        let naive_distance = x.iter().zip(y.iter()).filter(|(a, b)| a != b).count();
        assert_eq!(x.hamming_distance(&y), naive_distance);
        assert_eq!(x.difference(&y).len(), naive_distance);
        let mut z = x.clone();
        z.add_assign(&y);
        z.add_assign(&y);
        assert_eq!(z, x);
        assert_eq!(BitVector::ones(150).hamming_weight(), 150);
        assert!(BitVector::zeros(150).is_zero());
    }

    #[test]
    fn dot_is_parity_of_and() {
        let x: BitVector = "1101".parse().unwrap();
        let y: BitVector = "1011".parse().unwrap();
        assert!(!x.dot(&y));
        let z: BitVector = "1000".parse().unwrap();
        assert!(x.dot(&z));
    }
}
