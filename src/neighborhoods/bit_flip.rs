use super::{sample_k_bits, Moves, Neighborhood};
use crate::bit_vector::{Generator, SparseBitVector};
use crate::error::Error;
use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// 均匀随机地翻转一位
#[derive(Debug, Clone, Default)]
pub struct SingleBitFlip {
    moves: Moves,
}

impl SingleBitFlip {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Neighborhood for SingleBitFlip {
    fn moves(&self) -> &Moves {
        &self.moves
    }

    fn moves_mut(&mut self) -> &mut Moves {
        &mut self.moves
    }

    fn sample_bits(&self, n: usize, rng: &mut Generator, flipped_bits: &mut SparseBitVector) {
        assert!(n > 0);
        flipped_bits.push(rng.random_range(0..n));
    }
}

/// 标准位变异：每一位独立地以概率 p 翻转
///
/// 默认不允许一位都不翻转，此时重复采样直到至少翻转一位。
/// p < 1/√n 时先按二项分布抽取翻转的位数，再不放回地抽取位置；否则逐位做伯努利试验。
#[derive(Debug, Clone)]
pub struct StandardBitMutation {
    moves: Moves,
    expected_flips: f64,
    allow_no_mutation: bool,
}

impl StandardBitMutation {
    /// 以期望翻转位数表示的变异率，每一位的翻转概率为 expected_flips / n
    pub fn with_expected_flips(expected_flips: f64) -> Result<Self, Error> {
        if !(expected_flips > 0.0) {
            return Err(format!("期望翻转位数 {expected_flips} 必须为正数").into());
        }
        Ok(Self {
            moves: Moves::new(),
            expected_flips,
            allow_no_mutation: false,
        })
    }

    pub fn with_probability(probability: f64, n: usize) -> Result<Self, Error> {
        if !(probability > 0.0 && probability <= 1.0) {
            return Err(format!("翻转概率 {probability} 必须在 (0, 1] 之间").into());
        }
        Self::with_expected_flips(probability * n as f64)
    }

    pub fn allow_no_mutation(mut self, allow_no_mutation: bool) -> Self {
        self.allow_no_mutation = allow_no_mutation;
        self
    }

    pub fn probability(&self, n: usize) -> f64 {
        (self.expected_flips / n as f64).min(1.0)
    }

    fn sample_once(&self, n: usize, p: f64, rng: &mut Generator, flipped_bits: &mut SparseBitVector) {
        if p < 1.0 / (n as f64).sqrt() {
            let k = match Binomial::new(n as u64, p) {
                Ok(binomial) => binomial.sample(rng) as usize,
                Err(_) => 0,
            };
            sample_k_bits(n, k, rng, flipped_bits);
        } else {
            flipped_bits.extend((0..n).filter(|_| rng.random_bool(p)));
        }
    }
}

impl Neighborhood for StandardBitMutation {
    fn moves(&self) -> &Moves {
        &self.moves
    }

    fn moves_mut(&mut self) -> &mut Moves {
        &mut self.moves
    }

    fn sample_bits(&self, n: usize, rng: &mut Generator, flipped_bits: &mut SparseBitVector) {
        assert!(n > 0);
        let p = self.probability(n);
        loop {
            flipped_bits.clear();
            self.sample_once(n, p, rng, flipped_bits);
            if self.allow_no_mutation || !flipped_bits.is_empty() {
                return;
            }
        }
    }
}
