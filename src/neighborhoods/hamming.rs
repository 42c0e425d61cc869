use super::{sample_k_bits, Moves, Neighborhood};
use crate::bit_vector::{Generator, SparseBitVector};
use crate::error::Error;
use rand::Rng;

/// 汉明球：翻转的位数在 1 到 radius 之间均匀分布
#[derive(Debug, Clone)]
pub struct HammingBall {
    moves: Moves,
    radius: usize,
}

impl HammingBall {
    pub fn new(radius: usize) -> Result<Self, Error> {
        if radius == 0 {
            return Err("汉明球的半径必须为正数".into());
        }
        Ok(Self {
            moves: Moves::new(),
            radius,
        })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }
}

impl Neighborhood for HammingBall {
    fn moves(&self) -> &Moves {
        &self.moves
    }

    fn moves_mut(&mut self) -> &mut Moves {
        &mut self.moves
    }

    fn sample_bits(&self, n: usize, rng: &mut Generator, flipped_bits: &mut SparseBitVector) {
        assert!(self.radius <= n, "半径超过了位向量的长度");
        let k = rng.random_range(1..=self.radius);
        sample_k_bits(n, k, rng, flipped_bits);
    }
}

/// 汉明球面：恰好翻转 radius 位
#[derive(Debug, Clone)]
pub struct HammingSphere {
    moves: Moves,
    radius: usize,
}

impl HammingSphere {
    pub fn new(radius: usize) -> Result<Self, Error> {
        if radius == 0 {
            return Err("汉明球面的半径必须为正数".into());
        }
        Ok(Self {
            moves: Moves::new(),
            radius,
        })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }
}

impl Neighborhood for HammingSphere {
    fn moves(&self) -> &Moves {
        &self.moves
    }

    fn moves_mut(&mut self) -> &mut Moves {
        &mut self.moves
    }

    fn sample_bits(&self, n: usize, rng: &mut Generator, flipped_bits: &mut SparseBitVector) {
        assert!(self.radius <= n, "半径超过了位向量的长度");
        sample_k_bits(n, self.radius, rng, flipped_bits);
    }
}
