//! 邻域
//!
//! 邻域保存一个原点和一个候选点。`propose` 在原点附近随机翻转若干位得到候选点，
//! 之后必须恰好调用一次 `keep`（候选点成为新的原点）或 `forget`（撤销候选点）。
//! 两次调用都只需要重新翻转那几位，不需要复制整个位向量。
//! 翻转的位以稀疏位向量的形式提供给支持增量求值的函数。

use crate::bit_vector::{BitVector, Generator, SparseBitVector};
use crate::config::{IteratorConfig, NeighborhoodConfig};
use crate::error::Error;
use rand::seq::index;

pub mod bit_flip;
pub mod hamming;
pub mod iterators;

pub use bit_flip::{SingleBitFlip, StandardBitMutation};
pub use hamming::{HammingBall, HammingSphere};
pub use iterators::{
    HammingBallIterator, HammingSphereIterator, NeighborhoodIterator, SingleBitFlipIterator,
};

/// 邻域的公共状态
#[derive(Debug, Clone, Default)]
pub struct Moves {
    origin: BitVector,
    candidate: BitVector,
    flipped_bits: SparseBitVector,
    pending: bool,
}

impl Moves {
    pub fn new() -> Self {
        Self::default()
    }
}

pub trait Neighborhood: Send {
    fn moves(&self) -> &Moves;

    fn moves_mut(&mut self) -> &mut Moves;

    /// 为长度为 n 的位向量采样要翻转的位，按升序写入 flipped_bits
    fn sample_bits(&self, n: usize, rng: &mut Generator, flipped_bits: &mut SparseBitVector);

    fn set_origin(&mut self, x: &BitVector) {
        let moves = self.moves_mut();
        moves.origin.clone_from(x);
        moves.candidate.clone_from(x);
        moves.flipped_bits.clear();
        moves.pending = false;
    }

    fn origin(&self) -> &BitVector {
        &self.moves().origin
    }

    fn candidate(&self) -> &BitVector {
        &self.moves().candidate
    }

    /// 最近一次采样翻转的位
    fn flipped_bits(&self) -> &[usize] {
        &self.moves().flipped_bits
    }

    fn propose(&mut self, rng: &mut Generator) {
        let n = {
            let moves = self.moves();
            assert!(!moves.pending, "上一个候选点还没有处理");
            debug_assert_eq!(moves.origin, moves.candidate);
            moves.origin.len()
        };
        let mut flipped_bits = std::mem::take(&mut self.moves_mut().flipped_bits);
        flipped_bits.clear();
        self.sample_bits(n, rng, &mut flipped_bits);
        let moves = self.moves_mut();
        moves.candidate.flip_bits(&flipped_bits);
        moves.flipped_bits = flipped_bits;
        moves.pending = true;
    }

    /// 接受候选点
    fn keep(&mut self) {
        let moves = self.moves_mut();
        assert!(moves.pending, "没有待处理的候选点");
        moves.origin.flip_bits(&moves.flipped_bits);
        moves.pending = false;
    }

    /// 放弃候选点
    fn forget(&mut self) {
        let moves = self.moves_mut();
        assert!(moves.pending, "没有待处理的候选点");
        moves.candidate.flip_bits(&moves.flipped_bits);
        moves.pending = false;
    }

    /// 对任意位向量做一次随机移动，与原点无关
    fn mutate(&mut self, bv: &mut BitVector, rng: &mut Generator) {
        assert!(!self.moves().pending, "上一个候选点还没有处理");
        let mut flipped_bits = std::mem::take(&mut self.moves_mut().flipped_bits);
        flipped_bits.clear();
        self.sample_bits(bv.len(), rng, &mut flipped_bits);
        bv.flip_bits(&flipped_bits);
        self.moves_mut().flipped_bits = flipped_bits;
    }

    /// output = input 做一次随机移动
    fn map(&mut self, input: &BitVector, output: &mut BitVector, rng: &mut Generator) {
        output.clone_from(input);
        self.mutate(output, rng);
    }
}

/// 从 n 个位中不放回地均匀抽取 k 个，升序写入 flipped_bits
pub(crate) fn sample_k_bits(
    n: usize,
    k: usize,
    rng: &mut Generator,
    flipped_bits: &mut SparseBitVector,
) {
    assert!(k <= n);
    flipped_bits.extend(index::sample(rng, n, k).into_iter());
    flipped_bits.sort_unstable();
}

/// 邻域作用在长度为 n 的位向量上，半径不能超过 n
pub fn make_neighborhood(
    config: &NeighborhoodConfig,
    n: usize,
) -> Result<Box<dyn Neighborhood>, Error> {
    match config {
        NeighborhoodConfig::HammingBall { radius } | NeighborhoodConfig::HammingSphere { radius }
            if *radius > n =>
        {
            return Err(format!("邻域的半径 {radius} 超过了位向量的长度 {n}").into());
        }
        _ => {}
    }
    let neighborhood: Box<dyn Neighborhood> = match config {
        NeighborhoodConfig::SingleBitFlip => Box::new(SingleBitFlip::new()),
        NeighborhoodConfig::StandardBitMutation {
            rate,
            allow_no_mutation,
        } => Box::new(
            StandardBitMutation::with_expected_flips(rate.unwrap_or(1.0))?
                .allow_no_mutation(*allow_no_mutation),
        ),
        NeighborhoodConfig::HammingBall { radius } => Box::new(HammingBall::new(*radius)?),
        NeighborhoodConfig::HammingSphere { radius } => Box::new(HammingSphere::new(*radius)?),
    };
    Ok(neighborhood)
}

pub fn make_iterator(
    config: &IteratorConfig,
    n: usize,
) -> Result<Box<dyn NeighborhoodIterator>, Error> {
    let iterator: Box<dyn NeighborhoodIterator> = match config {
        IteratorConfig::SingleBitFlip => Box::new(SingleBitFlipIterator::new(n)),
        IteratorConfig::HammingSphere { radius } => {
            Box::new(HammingSphereIterator::new(n, *radius)?)
        }
        IteratorConfig::HammingBall { radius } => Box::new(HammingBallIterator::new(n, *radius)?),
    };
    Ok(iterator)
}
