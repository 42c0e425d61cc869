//! 邻域迭代器：不采样，而是按确定的顺序枚举整个邻域，每个邻居恰好出现一次
//!
//! 翻转的位集合按半径从小到大、同一半径内按字典序枚举。

use crate::bit_vector::BitVector;
use crate::error::Error;

/// 枚举的状态：当前翻转的位组合以及对应的候选点
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    origin: BitVector,
    candidate: BitVector,
    combination: Vec<usize>,
    min_radius: usize,
    max_radius: usize,
    started: bool,
}

impl Enumeration {
    fn new(min_radius: usize, max_radius: usize) -> Self {
        Self {
            min_radius,
            max_radius,
            ..Self::default()
        }
    }

    fn n(&self) -> usize {
        self.origin.len()
    }

    /// 同一半径内的下一个组合
    fn has_successor(&self) -> bool {
        let n = self.n();
        let k = self.combination.len();
        (0..k).any(|i| self.combination[i] < n - k + i)
    }

    fn advance(&mut self) -> bool {
        let n = self.n();
        let k = self.combination.len();
        match (0..k).rev().find(|&i| self.combination[i] < n - k + i) {
            Some(i) => {
                self.combination[i] += 1;
                for j in i + 1..k {
                    self.combination[j] = self.combination[j - 1] + 1;
                }
                true
            }
            None => false,
        }
    }

    fn restore_candidate(&mut self) {
        if self.started {
            self.candidate.flip_bits(&self.combination);
        }
    }
}

/// 邻域迭代器的公共接口
pub trait NeighborhoodIterator: Send {
    fn enumeration(&self) -> &Enumeration;

    fn enumeration_mut(&mut self) -> &mut Enumeration;

    fn set_origin(&mut self, x: &BitVector) {
        let e = self.enumeration_mut();
        assert!(e.max_radius <= x.len(), "半径超过了位向量的长度");
        e.origin.clone_from(x);
        e.candidate.clone_from(x);
        e.combination.clear();
        e.started = false;
    }

    fn origin(&self) -> &BitVector {
        &self.enumeration().origin
    }

    /// 从头开始枚举
    fn init(&mut self) {
        let e = self.enumeration_mut();
        e.restore_candidate();
        e.combination.clear();
        e.started = false;
    }

    fn has_next(&self) -> bool {
        let e = self.enumeration();
        if !e.started {
            return e.min_radius <= e.n();
        }
        e.has_successor() || e.combination.len() < e.max_radius
    }

    /// 下一个邻居
    #[allow(clippy::should_implement_trait)]
    fn next(&mut self) -> &BitVector {
        assert!(self.has_next(), "邻域已经枚举完毕");
        let e = self.enumeration_mut();
        e.restore_candidate();
        if !e.started {
            e.combination = (0..e.min_radius).collect();
            e.started = true;
        } else if !e.advance() {
            let k = e.combination.len() + 1;
            e.combination = (0..k).collect();
        }
        e.candidate.flip_bits(&e.combination);
        &e.candidate
    }

    /// 最近一次 next 返回的邻居
    fn candidate(&self) -> &BitVector {
        &self.enumeration().candidate
    }

    /// 当前邻居相对原点翻转的位
    fn flipped_bits(&self) -> &[usize] {
        &self.enumeration().combination
    }
}

/// 依次翻转每一位
#[derive(Debug, Clone)]
pub struct SingleBitFlipIterator {
    enumeration: Enumeration,
}

impl SingleBitFlipIterator {
    pub fn new(n: usize) -> Self {
        let mut enumeration = Enumeration::new(1, 1);
        enumeration.origin = BitVector::zeros(n);
        enumeration.candidate = BitVector::zeros(n);
        Self { enumeration }
    }
}

impl NeighborhoodIterator for SingleBitFlipIterator {
    fn enumeration(&self) -> &Enumeration {
        &self.enumeration
    }

    fn enumeration_mut(&mut self) -> &mut Enumeration {
        &mut self.enumeration
    }
}

/// 枚举与原点距离恰好为 radius 的所有点
#[derive(Debug, Clone)]
pub struct HammingSphereIterator {
    enumeration: Enumeration,
}

impl HammingSphereIterator {
    pub fn new(n: usize, radius: usize) -> Result<Self, Error> {
        if radius == 0 || radius > n {
            return Err(format!("汉明球面的半径 {radius} 必须在 1 到 {n} 之间").into());
        }
        let mut enumeration = Enumeration::new(radius, radius);
        enumeration.origin = BitVector::zeros(n);
        enumeration.candidate = BitVector::zeros(n);
        Ok(Self { enumeration })
    }
}

impl NeighborhoodIterator for HammingSphereIterator {
    fn enumeration(&self) -> &Enumeration {
        &self.enumeration
    }

    fn enumeration_mut(&mut self) -> &mut Enumeration {
        &mut self.enumeration
    }
}

/// 枚举与原点距离在 1 到 radius 之间的所有点
#[derive(Debug, Clone)]
pub struct HammingBallIterator {
    enumeration: Enumeration,
}

impl HammingBallIterator {
    pub fn new(n: usize, radius: usize) -> Result<Self, Error> {
        if radius == 0 || radius > n {
            return Err(format!("汉明球的半径 {radius} 必须在 1 到 {n} 之间").into());
        }
        let mut enumeration = Enumeration::new(1, radius);
        enumeration.origin = BitVector::zeros(n);
        enumeration.candidate = BitVector::zeros(n);
        Ok(Self { enumeration })
    }
}

impl NeighborhoodIterator for HammingBallIterator {
    fn enumeration(&self) -> &Enumeration {
        &self.enumeration
    }

    fn enumeration_mut(&mut self) -> &mut Enumeration {
        &mut self.enumeration
    }
}
