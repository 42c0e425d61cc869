//! 搜索空间的变换
//!
//! 所有映射都把长度为 input_size 的位向量变为长度为 output_size 的位向量。
//! 线性和仿射映射都定义在 GF(2) 上，加法是异或，乘法是与。

use crate::bit_vector::BitVector;
use crate::error::Error;
use itertools::Itertools;
use std::io;

pub mod archive;
pub mod linear;
pub mod permutation;
pub mod translation;
pub mod transvection;

pub use archive::{load, save, MapArchive};
pub use linear::{AffineMap, LinearMap};
pub use permutation::Permutation;
pub use translation::Translation;
pub use transvection::{SamplingMode, Transvection, TransvectionSequence, TsAffineMap};

/// 映射的公共接口
///
/// 映射一旦构造完成就是只读的，可以在多个线程之间共享。
pub trait Map: Send + Sync {
    /// 把 input 的像写入 output，output 的长度必须等于 output_size
    fn map_into(&self, input: &BitVector, output: &mut BitVector);

    fn map(&self, input: &BitVector) -> BitVector {
        let mut output = BitVector::zeros(self.output_size());
        self.map_into(input, &mut output);
        output
    }

    fn input_size(&self) -> usize;

    fn output_size(&self) -> usize;

    /// 像是否覆盖整个输出空间
    fn is_surjective(&self) -> bool;

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()>;

    /// 转为可以序列化的记录
    fn to_archive(&self) -> MapArchive;
}

/// 复合映射 outer ∘ inner
pub struct MapComposition {
    outer: Box<dyn Map>,
    inner: Box<dyn Map>,
}

impl MapComposition {
    pub fn new(outer: Box<dyn Map>, inner: Box<dyn Map>) -> Self {
        assert_eq!(
            outer.input_size(),
            inner.output_size(),
            "复合映射的尺寸不匹配"
        );
        Self { outer, inner }
    }

    pub fn outer(&self) -> &dyn Map {
        self.outer.as_ref()
    }

    pub fn inner(&self) -> &dyn Map {
        self.inner.as_ref()
    }
}

impl Map for MapComposition {
    fn map_into(&self, input: &BitVector, output: &mut BitVector) {
        let intermediate = self.inner.map(input);
        self.outer.map_into(&intermediate, output);
    }

    fn input_size(&self) -> usize {
        self.inner.input_size()
    }

    fn output_size(&self) -> usize {
        self.outer.output_size()
    }

    /// 两个分量都是满射时复合也是满射；反之不一定成立，这里不做更细的判断
    fn is_surjective(&self) -> bool {
        self.outer.is_surjective() && self.inner.is_surjective()
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "MapComposition:")?;
        self.outer.display(sink)?;
        self.inner.display(sink)
    }

    fn to_archive(&self) -> MapArchive {
        MapArchive::Composition {
            outer: Box::new(self.outer.to_archive()),
            inner: Box::new(self.inner.to_archive()),
        }
    }
}

/// 嵌入：把输入的第 i 位写到输出的 bit_positions[i] 位，其余位保持不变
#[derive(Debug, Clone)]
pub struct Injection {
    bit_positions: Vec<usize>,
    output_size: usize,
}

impl Injection {
    pub fn new(bit_positions: Vec<usize>, output_size: usize) -> Result<Self, Error> {
        if output_size < bit_positions.len() {
            return Err("嵌入的输出长度不能小于输入长度".into());
        }
        if bit_positions.iter().any(|&p| p >= output_size) {
            return Err("嵌入的位置超出了输出长度".into());
        }
        if !bit_positions.iter().all_unique() {
            return Err("嵌入的位置不能重复".into());
        }
        Ok(Self {
            bit_positions,
            output_size,
        })
    }

    pub fn bit_positions(&self) -> &[usize] {
        &self.bit_positions
    }
}

impl Map for Injection {
    fn map_into(&self, input: &BitVector, output: &mut BitVector) {
        assert_eq!(input.len(), self.bit_positions.len());
        assert_eq!(output.len(), self.output_size);
        for (i, &position) in self.bit_positions.iter().enumerate() {
            output.set(position, input[i]);
        }
    }

    fn input_size(&self) -> usize {
        self.bit_positions.len()
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn is_surjective(&self) -> bool {
        self.bit_positions.len() == self.output_size
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "Injection {:?} -> {}", self.bit_positions, self.output_size)
    }

    fn to_archive(&self) -> MapArchive {
        MapArchive::Injection {
            bit_positions: self.bit_positions.clone(),
            output_size: self.output_size,
        }
    }
}

/// 投影：输出的第 i 位取输入的 bit_positions[i] 位
#[derive(Debug, Clone)]
pub struct Projection {
    bit_positions: Vec<usize>,
    input_size: usize,
}

impl Projection {
    pub fn new(bit_positions: Vec<usize>, input_size: usize) -> Result<Self, Error> {
        if input_size < bit_positions.len() {
            return Err("投影的输入长度不能小于输出长度".into());
        }
        if bit_positions.iter().any(|&p| p >= input_size) {
            return Err("投影的位置超出了输入长度".into());
        }
        Ok(Self {
            bit_positions,
            input_size,
        })
    }

    pub fn bit_positions(&self) -> &[usize] {
        &self.bit_positions
    }
}

impl Map for Projection {
    fn map_into(&self, input: &BitVector, output: &mut BitVector) {
        assert_eq!(input.len(), self.input_size);
        assert_eq!(output.len(), self.bit_positions.len());
        for (i, &position) in self.bit_positions.iter().enumerate() {
            output.set(i, input[position]);
        }
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.bit_positions.len()
    }

    /// 位置重复时输出中有相等的位
    fn is_surjective(&self) -> bool {
        self.bit_positions.iter().all_unique()
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "Projection {} -> {:?}", self.input_size, self.bit_positions)
    }

    fn to_archive(&self) -> MapArchive {
        MapArchive::Projection {
            bit_positions: self.bit_positions.clone(),
            input_size: self.input_size,
        }
    }
}
