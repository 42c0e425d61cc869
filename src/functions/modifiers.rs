//! 修饰器：改变输入或者函数值，但不限制调用

use super::expression::Expression;
use super::Function;
use crate::bit_vector::{BitVector, Generator};
use crate::error::{Error, Stop};
use crate::maps::Map;
use crate::neighborhoods::Neighborhood;
use rand_distr::{Distribution, Normal};
use std::io;
use std::sync::Arc;

/// f ∘ g：先用映射变换输入，再交给函数求值
///
/// 复合后函数的长度变为映射的输入长度。映射在各线程之间只读共享。
pub struct FunctionMapComposition {
    function: Box<dyn Function>,
    map: Arc<dyn Map>,
}

impl FunctionMapComposition {
    pub fn new(function: Box<dyn Function>, map: Arc<dyn Map>) -> Result<Self, Error> {
        if map.output_size() != function.bv_size() {
            return Err(format!(
                "映射的输出长度 {} 与函数的长度 {} 不一致",
                map.output_size(),
                function.bv_size()
            )
            .into());
        }
        Ok(Self { function, map })
    }

    pub fn map(&self) -> &dyn Map {
        self.map.as_ref()
    }
}

impl Function for FunctionMapComposition {
    fn bv_size(&self) -> usize {
        self.map.input_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        let y = self.map.map(x);
        self.function.evaluate(&y)
    }

    /// 映射是满射时，复合函数与原函数有相同的最大值
    fn maximum(&self) -> Option<f64> {
        if self.map.is_surjective() {
            self.function.maximum()
        } else {
            None
        }
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(&self.map.map(x), sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "FunctionMapComposition:")?;
        self.function.display(sink)?;
        self.map.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }
}

/// 先验噪声：在求值之前用邻域随机扰动输入
pub struct PriorNoise {
    function: Box<dyn Function>,
    neighborhood: Box<dyn Neighborhood>,
    rng: Generator,
    noisy: BitVector,
}

impl PriorNoise {
    pub fn new(
        function: Box<dyn Function>,
        neighborhood: Box<dyn Neighborhood>,
        rng: Generator,
    ) -> Self {
        let noisy = BitVector::zeros(function.bv_size());
        Self {
            function,
            neighborhood,
            rng,
            noisy,
        }
    }
}

impl Function for PriorNoise {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        self.neighborhood.map(x, &mut self.noisy, &mut self.rng);
        self.function.evaluate(&self.noisy)
    }

    fn maximum(&self) -> Option<f64> {
        self.function.maximum()
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "PriorNoise:")?;
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }
}

/// 用表达式变换函数值，表达式中的 x 代表内层函数的值
pub struct ExpressionModifier {
    function: Box<dyn Function>,
    expression: Expression,
}

impl ExpressionModifier {
    pub fn new(function: Box<dyn Function>, expression: &str) -> Result<Self, Error> {
        Ok(Self {
            function,
            expression: Expression::parse(expression)?,
        })
    }
}

impl Function for ExpressionModifier {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        let value = self.function.evaluate(x)?;
        Ok(self.expression.eval(value))
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "ExpressionModifier: {}", self.expression)?;
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }
}

/// 取负，用来求最小值
pub struct Negation {
    function: Box<dyn Function>,
}

impl Negation {
    pub fn new(function: Box<dyn Function>) -> Self {
        Self { function }
    }
}

impl Function for Negation {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        Ok(-self.function.evaluate(x)?)
    }

    fn evaluate_incrementally(
        &mut self,
        x: &BitVector,
        value: f64,
        flipped_bits: &[usize],
    ) -> Result<f64, Stop> {
        Ok(-self
            .function
            .evaluate_incrementally(x, -value, flipped_bits)?)
    }

    fn provides_incremental_evaluation(&self) -> bool {
        self.function.provides_incremental_evaluation()
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "Negation:")?;
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }
}

/// 在函数值上叠加正态分布 N(0, σ²) 的噪声
pub struct AdditiveGaussianNoise {
    function: Box<dyn Function>,
    normal: Normal<f64>,
    rng: Generator,
}

impl AdditiveGaussianNoise {
    pub fn new(function: Box<dyn Function>, stddev: f64, rng: Generator) -> Result<Self, Error> {
        let normal = Normal::new(0.0, stddev)
            .map_err(|e| Error::from(format!("噪声的标准差 {stddev} 不合法：{e}")))?;
        Ok(Self {
            function,
            normal,
            rng,
        })
    }
}

impl Function for AdditiveGaussianNoise {
    fn bv_size(&self) -> usize {
        self.function.bv_size()
    }

    fn evaluate(&mut self, x: &BitVector) -> Result<f64, Stop> {
        let value = self.function.evaluate(x)?;
        Ok(value + self.normal.sample(&mut self.rng))
    }

    fn describe(&self, x: &BitVector, sink: &mut dyn io::Write) -> io::Result<()> {
        self.function.describe(x, sink)
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "AdditiveGaussianNoise:")?;
        self.function.display(sink)
    }

    fn decorated(&self) -> Option<&dyn Function> {
        Some(self.function.as_ref())
    }
}
