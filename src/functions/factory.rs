//! 按配置组装求值链
//!
//! 组装顺序固定，从内到外依次为：具体函数、映射复合、先验噪声、表达式、取负、高斯噪声、
//! 进度记录、预算与缓存、达到最大值或目标时停止。

use super::collection::{FunctionArchive, LeadingOnes, LinearFunction, OneMax};
use super::controllers::{
    Cache, OnBudgetFunction, ProgressTracker, StopOnMaximum, StopOnTarget,
};
use super::modifiers::{
    AdditiveGaussianNoise, ExpressionModifier, FunctionMapComposition, Negation, PriorNoise,
};
use super::Function;
use crate::bit_vector::{generator, Generator};
use crate::config::{ControllerConfig, FunctionConfig, MapConfig, MapType, ModifierConfig};
use crate::error::Error;
use crate::maps::{
    self, AffineMap, LinearMap, Map, MapComposition, Permutation, Translation, TsAffineMap,
};
use crate::neighborhoods::make_neighborhood;
use rand::Rng;
use std::sync::Arc;
use tracing::warn;

/// 生成最内层的具体函数
///
/// 同一个工厂用同样状态的生成器调用多次，必须得到相同的函数。
pub trait FunctionFactory {
    fn make(&self, rng: &mut Generator) -> Result<Box<dyn Function>, Error>;
}

impl FunctionFactory for FunctionConfig {
    fn make(&self, rng: &mut Generator) -> Result<Box<dyn Function>, Error> {
        let function: Box<dyn Function> = match self {
            FunctionConfig::OneMax { size } => Box::new(OneMax::new(*size)),
            FunctionConfig::Linear { weights: Some(weights), .. } => {
                Box::new(LinearFunction::new(weights.clone()))
            }
            FunctionConfig::Linear { size: Some(size), weights: None } => {
                Box::new(LinearFunction::random(*size, rng))
            }
            FunctionConfig::Linear { .. } => {
                return Err("线性函数需要给出 weights 或者 size".into());
            }
            FunctionConfig::LeadingOnes { size } => Box::new(LeadingOnes::new(*size)),
            FunctionConfig::Load { path } => FunctionArchive::load(path)?.into_function(),
        };
        Ok(function)
    }
}

/// 按配置组装的求值链工厂
///
/// 映射只采样一次，由所有线程的求值链只读共享。
pub struct DecoratedFunctionFactory<'a> {
    factory: &'a dyn FunctionFactory,
    modifiers: ModifierConfig,
    controllers: ControllerConfig,
    seed: u64,
    map: Option<Arc<dyn Map>>,
}

impl<'a> DecoratedFunctionFactory<'a> {
    pub fn new(
        factory: &'a dyn FunctionFactory,
        map: Option<&MapConfig>,
        modifiers: ModifierConfig,
        controllers: ControllerConfig,
        seed: u64,
    ) -> Result<Self, Error> {
        let mut rng = generator(Some(seed));
        let probe = factory.make(&mut rng)?;
        let map = match map {
            Some(config) => Some(make_map(config, probe.bv_size(), &mut rng)?),
            None => None,
        };
        Ok(Self {
            factory,
            modifiers,
            controllers,
            seed,
            map,
        })
    }

    pub fn map(&self) -> Option<&Arc<dyn Map>> {
        self.map.as_ref()
    }

    /// 第 index 个线程的修饰器链
    ///
    /// 具体函数总是用同一个种子生成，保证各线程计算的是同一个函数；噪声的种子各不相同。
    pub fn make_function_modifier(&self, index: usize) -> Result<Box<dyn Function>, Error> {
        let mut rng = generator(Some(self.seed));
        let mut function = self.factory.make(&mut rng)?;
        if let Some(map) = &self.map {
            function = Box::new(FunctionMapComposition::new(function, Arc::clone(map))?);
        }
        let noise_seed = self.seed.wrapping_add(1 + index as u64);
        let mut noise_rng = generator(Some(noise_seed));
        if let Some(config) = &self.modifiers.prior_noise {
            let neighborhood = make_neighborhood(config, function.bv_size())?;
            let rng = generator(Some(noise_rng.random()));
            function = Box::new(PriorNoise::new(function, neighborhood, rng));
        }
        if let Some(expression) = &self.modifiers.expression {
            function = Box::new(ExpressionModifier::new(function, expression)?);
        }
        if self.modifiers.negation {
            function = Box::new(Negation::new(function));
        }
        if let Some(stddev) = self.modifiers.additive_gaussian_noise {
            let rng = generator(Some(noise_rng.random()));
            function = Box::new(AdditiveGaussianNoise::new(function, stddev, rng)?);
        }
        Ok(function)
    }

    /// 在修饰器链外面套上控制器
    pub fn make_function_controller(
        &self,
        function: Box<dyn Function>,
    ) -> Result<Box<dyn Function>, Error> {
        let config = &self.controllers;
        let mut function: Box<dyn Function> = Box::new(
            ProgressTracker::new(function)
                .with_log_improvement(config.log_improvement)
                .with_record_evaluation_time(config.record_evaluation_time),
        );
        function = match (config.budget > 0, config.cache) {
            (false, false) => function,
            (true, false) => Box::new(OnBudgetFunction::new(function, config.budget)),
            (false, true) => Box::new(Cache::new(function)),
            // 缓存命中也计入预算
            (true, true) if config.cache_budget => Box::new(OnBudgetFunction::new(
                Box::new(Cache::new(function)),
                config.budget,
            )),
            // 只有真正的求值计入预算
            (true, true) => Box::new(Cache::new(Box::new(OnBudgetFunction::new(
                function,
                config.budget,
            )))),
        };
        if config.stop_on_maximum {
            function = Box::new(StopOnMaximum::new(function)?);
        } else if let Some(target) = config.target {
            function = Box::new(StopOnTarget::new(function, target));
        }
        Ok(function)
    }

    /// 每个线程一条求值链，只有第一条带有控制器
    pub fn make_functions(&self, num_threads: usize) -> Result<Vec<Box<dyn Function>>, Error> {
        let mut functions = Vec::with_capacity(num_threads.max(1));
        functions.push(self.make_function_controller(self.make_function_modifier(0)?)?);
        for index in 1..num_threads {
            functions.push(self.make_function_modifier(index)?);
        }
        Ok(functions)
    }
}

/// 按配置采样映射，映射的输出长度等于函数的长度 n
pub fn make_map(
    config: &MapConfig,
    n: usize,
    rng: &mut Generator,
) -> Result<Arc<dyn Map>, Error> {
    let square = matches!(
        config.r#type,
        MapType::Translation
            | MapType::Permutation
            | MapType::PermutationTranslation
            | MapType::TsAffine
    );
    if square {
        if let Some(input_size) = config.input_size {
            if input_size != n {
                warn!("映射的输入长度 {input_size} 被忽略，使用函数的长度 {n}");
            }
        }
    }
    let map: Arc<dyn Map> = match config.r#type {
        MapType::Translation => Arc::new(Translation::random(n, rng)),
        MapType::Permutation => Arc::new(Permutation::random(n, rng)),
        MapType::PermutationTranslation => {
            let permutation = Permutation::random(n, rng);
            let translation = Translation::random(n, rng);
            Arc::new(MapComposition::new(
                Box::new(permutation),
                Box::new(translation),
            ))
        }
        MapType::Linear => {
            let input_size = config.input_size.unwrap_or(n);
            Arc::new(LinearMap::random(n, input_size, config.surjective, rng)?)
        }
        MapType::Affine => {
            let input_size = config.input_size.unwrap_or(n);
            Arc::new(AffineMap::random(n, input_size, config.surjective, rng)?)
        }
        MapType::TsAffine => {
            if n < 2 {
                return Err("初等变换序列要求函数长度至少为 2".into());
            }
            let length = config.length.unwrap_or(n);
            let mode = config.sampling_mode.unwrap_or_default();
            Arc::new(TsAffineMap::random(n, length, mode, rng))
        }
        MapType::Load => {
            let path = config
                .path
                .as_ref()
                .ok_or_else(|| Error::from("载入映射需要给出 path"))?;
            let map = maps::load(path)?;
            if map.output_size() != n {
                return Err(format!(
                    "映射的输出长度 {} 与函数的长度 {n} 不一致",
                    map.output_size()
                )
                .into());
            }
            Arc::from(map)
        }
    };
    Ok(map)
}
