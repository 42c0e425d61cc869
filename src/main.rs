//! hnco: 位向量黑盒优化［命令行版］
//!
//! 用户提供 YAML 配置文件，本程序按配置组装目标函数、映射、修饰器和控制器，运行指定的算法并输出结果。

use clap::Parser;
use hnco::algorithms::make_algorithm;
use hnco::config::Config;
use hnco::functions::DecoratedFunctionFactory;
use hnco::interfaces::{Interface, Message};
use hnco::{
    generator, search, BitVector, Command, CommandLine, CommandLineArgs, Error, Function, Map,
};
use std::io;

fn describe(function: &dyn Function, x: &BitVector) -> Result<String, Error> {
    let mut buffer = Vec::new();
    function.describe(x, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn run_optimization(
    config: &Config,
    factory: &DecoratedFunctionFactory,
    cli: &CommandLine,
    seed: u64,
) -> Result<(), Error> {
    let mut functions = factory.make_functions(config.threads)?;
    let n = functions[0].bv_size();
    let mut algorithm = make_algorithm(&config.algorithm, n, config.threads)?;
    let mut rng = generator(Some(seed));
    let report = search::run(algorithm.as_mut(), &mut functions, &mut rng);
    let point = &report.solution.point;
    let concrete = match (config.output.concrete_solution, factory.map()) {
        (true, Some(map)) => Some(map.map(point).to_string()),
        _ => None,
    };
    let description = if config.output.describe_solution {
        Some(describe(functions[0].as_ref(), point)?)
    } else {
        None
    };
    cli.post(Message::Solution {
        point: point.to_string(),
        concrete,
        description,
    });
    cli.post(Message::Finished { report });
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let args = CommandLineArgs::parse();
    let cli = CommandLine::new(args.clone())?;
    let mut config = cli.load_config()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);
    let factory = DecoratedFunctionFactory::new(
        &config.function,
        config.map.as_ref(),
        config.modifiers.clone(),
        config.controllers.clone(),
        seed,
    )?;
    match args.command {
        Command::Optimize => {
            cli.save_config(&config)?;
            run_optimization(&config, &factory, &cli, seed)?;
        }
        Command::Describe => {
            let function = factory.make_function_modifier(0)?;
            let mut description = Vec::new();
            function.display(&mut description)?;
            cli.post(Message::Information {
                bv_size: function.bv_size(),
                maximum: function.maximum(),
                incremental_evaluation: function.provides_incremental_evaluation(),
                description: String::from_utf8_lossy(&description).into_owned(),
            });
        }
        Command::Map { path } => {
            let map = factory
                .map()
                .ok_or_else(|| Error::from("配置文件中没有映射"))?;
            hnco::maps::save(map.as_ref(), &path)?;
            cli.post(Message::MapSaved {
                path: path.display().to_string(),
            });
        }
        Command::Evaluate { bits } => {
            let x: BitVector = bits.parse()?;
            let mut function = factory.make_function_modifier(0)?;
            if x.len() != function.bv_size() {
                return Err(format!(
                    "位向量长度为 {}，函数需要的长度为 {}",
                    x.len(),
                    function.bv_size()
                )
                .into());
            }
            let value = function
                .evaluate(&x)
                .map_err(|stop| Error::from(stop.to_string()))?;
            cli.post(Message::Evaluation {
                point: x.to_string(),
                value,
            });
        }
    }
    Ok(())
}
