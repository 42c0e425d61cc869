use crate::config::Config;
use crate::error::Error;
use crate::interfaces::{Interface, Message};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs::{create_dir_all, read_to_string, write};
use std::path::PathBuf;
use tracing::warn;

/// 命令行参数的定义
#[derive(Parser, Clone)]
#[command(name = "hnco")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CommandLineArgs {
    #[command(subcommand)]
    pub command: Command,
    /// 配置文件，默认为 config.yaml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// 线程数，覆盖配置文件中的设置
    #[arg(short, long)]
    pub threads: Option<usize>,
    /// 随机数种子，覆盖配置文件中的设置
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// 输出目录，默认为 output-<时间戳>
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// 命令行中所有可用的子命令
#[derive(Subcommand, Clone)]
pub enum Command {
    /// 按配置组装函数并运行算法
    Optimize,
    /// 输出函数的基本信息
    Describe,
    /// 采样配置中的映射并保存到文件
    Map {
        /// 映射文件的保存路径
        path: PathBuf,
    },
    /// 对一个位向量求值，不经过任何控制器
    Evaluate {
        /// 由 0 和 1 组成的位向量
        bits: String,
    },
}

/// 通过命令行来使用 hnco 的入口，实现了界面特征
pub struct CommandLine {
    pub args: CommandLineArgs,
    pub output_dir: PathBuf,
}

impl CommandLine {
    pub fn new(args: CommandLineArgs) -> Result<Self, Error> {
        let output_dir = args.output.clone().unwrap_or_else(|| {
            let time = Local::now().format("%m-%d+%H_%M_%S").to_string();
            PathBuf::from(format!("output-{time}"))
        });
        create_dir_all(&output_dir)?;
        Ok(Self { args, output_dir })
    }

    /// 读取配置文件，再用命令行参数覆盖
    pub fn load_config(&self) -> Result<Config, Error> {
        let path = self
            .args
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from("config.yaml"));
        let content = read_to_string(&path)
            .map_err(|e| Error::from(format!("无法读取配置文件 {}：{e}", path.display())))?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        if let Some(threads) = self.args.threads {
            config.threads = threads;
        }
        if let Some(seed) = self.args.seed {
            config.seed = Some(seed);
        }
        if config.threads == 0 {
            return Err("线程数必须为正数".into());
        }
        Ok(config)
    }

    /// 保存实际使用的配置，以便复现
    pub fn save_config(&self, config: &Config) -> Result<(), Error> {
        let path = self.output_dir.join("config.yaml");
        write(path, serde_yaml::to_string(config)?)?;
        Ok(())
    }

    fn save(&self, name: &str, content: &str) {
        let path = self.output_dir.join(name);
        if let Err(e) = write(&path, content) {
            warn!("无法写入 {}：{e}", path.display());
        }
    }
}

impl Interface for CommandLine {
    fn post(&self, message: Message) {
        match &message {
            Message::Information {
                bv_size,
                maximum,
                incremental_evaluation,
                description,
            } => {
                println!("位向量长度：{bv_size}");
                match maximum {
                    Some(maximum) => println!("已知最大值：{maximum}"),
                    None => println!("最大值未知"),
                }
                println!("支持增量求值：{incremental_evaluation}");
                print!("{description}");
            }
            Message::Finished { report } => {
                println!(
                    "搜索结束（{}），最好值为 {}，用时 {:.3} 秒",
                    report.stop, report.solution.value, report.total_time
                );
                if let Some(event) = report.report.last_improvement {
                    println!("最后一次改进发生在第 {} 次求值", event.num_evaluations);
                }
                if let Some(ratio) = report.report.lookup_ratio {
                    println!("缓存命中率：{:.2}%", ratio * 100.0);
                }
                match serde_json::to_string_pretty(&message) {
                    Ok(json) => self.save("results.json", &json),
                    Err(e) => warn!("无法序列化结果：{e}"),
                }
            }
            Message::Solution {
                point,
                concrete,
                description,
            } => {
                println!("{point}");
                let mut content = format!("{point}\n");
                if let Some(concrete) = concrete {
                    println!("{concrete}");
                    content.push_str(&format!("{concrete}\n"));
                }
                self.save("solution.txt", &content);
                if let Some(description) = description {
                    print!("{description}");
                    self.save("description.txt", description);
                }
            }
            Message::Evaluation { point, value } => println!("{point} {value}"),
            Message::MapSaved { path } => println!("映射已保存到 {path}"),
        }
    }
}
