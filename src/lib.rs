//! hnco 是使用 Rust 实现的位向量黑盒优化框架，用于组合与比较各种优化算法。
//!
//! 框架由四部分组成：GF(2) 上的映射，用于变换搜索空间；目标函数的修饰器与控制器链，负责计数、
//! 缓存、预算和提前停止；邻域，支持局部搜索中的增量求值；以及统一的算法接口。
//!
//! hnco 同时也是一个命令行程序，用户提供 YAML 配置文件，程序组装函数并运行指定的算法。

pub mod algorithms;
pub mod bit_matrix;
pub mod bit_vector;
pub mod config;
pub mod error;
pub mod functions;
pub mod interfaces;
pub mod maps;
pub mod neighborhoods;
pub mod search;

pub use algorithms::{Algorithm, Solution};
pub use bit_matrix::BitMatrix;
pub use bit_vector::{generator, BitVector, Generator, SparseBitVector};
pub use error::{Error, Stop};
pub use functions::Function;
pub use interfaces::command_line::{Command, CommandLine, CommandLineArgs};
pub use maps::Map;
pub use neighborhoods::Neighborhood;
