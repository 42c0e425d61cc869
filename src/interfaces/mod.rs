use crate::search::SearchReport;
use serde::Serialize;
use serde_with::skip_serializing_none;

pub mod command_line;

/// 向用户反馈的消息类型
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// 函数的基本信息
    Information {
        bv_size: usize,
        maximum: Option<f64>,
        incremental_evaluation: bool,
        description: String,
    },
    /// 搜索结束
    Finished { report: SearchReport },
    /// 最好的解，concrete 为经过映射变换之后原函数空间中的解
    Solution {
        point: String,
        concrete: Option<String>,
        description: Option<String>,
    },
    /// 对单个位向量求值
    Evaluation { point: String, value: f64 },
    /// 映射已保存
    MapSaved { path: String },
}

/// 定义了向用户报告消息的接口
///
/// 命令行界面只需实现 post 方法，就可向用户报告各种数据
pub trait Interface {
    fn post(&self, message: Message);
}
