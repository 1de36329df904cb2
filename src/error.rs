//! 错误类型定义
//!
//! 数据获取失败与标的不存在是两类需要区别展示的错误，
//! 聚合计算本身不产生领域错误。

use thiserror::Error;

/// 看板服务错误
#[derive(Error, Debug)]
pub enum DashboardError {
    /// 远端数据存储不可达或返回错误
    ///
    /// target 为出错的数据集，按标的获取日线时为标的代码
    #[error("获取 {target} 数据失败: {message}")]
    Fetch { target: String, message: String },

    /// 标的（或行业）不在恢复指标集合中
    #[error("未找到: {0}")]
    NotFound(String),

    /// 请求参数不合法
    #[error("参数错误: {0}")]
    InvalidInput(String),
}

impl DashboardError {
    pub fn fetch(target: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            target: target.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
