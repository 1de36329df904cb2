//! 恢复指标与日线数据模型
//!
//! 字段与远端数据表保持一致，日线表沿用上游的首字母大写列名

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 市值分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketCapCategory {
    #[serde(rename = "Large Cap")]
    Large,
    #[serde(rename = "Mid Cap")]
    Mid,
    #[serde(rename = "Small Cap")]
    Small,
}

impl MarketCapCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Large => "Large Cap",
            Self::Mid => "Mid Cap",
            Self::Small => "Small Cap",
        }
    }
}

impl fmt::Display for MarketCapCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单只股票的跌后恢复指标（每个标的一行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecoveryMetric {
    /// 标的代码（唯一键）
    pub symbol: String,
    /// 展示用代码
    #[serde(default)]
    pub display_symbol: Option<String>,
    /// 所属行业
    pub sector: String,
    /// 市值分类
    pub market_cap_category: MarketCapCategory,
    /// 自最低价以来的涨幅（百分比，可为负）
    pub bounce_percentage: f64,
    /// 当前价格
    pub current_price: f64,
    /// 最低价（恒大于 0）
    pub lowest_price: f64,
    /// 最低价日期
    #[serde(deserialize_with = "trading_date")]
    pub lowest_date: NaiveDate,
    /// 从低点反弹 20% 所用交易日，尚未达到时为空
    #[serde(default)]
    pub days_to_recover: Option<i64>,
    /// 成交量放大倍数
    #[serde(default)]
    pub volume_increase: Option<f64>,
    /// 恢复强度综合评分
    pub recovery_strength: f64,
    /// 相对行业平均的表现（百分比，可为负）
    pub relative_sector_performance: f64,
}

impl StockRecoveryMetric {
    /// 展示代码，缺省时退回标的代码
    pub fn label(&self) -> &str {
        self.display_symbol.as_deref().unwrap_or(&self.symbol)
    }
}

/// 股票描述信息
///
/// 除 symbol 外的列原样保留
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetadata {
    pub symbol: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// 单日行情（每个标的每个交易日一行，按日期升序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPricePoint {
    #[serde(rename = "Date", deserialize_with = "trading_date")]
    pub date: NaiveDate,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume", deserialize_with = "volume")]
    pub volume: u64,
}

/// 正负着色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    /// 大于等于 0 为正
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            Tone::Positive
        } else {
            Tone::Negative
        }
    }
}

/// 解析交易日期，兼容 `2025-03-23` 与 `2025-03-23T00:00:00+00:00`
fn trading_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_trading_date(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_trading_date(raw: &str) -> Result<NaiveDate, String> {
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| format!("无效日期 {}: {}", raw, e))
}

/// 成交量可能以浮点数下发
fn volume<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(v) => Ok(v),
        Raw::Float(v) if v >= 0.0 && v.is_finite() => Ok(v.round() as u64),
        Raw::Float(v) => Err(serde::de::Error::custom(format!("无效成交量: {}", v))),
    }
}
