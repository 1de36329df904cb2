//! 聚合结果模型
//!
//! 均为派生数据，每次输入变化时整体重算，不做持久化

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{MarketCapCategory, StockRecoveryMetric, Tone};

/// 分组汇总
///
/// 按市值分组时 sector 字段存放市值类别
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorAggregate {
    pub sector: String,
    /// 组内标的数（至少为 1）
    pub count: usize,
    pub avg_bounce: f64,
    pub avg_recovery_strength: f64,
    /// 仅对有成交量数据的标的求均值，无数据时为 0
    pub avg_volume_increase: f64,
    /// 仅对已恢复的标的求均值，无数据时为 0
    pub avg_days_to_recover: f64,
    pub volume_sample_count: usize,
    pub days_sample_count: usize,
}

/// 行业内市值分布
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCapDistribution {
    pub sector: String,
    pub large_cap: usize,
    pub mid_cap: usize,
    pub small_cap: usize,
    pub total: usize,
    pub large_cap_pct: f64,
    pub mid_cap_pct: f64,
    pub small_cap_pct: f64,
}

#[cfg(test)]
impl MarketCapDistribution {
    pub fn count_of(&self, category: MarketCapCategory) -> usize {
        match category {
            MarketCapCategory::Large => self.large_cap,
            MarketCapCategory::Mid => self.mid_cap,
            MarketCapCategory::Small => self.small_cap,
        }
    }
}

/// 热力图单元格
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub count: usize,
    /// 无成员时为空
    pub avg_bounce: Option<f64>,
}

/// 热力图一行（一个行业）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapRow {
    pub sector: String,
    pub large_cap: HeatmapCell,
    pub mid_cap: HeatmapCell,
    pub small_cap: HeatmapCell,
    pub overall: HeatmapCell,
}

/// 看板概览
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub average_bounce: f64,
    pub stocks_analyzed: usize,
    pub top_performer: Option<StockRecoveryMetric>,
    pub best_sector: Option<SectorAggregate>,
    pub top_performers: Vec<StockRecoveryMetric>,
}

/// 多标的对齐后的一个日期点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPoint {
    pub date: NaiveDate,
    /// 展示标签，如 `23 Mar 2025`
    pub label: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// 雷达图的一个指标维度
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub metric: String,
    #[serde(flatten)]
    pub scores: BTreeMap<String, f64>,
}

/// 个股详情中的日线点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub label: String,
    pub close: f64,
    pub volume: u64,
    /// 相对最低价的涨幅（百分比）
    pub percent_change: f64,
}

/// 对比表一行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub symbol: String,
    pub sector: String,
    pub market_cap: MarketCapCategory,
    pub bounce: f64,
    pub bounce_tone: Tone,
    pub current: f64,
    pub lowest: f64,
    pub lowest_date: NaiveDate,
    pub days_to_recover: Option<i64>,
    pub volume_increase: Option<f64>,
    pub recovery_strength: f64,
    pub vs_sector: f64,
    pub vs_sector_tone: Tone,
}

/// 分页结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 从 1 开始
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}
