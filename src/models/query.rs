//! 查询参数模型

use serde::{Deserialize, Serialize};

/// 过滤条件中表示“不限”的哨兵值
pub const ALL: &str = "all";

/// 指标过滤条件，各条件之间为 AND 关系
///
/// 哨兵值关闭对应条件：行业/市值为 `all`，最小涨幅不大于 0，搜索词为空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsFilter {
    pub sector: String,
    pub market_cap: String,
    pub min_bounce: f64,
    pub search: String,
}

impl Default for MetricsFilter {
    fn default() -> Self {
        Self {
            sector: ALL.to_string(),
            market_cap: ALL.to_string(),
            min_bounce: 0.0,
            search: String::new(),
        }
    }
}

/// 可排序字段，与表格列一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Symbol,
    Sector,
    MarketCapCategory,
    BouncePercentage,
    LowestPrice,
    CurrentPrice,
    LowestDate,
    DaysToRecover,
    VolumeIncrease,
    RecoveryStrength,
    RelativeSectorPerformance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// 对比图的取值口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesView {
    /// 收盘价
    Price,
    /// 相对最低价的涨幅
    Bounce,
}

/// 雷达图参与归一化的指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadarMetric {
    BouncePercentage,
    RecoveryStrength,
    RelativeSectorPerformance,
    VolumeIncrease,
}

impl RadarMetric {
    pub const ALL: [RadarMetric; 4] = [
        Self::BouncePercentage,
        Self::RecoveryStrength,
        Self::RelativeSectorPerformance,
        Self::VolumeIncrease,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::BouncePercentage => "Bounce %",
            Self::RecoveryStrength => "Recovery Strength",
            Self::RelativeSectorPerformance => "Vs Sector",
            Self::VolumeIncrease => "Volume Increase",
        }
    }
}

/// 指标表查询参数
///
/// GET /metrics?sector=IT&min_bounce=10&sort=bounce_percentage&direction=desc&page=2
#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub sector: Option<String>,
    pub market_cap: Option<String>,
    pub min_bounce: Option<f64>,
    pub search: Option<String>,
    #[serde(default = "default_sort")]
    pub sort: SortKey,
    #[serde(default = "default_direction")]
    pub direction: SortDirection,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_sort() -> SortKey { SortKey::BouncePercentage }
fn default_direction() -> SortDirection { SortDirection::Desc }
fn default_page() -> usize { 1 }

impl MetricsQuery {
    pub fn filter(&self) -> MetricsFilter {
        let defaults = MetricsFilter::default();
        MetricsFilter {
            sector: self.sector.clone().unwrap_or(defaults.sector),
            market_cap: self.market_cap.clone().unwrap_or(defaults.market_cap),
            min_bounce: self.min_bounce.unwrap_or(defaults.min_bounce),
            search: self.search.clone().unwrap_or(defaults.search),
        }
    }
}

/// 对比查询参数
///
/// GET /compare?symbols=TCS,INFY&view=bounce
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    #[serde(default)]
    pub symbols: String,
    #[serde(default = "default_view")]
    pub view: SeriesView,
}

fn default_view() -> SeriesView { SeriesView::Price }

impl CompareQuery {
    pub fn symbol_list(&self) -> Vec<String> {
        self.symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}

/// 对比候选列表查询参数
#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    #[serde(default)]
    pub search: String,
}
