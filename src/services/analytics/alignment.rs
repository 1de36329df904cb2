//! 多标的时间序列对齐
//!
//! 只保留所有已加载标的都有数据的交易日（严格交集）。
//! 尚未加载数据的标的不计入分母。

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::format::{display_date, percent_from_low};
use crate::models::{AlignedPoint, DailyPricePoint, SeriesPoint, SeriesView, StockRecoveryMetric};

/// 按标的存放的日线数据
pub type SeriesBySymbol = HashMap<String, Arc<Vec<DailyPricePoint>>>;

/// 对齐结果的日期排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    /// 按日期先后
    #[default]
    Chronological,
    /// 按展示标签字符串排序，兼容旧版输出（`10 Mar` 会排在 `9 Mar` 之前）
    LegacyLabel,
}

impl DateOrder {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            Self::LegacyLabel
        } else {
            Self::Chronological
        }
    }
}

/// 对齐多个标的的日线
///
/// value_of 接收标的代码与当日行情，返回该标的在图上的取值
pub fn align_series<F>(
    selected: &[String],
    series: &SeriesBySymbol,
    order: DateOrder,
    value_of: F,
) -> Vec<AlignedPoint>
where
    F: Fn(&str, &DailyPricePoint) -> f64,
{
    let mut seen = HashSet::new();
    // 每个已加载标的的 日期 -> 当日首条记录
    let loaded: Vec<(&str, HashMap<NaiveDate, &DailyPricePoint>)> = selected
        .iter()
        .filter(|symbol| seen.insert(symbol.as_str()))
        .filter_map(|symbol| {
            series.get(symbol).map(|points| {
                let mut by_date = HashMap::with_capacity(points.len());
                for point in points.iter() {
                    by_date.entry(point.date).or_insert(point);
                }
                (symbol.as_str(), by_date)
            })
        })
        .collect();

    if loaded.is_empty() {
        return Vec::new();
    }

    let mut tally: HashMap<NaiveDate, usize> = HashMap::new();
    for (_, by_date) in &loaded {
        for date in by_date.keys() {
            *tally.entry(*date).or_insert(0) += 1;
        }
    }

    let mut common: Vec<(NaiveDate, String)> = tally
        .into_iter()
        .filter(|(_, count)| *count == loaded.len())
        .map(|(date, _)| (date, display_date(date)))
        .collect();

    match order {
        DateOrder::Chronological => common.sort_by_key(|(date, _)| *date),
        DateOrder::LegacyLabel => common.sort_by(|a, b| a.1.cmp(&b.1)),
    }

    common
        .into_iter()
        .map(|(date, label)| {
            let values: BTreeMap<String, f64> = loaded
                .iter()
                .filter_map(|(symbol, by_date)| {
                    by_date
                        .get(&date)
                        .map(|point| (symbol.to_string(), value_of(*symbol, *point)))
                })
                .collect();
            AlignedPoint { date, label, values }
        })
        .collect()
}

/// 按对比视图对齐：收盘价或相对最低价涨幅
///
/// 涨幅视图下，没有恢复指标的标的取值为 0
pub fn align_view(
    selected: &[String],
    series: &SeriesBySymbol,
    metrics: &HashMap<&str, &StockRecoveryMetric>,
    view: SeriesView,
    order: DateOrder,
) -> Vec<AlignedPoint> {
    match view {
        SeriesView::Price => align_series(selected, series, order, |_, point| point.close),
        SeriesView::Bounce => align_series(selected, series, order, |symbol, point| {
            metrics
                .get(symbol)
                .map(|m| percent_from_low(point.close, m.lowest_price))
                .unwrap_or(0.0)
        }),
    }
}

/// 个股日线附加展示标签与相对最低价涨幅
pub fn series_points(points: &[DailyPricePoint], lowest_price: f64) -> Vec<SeriesPoint> {
    points
        .iter()
        .map(|point| SeriesPoint {
            date: point.date,
            label: display_date(point.date),
            close: point.close,
            volume: point.volume,
            percent_change: percent_from_low(point.close, lowest_price),
        })
        .collect()
}
