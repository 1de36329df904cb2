//! 对比选择：选中标的校验与对比表

use std::collections::HashMap;

use crate::error::{DashboardError, Result};
use crate::models::{ComparisonRow, StockRecoveryMetric, Tone};

/// 最多同时对比的标的数
pub const MAX_COMPARE: usize = 5;

/// 对齐点与雷达点中已占用的字段名，不能作为标的代码
const RESERVED_KEYS: [&str; 3] = ["date", "label", "metric"];

/// 以标的代码建立索引
pub fn index_by_symbol(metrics: &[StockRecoveryMetric]) -> HashMap<&str, &StockRecoveryMetric> {
    metrics.iter().map(|s| (s.symbol.as_str(), s)).collect()
}

/// 去空白、去重（保留首次出现），超过上限时报错
pub fn validate_selection(symbols: &[String], max: usize) -> Result<Vec<String>> {
    let mut selected: Vec<String> = Vec::new();
    for symbol in symbols {
        let symbol = symbol.trim();
        if symbol.is_empty() || selected.iter().any(|s| s == symbol) {
            continue;
        }
        if RESERVED_KEYS.contains(&symbol) {
            return Err(DashboardError::InvalidInput(format!("不支持的标的代码: {}", symbol)));
        }
        selected.push(symbol.to_string());
    }

    if selected.len() > max {
        return Err(DashboardError::InvalidInput(format!(
            "最多同时对比 {} 只股票，当前 {} 只",
            max,
            selected.len()
        )));
    }
    Ok(selected)
}

/// 对比表，未知标的直接跳过
pub fn comparison_rows(
    selected: &[String],
    metrics_by_symbol: &HashMap<&str, &StockRecoveryMetric>,
) -> Vec<ComparisonRow> {
    selected
        .iter()
        .filter_map(|symbol| metrics_by_symbol.get(symbol.as_str()))
        .map(|m| ComparisonRow {
            symbol: m.symbol.clone(),
            sector: m.sector.clone(),
            market_cap: m.market_cap_category,
            bounce: m.bounce_percentage,
            bounce_tone: Tone::of(m.bounce_percentage),
            current: m.current_price,
            lowest: m.lowest_price,
            lowest_date: m.lowest_date,
            days_to_recover: m.days_to_recover,
            volume_increase: m.volume_increase,
            recovery_strength: m.recovery_strength,
            vs_sector: m.relative_sector_performance,
            vs_sector_tone: Tone::of(m.relative_sector_performance),
        })
        .collect()
}
