//! 指标过滤与对比候选检索

use crate::models::{MetricsFilter, StockRecoveryMetric, ALL};

/// 对比候选列表在未输入搜索词时的默认条数
pub const DEFAULT_CANDIDATE_LIMIT: usize = 50;

fn matches_search(stock: &StockRecoveryMetric, needle: &str) -> bool {
    stock.symbol.to_lowercase().contains(needle) || stock.sector.to_lowercase().contains(needle)
}

/// 按过滤条件筛选，返回原集合的引用，顺序不变
pub fn filter_metrics<'a>(
    metrics: &'a [StockRecoveryMetric],
    filter: &MetricsFilter,
) -> Vec<&'a StockRecoveryMetric> {
    let needle = filter.search.to_lowercase();

    metrics
        .iter()
        .filter(|s| filter.sector == ALL || s.sector == filter.sector)
        .filter(|s| filter.market_cap == ALL || s.market_cap_category.as_str() == filter.market_cap)
        .filter(|s| filter.min_bounce <= 0.0 || s.bounce_percentage >= filter.min_bounce)
        .filter(|s| needle.is_empty() || matches_search(s, &needle))
        .collect()
}

/// 对比候选：按代码排序后做不区分大小写的代码/行业匹配
///
/// 搜索词为空时返回前 limit 条
pub fn search_candidates<'a>(
    metrics: &'a [StockRecoveryMetric],
    term: &str,
    limit: usize,
) -> Vec<&'a StockRecoveryMetric> {
    let mut sorted: Vec<&StockRecoveryMetric> = metrics.iter().collect();
    sorted.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        sorted.truncate(limit);
        return sorted;
    }

    sorted.into_iter().filter(|s| matches_search(s, &needle)).collect()
}
