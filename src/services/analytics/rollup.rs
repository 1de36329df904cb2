//! 行业/市值分组汇总
//!
//! 分组保持首次出现的顺序，再按平均涨幅降序稳定排序

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{
    DashboardSummary, HeatmapCell, HeatmapRow, MarketCapCategory, MarketCapDistribution,
    SectorAggregate, StockRecoveryMetric,
};

/// 分组累加器
#[derive(Default)]
struct Accumulator {
    count: usize,
    total_bounce: f64,
    total_strength: f64,
    total_volume: f64,
    volume_count: usize,
    total_days: f64,
    days_count: usize,
}

impl Accumulator {
    fn add(&mut self, stock: &StockRecoveryMetric) {
        self.count += 1;
        self.total_bounce += stock.bounce_percentage;
        self.total_strength += stock.recovery_strength;
        if let Some(volume) = stock.volume_increase {
            self.total_volume += volume;
            self.volume_count += 1;
        }
        if let Some(days) = stock.days_to_recover {
            self.total_days += days as f64;
            self.days_count += 1;
        }
    }

    fn finish(self, key: String) -> SectorAggregate {
        SectorAggregate {
            sector: key,
            count: self.count,
            avg_bounce: mean(self.total_bounce, self.count),
            avg_recovery_strength: mean(self.total_strength, self.count),
            avg_volume_increase: mean(self.total_volume, self.volume_count),
            avg_days_to_recover: mean(self.total_days, self.days_count),
            volume_sample_count: self.volume_count,
            days_sample_count: self.days_count,
        }
    }
}

/// 空样本的均值定义为 0
fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn by_avg_bounce_desc(a: &SectorAggregate, b: &SectorAggregate) -> Ordering {
    b.avg_bounce.partial_cmp(&a.avg_bounce).unwrap_or(Ordering::Equal)
}

/// 按任意键分组汇总
fn rollup<'a, I, F>(metrics: I, key_of: F) -> Vec<SectorAggregate>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
    F: Fn(&'a StockRecoveryMetric) -> &'a str,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, Accumulator)> = Vec::new();

    for stock in metrics {
        let key = key_of(stock);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, Accumulator::default()));
            groups.len() - 1
        });
        groups[slot].1.add(stock);
    }

    let mut result: Vec<SectorAggregate> = groups
        .into_iter()
        .map(|(key, acc)| acc.finish(key.to_string()))
        .collect();
    result.sort_by(by_avg_bounce_desc);
    result
}

/// 按行业汇总
pub fn aggregate_by_sector<'a, I>(metrics: I) -> Vec<SectorAggregate>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
{
    rollup(metrics, |stock| stock.sector.as_str())
}

/// 按市值分类汇总
pub fn aggregate_by_market_cap<'a, I>(metrics: I) -> Vec<SectorAggregate>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
{
    rollup(metrics, |stock| stock.market_cap_category.as_str())
}

/// 各行业的市值分布，按行业首次出现顺序
pub fn market_cap_distribution<'a, I>(metrics: I) -> Vec<MarketCapDistribution>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut rows: Vec<(&'a str, [usize; 3])> = Vec::new();

    for stock in metrics {
        let slot = *index.entry(stock.sector.as_str()).or_insert_with(|| {
            rows.push((stock.sector.as_str(), [0; 3]));
            rows.len() - 1
        });
        rows[slot].1[category_slot(stock.market_cap_category)] += 1;
    }

    rows.into_iter()
        .map(|(sector, [large, mid, small])| {
            let total = large + mid + small;
            let pct = |n: usize| n as f64 / total as f64 * 100.0;
            MarketCapDistribution {
                sector: sector.to_string(),
                large_cap: large,
                mid_cap: mid,
                small_cap: small,
                total,
                large_cap_pct: pct(large),
                mid_cap_pct: pct(mid),
                small_cap_pct: pct(small),
            }
        })
        .collect()
}

fn category_slot(category: MarketCapCategory) -> usize {
    match category {
        MarketCapCategory::Large => 0,
        MarketCapCategory::Mid => 1,
        MarketCapCategory::Small => 2,
    }
}

/// 行业 x 市值 的平均涨幅热力图，按行业整体均值降序
pub fn sector_heatmap<'a, I>(metrics: I) -> Vec<HeatmapRow>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
{
    // 每行 4 组 (合计, 数量)：大/中/小盘与整体
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut rows: Vec<(&'a str, [(f64, usize); 4])> = Vec::new();

    for stock in metrics {
        let slot = *index.entry(stock.sector.as_str()).or_insert_with(|| {
            rows.push((stock.sector.as_str(), [(0.0, 0); 4]));
            rows.len() - 1
        });
        let cells = &mut rows[slot].1;
        for i in [category_slot(stock.market_cap_category), 3] {
            cells[i].0 += stock.bounce_percentage;
            cells[i].1 += 1;
        }
    }

    let cell = |(total, count): (f64, usize)| HeatmapCell {
        count,
        avg_bounce: (count > 0).then(|| total / count as f64),
    };

    let mut result: Vec<HeatmapRow> = rows
        .into_iter()
        .map(|(sector, [large, mid, small, overall])| HeatmapRow {
            sector: sector.to_string(),
            large_cap: cell(large),
            mid_cap: cell(mid),
            small_cap: cell(small),
            overall: cell(overall),
        })
        .collect();

    result.sort_by(|a, b| {
        let a = a.overall.avg_bounce.unwrap_or(0.0);
        let b = b.overall.avg_bounce.unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
    result
}

/// 涨幅最高的 n 只
pub fn top_performers<'a, I>(metrics: I, n: usize) -> Vec<&'a StockRecoveryMetric>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
{
    let mut sorted: Vec<&'a StockRecoveryMetric> = metrics.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.bounce_percentage
            .partial_cmp(&a.bounce_percentage)
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

/// 涨幅最低的 n 只
pub fn bottom_performers<'a, I>(metrics: I, n: usize) -> Vec<&'a StockRecoveryMetric>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
{
    let mut sorted: Vec<&'a StockRecoveryMetric> = metrics.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.bounce_percentage
            .partial_cmp(&b.bounce_percentage)
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

/// 看板概览数据
pub fn dashboard_summary(metrics: &[StockRecoveryMetric], top_n: usize) -> DashboardSummary {
    let total: f64 = metrics.iter().map(|s| s.bounce_percentage).sum();
    let top: Vec<StockRecoveryMetric> = top_performers(metrics, top_n)
        .into_iter()
        .cloned()
        .collect();

    DashboardSummary {
        average_bounce: mean(total, metrics.len()),
        stocks_analyzed: metrics.len(),
        top_performer: top.first().cloned(),
        best_sector: aggregate_by_sector(metrics).into_iter().next(),
        top_performers: top,
    }
}

/// 行业去重列表，保持首次出现顺序
pub fn unique_sectors<'a, I>(metrics: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
{
    let mut seen = std::collections::HashSet::new();
    metrics
        .into_iter()
        .filter(|s| seen.insert(s.sector.as_str()))
        .map(|s| s.sector.clone())
        .collect()
}

/// 市值分类去重列表，保持首次出现顺序
pub fn unique_market_caps<'a, I>(metrics: I) -> Vec<MarketCapCategory>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
{
    let mut result = Vec::new();
    for stock in metrics {
        if !result.contains(&stock.market_cap_category) {
            result.push(stock.market_cap_category);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics::test_support::stock;

    #[test]
    fn test_aggregate_by_sector_scenario() {
        let data = vec![
            stock("A", "X", MarketCapCategory::Large, 30.0),
            stock("B", "X", MarketCapCategory::Mid, 10.0),
            stock("C", "Y", MarketCapCategory::Small, -5.0),
        ];

        let result = aggregate_by_sector(&data);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].sector, "X");
        assert_eq!(result[0].count, 2);
        assert!((result[0].avg_bounce - 20.0).abs() < 1e-9);
        assert_eq!(result[1].sector, "Y");
        assert_eq!(result[1].count, 1);
        assert!((result[1].avg_bounce + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let data: Vec<StockRecoveryMetric> = Vec::new();
        assert!(aggregate_by_sector(&data).is_empty());
        assert!(aggregate_by_market_cap(&data).is_empty());
        assert!(sector_heatmap(&data).is_empty());

        let summary = dashboard_summary(&data, 10);
        assert_eq!(summary.average_bounce, 0.0);
        assert!(summary.top_performer.is_none());
        assert!(summary.best_sector.is_none());
    }

    #[test]
    fn test_counts_sum_to_input_len_and_averages_within_bounds() {
        let data = vec![
            stock("A", "IT", MarketCapCategory::Large, 12.0),
            stock("B", "Pharma", MarketCapCategory::Mid, 3.0),
            stock("C", "IT", MarketCapCategory::Small, -4.0),
            stock("D", "Banks", MarketCapCategory::Large, 7.5),
            stock("E", "IT", MarketCapCategory::Mid, 40.0),
            stock("F", "Pharma", MarketCapCategory::Small, 9.0),
        ];

        for result in [aggregate_by_sector(&data), aggregate_by_market_cap(&data)] {
            let total: usize = result.iter().map(|g| g.count).sum();
            assert_eq!(total, data.len());
        }

        for group in aggregate_by_sector(&data) {
            let bounces: Vec<f64> = data
                .iter()
                .filter(|s| s.sector == group.sector)
                .map(|s| s.bounce_percentage)
                .collect();
            let min = bounces.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = bounces.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(min <= group.avg_bounce && group.avg_bounce <= max);
        }
    }

    #[test]
    fn test_null_fields_average_to_zero() {
        let data = vec![
            stock("A", "Metals", MarketCapCategory::Small, 5.0),
            stock("B", "Metals", MarketCapCategory::Small, 15.0),
        ];

        let result = aggregate_by_sector(&data);
        assert_eq!(result[0].avg_volume_increase, 0.0);
        assert_eq!(result[0].avg_days_to_recover, 0.0);
        assert_eq!(result[0].volume_sample_count, 0);
        assert!(!result[0].avg_volume_increase.is_nan());
    }

    #[test]
    fn test_nullable_averages_use_non_null_subset() {
        let mut a = stock("A", "Auto", MarketCapCategory::Large, 5.0);
        a.volume_increase = Some(2.0);
        a.days_to_recover = Some(10);
        let mut b = stock("B", "Auto", MarketCapCategory::Large, 15.0);
        b.volume_increase = Some(4.0);
        let c = stock("C", "Auto", MarketCapCategory::Large, 25.0);

        let result = aggregate_by_sector(&[a, b, c]);
        assert_eq!(result[0].count, 3);
        assert!((result[0].avg_volume_increase - 3.0).abs() < 1e-9);
        assert_eq!(result[0].volume_sample_count, 2);
        assert!((result[0].avg_days_to_recover - 10.0).abs() < 1e-9);
        assert_eq!(result[0].days_sample_count, 1);
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let data = vec![
            stock("A", "Gamma", MarketCapCategory::Large, 10.0),
            stock("B", "Alpha", MarketCapCategory::Large, 10.0),
            stock("C", "Beta", MarketCapCategory::Large, 10.0),
        ];

        let sectors: Vec<String> = aggregate_by_sector(&data)
            .into_iter()
            .map(|g| g.sector)
            .collect();
        assert_eq!(sectors, vec!["Gamma", "Alpha", "Beta"]);
    }

    #[test]
    fn test_market_cap_rollup_uses_category_labels() {
        let data = vec![
            stock("A", "IT", MarketCapCategory::Small, 1.0),
            stock("B", "IT", MarketCapCategory::Large, 20.0),
        ];

        let result = aggregate_by_market_cap(&data);
        assert_eq!(result[0].sector, "Large Cap");
        assert_eq!(result[1].sector, "Small Cap");
    }

    #[test]
    fn test_market_cap_distribution_percentages() {
        let data = vec![
            stock("A", "IT", MarketCapCategory::Large, 1.0),
            stock("B", "IT", MarketCapCategory::Large, 1.0),
            stock("C", "IT", MarketCapCategory::Small, 1.0),
            stock("D", "IT", MarketCapCategory::Mid, 1.0),
        ];

        let result = market_cap_distribution(&data);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total, 4);
        assert_eq!(result[0].count_of(MarketCapCategory::Large), 2);
        assert!((result[0].large_cap_pct - 50.0).abs() < 1e-9);
        assert!((result[0].mid_cap_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_heatmap_empty_cells_are_none() {
        let data = vec![
            stock("A", "IT", MarketCapCategory::Large, 10.0),
            stock("B", "Banks", MarketCapCategory::Mid, 30.0),
            stock("C", "Banks", MarketCapCategory::Mid, 10.0),
        ];

        let rows = sector_heatmap(&data);
        assert_eq!(rows[0].sector, "Banks");
        assert_eq!(rows[0].mid_cap.avg_bounce, Some(20.0));
        assert_eq!(rows[0].large_cap.avg_bounce, None);
        assert_eq!(rows[1].overall.count, 1);
    }

    #[test]
    fn test_top_and_bottom_performers() {
        let data = vec![
            stock("A", "IT", MarketCapCategory::Large, 10.0),
            stock("B", "IT", MarketCapCategory::Large, -3.0),
            stock("C", "IT", MarketCapCategory::Large, 25.0),
        ];

        let top: Vec<&str> = top_performers(&data, 2).iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(top, vec!["C", "A"]);
        let bottom: Vec<&str> = bottom_performers(&data, 5).iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(bottom, vec!["B", "A", "C"]);

        let summary = dashboard_summary(&data, 10);
        assert_eq!(summary.top_performer.unwrap().symbol, "C");
        assert_eq!(summary.stocks_analyzed, 3);
    }

    #[test]
    fn test_unique_options_keep_encounter_order() {
        let data = vec![
            stock("A", "IT", MarketCapCategory::Mid, 1.0),
            stock("B", "Banks", MarketCapCategory::Large, 1.0),
            stock("C", "IT", MarketCapCategory::Mid, 1.0),
        ];

        assert_eq!(unique_sectors(&data), vec!["IT", "Banks"]);
        assert_eq!(
            unique_market_caps(&data),
            vec![MarketCapCategory::Mid, MarketCapCategory::Large]
        );
    }
}
