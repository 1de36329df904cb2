//! 雷达图指标归一化
//!
//! 仅在当前选中的标的之间做 min-max 缩放到 0-100

use std::collections::{BTreeMap, HashMap};

use crate::models::{RadarMetric, RadarPoint, StockRecoveryMetric};

/// 读取指标值，空值或非有限数视为无分数
pub fn metric_value(stock: &StockRecoveryMetric, metric: RadarMetric) -> Option<f64> {
    let value = match metric {
        RadarMetric::BouncePercentage => Some(stock.bounce_percentage),
        RadarMetric::RecoveryStrength => Some(stock.recovery_strength),
        RadarMetric::RelativeSectorPerformance => Some(stock.relative_sector_performance),
        RadarMetric::VolumeIncrease => stock.volume_increase,
    };
    value.filter(|v| v.is_finite())
}

/// 将选中标的的各项指标缩放到 0-100
///
/// - 无值：0
/// - 无离散度（含只选一只）：50
/// - 其他：(v - min) / (max - min) * 100
pub fn normalize_for_radar(
    selected: &[String],
    metrics_by_symbol: &HashMap<&str, &StockRecoveryMetric>,
    metric_names: &[RadarMetric],
) -> Vec<RadarPoint> {
    metric_names
        .iter()
        .map(|&metric| {
            let values: Vec<(&str, Option<f64>)> = selected
                .iter()
                .map(|symbol| {
                    let value = metrics_by_symbol
                        .get(symbol.as_str())
                        .and_then(|stock| metric_value(stock, metric));
                    (symbol.as_str(), value)
                })
                .collect();

            let (min, max) = values
                .iter()
                .filter_map(|(_, v)| *v)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });

            let scores: BTreeMap<String, f64> = values
                .into_iter()
                .map(|(symbol, value)| {
                    let score = match value {
                        None => 0.0,
                        Some(_) if max == min => 50.0,
                        Some(v) => ((v - min) / (max - min) * 100.0).clamp(0.0, 100.0),
                    };
                    (symbol.to_string(), score)
                })
                .collect();

            RadarPoint {
                metric: metric.label().to_string(),
                scores,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarketCapCategory;
    use crate::services::analytics::test_support::stock;

    fn index<'a>(stocks: &'a [StockRecoveryMetric]) -> HashMap<&'a str, &'a StockRecoveryMetric> {
        stocks.iter().map(|s| (s.symbol.as_str(), s)).collect()
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scores_span_zero_to_hundred() {
        let data = vec![
            stock("A", "IT", MarketCapCategory::Large, 10.0),
            stock("B", "IT", MarketCapCategory::Large, 20.0),
            stock("C", "IT", MarketCapCategory::Large, 40.0),
        ];

        let result = normalize_for_radar(
            &symbols(&["A", "B", "C"]),
            &index(&data),
            &[RadarMetric::BouncePercentage],
        );

        assert_eq!(result[0].metric, "Bounce %");
        assert_eq!(result[0].scores["A"], 0.0);
        assert!((result[0].scores["B"] - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(result[0].scores["C"], 100.0);
    }

    #[test]
    fn test_identical_values_score_fifty() {
        let data = vec![
            stock("A", "IT", MarketCapCategory::Large, 12.0),
            stock("B", "IT", MarketCapCategory::Large, 12.0),
        ];

        let result = normalize_for_radar(
            &symbols(&["A", "B"]),
            &index(&data),
            &[RadarMetric::BouncePercentage],
        );
        assert_eq!(result[0].scores["A"], 50.0);
        assert_eq!(result[0].scores["B"], 50.0);

        let single = normalize_for_radar(&symbols(&["A"]), &index(&data), &RadarMetric::ALL);
        assert_eq!(single.len(), 4);
        assert_eq!(single[0].scores["A"], 50.0);
    }

    #[test]
    fn test_missing_values_score_zero_and_are_ignored_for_range() {
        let mut a = stock("A", "IT", MarketCapCategory::Large, 1.0);
        a.volume_increase = Some(2.0);
        let mut b = stock("B", "IT", MarketCapCategory::Large, 1.0);
        b.volume_increase = Some(4.0);
        let c = stock("C", "IT", MarketCapCategory::Large, 1.0);
        let data = vec![a, b, c];

        let result = normalize_for_radar(
            &symbols(&["A", "B", "C", "UNKNOWN"]),
            &index(&data),
            &[RadarMetric::VolumeIncrease],
        );
        let scores = &result[0].scores;
        assert_eq!(scores["A"], 0.0);
        assert_eq!(scores["B"], 100.0);
        assert_eq!(scores["C"], 0.0);
        assert_eq!(scores["UNKNOWN"], 0.0);
    }

    #[test]
    fn test_all_scores_within_range() {
        let mut data = Vec::new();
        for (i, bounce) in [-30.0, 5.5, 80.0, -2.0, 14.0].iter().enumerate() {
            let mut s = stock(&format!("S{}", i), "IT", MarketCapCategory::Mid, *bounce);
            s.recovery_strength = bounce * 0.3;
            s.relative_sector_performance = -bounce;
            data.push(s);
        }
        let selected: Vec<String> = data.iter().map(|s| s.symbol.clone()).collect();

        for point in normalize_for_radar(&selected, &index(&data), &RadarMetric::ALL) {
            for score in point.scores.values() {
                assert!((0.0..=100.0).contains(score));
            }
        }
    }
}
