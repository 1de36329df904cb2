//! 表格排序与分页

use std::cmp::Ordering;

use crate::models::{Page, SortDirection, SortKey, StockRecoveryMetric};

/// 表格每页条数
pub const TABLE_PAGE_SIZE: usize = 15;

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// 按字段三路比较（升序），空值排在任何值之前
pub fn compare_by(a: &StockRecoveryMetric, b: &StockRecoveryMetric, key: SortKey) -> Ordering {
    match key {
        SortKey::Symbol => a.symbol.cmp(&b.symbol),
        SortKey::Sector => a.sector.cmp(&b.sector),
        SortKey::MarketCapCategory => a
            .market_cap_category
            .as_str()
            .cmp(b.market_cap_category.as_str()),
        SortKey::BouncePercentage => cmp_f64(a.bounce_percentage, b.bounce_percentage),
        SortKey::LowestPrice => cmp_f64(a.lowest_price, b.lowest_price),
        SortKey::CurrentPrice => cmp_f64(a.current_price, b.current_price),
        SortKey::LowestDate => a.lowest_date.cmp(&b.lowest_date),
        SortKey::DaysToRecover => a.days_to_recover.cmp(&b.days_to_recover),
        SortKey::VolumeIncrease => match (a.volume_increase, b.volume_increase) {
            (Some(x), Some(y)) => cmp_f64(x, y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        },
        SortKey::RecoveryStrength => cmp_f64(a.recovery_strength, b.recovery_strength),
        SortKey::RelativeSectorPerformance => {
            cmp_f64(a.relative_sector_performance, b.relative_sector_performance)
        }
    }
}

/// 排序后按页切片
///
/// 稳定排序，相等元素保持输入顺序；页码从 1 开始，越界页返回空列表
pub fn sort_and_paginate<'a, I>(
    metrics: I,
    key: SortKey,
    direction: SortDirection,
    page: usize,
    page_size: usize,
) -> Page<&'a StockRecoveryMetric>
where
    I: IntoIterator<Item = &'a StockRecoveryMetric>,
{
    let mut sorted: Vec<&'a StockRecoveryMetric> = metrics.into_iter().collect();
    sorted.sort_by(|a, b| match direction {
        SortDirection::Asc => compare_by(a, b, key),
        SortDirection::Desc => compare_by(b, a, key),
    });

    let total_items = sorted.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    };

    let items = match page.checked_sub(1) {
        Some(index) if page_size > 0 => sorted
            .into_iter()
            .skip(index.saturating_mul(page_size))
            .take(page_size)
            .collect(),
        _ => Vec::new(),
    };

    Page {
        items,
        page,
        page_size,
        total_pages,
        total_items,
    }
}
