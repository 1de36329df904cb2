//! 聚合计算引擎
//!
//! 全部为纯函数：不做 I/O，不持有状态，不修改入参。
//! 每次数据或筛选条件变化时由调用方整体重算。

pub mod alignment;
pub mod filter;
pub mod format;
pub mod normalize;
pub mod rollup;
pub mod selection;
pub mod table;

pub use alignment::{align_view, series_points, DateOrder, SeriesBySymbol};
pub use filter::{filter_metrics, search_candidates, DEFAULT_CANDIDATE_LIMIT};
pub use format::display_date;
pub use normalize::normalize_for_radar;
pub use rollup::{
    aggregate_by_market_cap, aggregate_by_sector, bottom_performers, dashboard_summary,
    market_cap_distribution, sector_heatmap, top_performers, unique_market_caps, unique_sectors,
};
pub use selection::{comparison_rows, index_by_symbol, validate_selection, MAX_COMPARE};
pub use table::{sort_and_paginate, TABLE_PAGE_SIZE};
