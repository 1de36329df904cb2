//! 看板接口处理器
//!
//! ## API 列表
//! - GET /dashboard - 概览、行业/市值汇总、热力图、筛选选项
//! - GET /metrics - 过滤、排序、分页后的指标表
//! - POST /refresh - 重新加载指标快照并清空日线缓存

use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use super::respond;
use crate::models::{
    DashboardSummary, HeatmapRow, MarketCapCategory, MetricsFilter, MetricsQuery, Page,
    SectorAggregate, SortDirection, SortKey, StockRecoveryMetric, ALL,
};
use crate::services::analytics::{
    aggregate_by_market_cap, aggregate_by_sector, dashboard_summary, filter_metrics,
    sector_heatmap, sort_and_paginate, unique_market_caps, unique_sectors,
};
use crate::state::AppState;

/// 看板首页数据
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub summary: DashboardSummary,
    pub sector_performance: Vec<SectorAggregate>,
    pub market_cap_performance: Vec<SectorAggregate>,
    pub heatmap: Vec<HeatmapRow>,
    /// 首项为 `all`
    pub sector_options: Vec<String>,
    pub market_cap_options: Vec<String>,
}

/// 指标表
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsTable<'a> {
    pub filter: MetricsFilter,
    pub sort: SortKey,
    pub direction: SortDirection,
    pub page: Page<&'a StockRecoveryMetric>,
}

/// 刷新结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResult {
    pub stocks: usize,
    /// 清空的日线缓存标的数
    pub cleared_series: usize,
    pub loaded_at: String,
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(state: web::Data<AppState>) -> Result<HttpResponse> {
    let result = state.snapshots.current(&state.client).await.map(|snapshot| {
        let metrics = &snapshot.metrics;

        let mut sector_options = vec![ALL.to_string()];
        sector_options.extend(unique_sectors(metrics));
        let mut market_cap_options = vec![ALL.to_string()];
        market_cap_options.extend(
            unique_market_caps(metrics)
                .iter()
                .map(MarketCapCategory::to_string),
        );

        DashboardView {
            summary: dashboard_summary(metrics, state.dashboard.top_n),
            sector_performance: aggregate_by_sector(metrics),
            market_cap_performance: aggregate_by_market_cap(metrics),
            heatmap: sector_heatmap(metrics),
            sector_options,
            market_cap_options,
        }
    });
    Ok(respond(result))
}

/// GET /api/v1/metrics?sector=IT&market_cap=Large%20Cap&min_bounce=10&search=tc&sort=bounce_percentage&direction=desc&page=1
pub async fn list_metrics(
    state: web::Data<AppState>,
    query: web::Query<MetricsQuery>,
) -> Result<HttpResponse> {
    let snapshot = match state.snapshots.current(&state.client).await {
        Ok(snapshot) => snapshot,
        Err(e) => return Ok(respond::<()>(Err(e))),
    };

    let filter = query.filter();
    let filtered = filter_metrics(&snapshot.metrics, &filter);
    let page = sort_and_paginate(
        filtered,
        query.sort,
        query.direction,
        query.page,
        state.dashboard.table_page_size,
    );

    Ok(respond(Ok(MetricsTable {
        filter,
        sort: query.sort,
        direction: query.direction,
        page,
    })))
}

/// POST /api/v1/refresh
pub async fn refresh(state: web::Data<AppState>) -> Result<HttpResponse> {
    let result = state.snapshots.reload(&state.client).await.map(|snapshot| {
        let cleared_series = state.series.len();
        state.series.clear();
        log::info!("已清空 {} 个标的的日线缓存", cleared_series);
        RefreshResult {
            stocks: snapshot.metrics.len(),
            cleared_series,
            loaded_at: snapshot.loaded_at.to_rfc3339(),
        }
    });
    Ok(respond(result))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(get_dashboard))
        .route("/metrics", web::get().to(list_metrics))
        .route("/refresh", web::post().to(refresh));
}
