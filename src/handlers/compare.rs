//! 多股对比处理器
//!
//! ## API 列表
//! - GET /compare?symbols=TCS,INFY&view=price - 对齐日线、雷达图评分、对比表
//! - GET /compare/candidates?search=tc - 对比候选列表

use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use super::respond;
use crate::error;
use crate::models::{
    AlignedPoint, CandidateQuery, CompareQuery, ComparisonRow, RadarMetric, RadarPoint,
    SeriesView, StockRecoveryMetric,
};
use crate::services::analytics::{
    align_view, comparison_rows, index_by_symbol, normalize_for_radar, search_candidates,
    validate_selection, DateOrder, DEFAULT_CANDIDATE_LIMIT,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub symbols: Vec<String>,
    /// 选中但不在指标集合中的标的
    pub missing: Vec<String>,
    pub view: SeriesView,
    pub series: Vec<AlignedPoint>,
    pub radar: Vec<RadarPoint>,
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub symbol: String,
    pub label: String,
    pub sector: String,
}

/// GET /api/v1/compare
pub async fn compare(
    state: web::Data<AppState>,
    query: web::Query<CompareQuery>,
) -> Result<HttpResponse> {
    Ok(respond(build_comparison(&state, &query).await))
}

async fn build_comparison(state: &AppState, query: &CompareQuery) -> error::Result<Comparison> {
    let selected = validate_selection(&query.symbol_list(), state.dashboard.max_compare)?;
    let snapshot = state.snapshots.current(&state.client).await?;
    let index = index_by_symbol(&snapshot.metrics);

    let (known, missing): (Vec<String>, Vec<String>) = selected
        .iter()
        .cloned()
        .partition(|s| index.contains_key(s.as_str()));
    if !missing.is_empty() {
        log::warn!("对比标的不在指标集合中: {}", missing.join(","));
    }

    let series = state.series.ensure_loaded(&state.client, &known).await?;
    let order = DateOrder::from_legacy_flag(state.dashboard.legacy_date_sort);

    Ok(Comparison {
        series: align_view(&known, &series, &index, query.view, order),
        radar: normalize_for_radar(&known, &index, &RadarMetric::ALL),
        rows: comparison_rows(&known, &index),
        view: query.view,
        symbols: known,
        missing,
    })
}

/// GET /api/v1/compare/candidates
pub async fn candidates(
    state: web::Data<AppState>,
    query: web::Query<CandidateQuery>,
) -> Result<HttpResponse> {
    let result = state.snapshots.current(&state.client).await.map(|snapshot| {
        search_candidates(&snapshot.metrics, &query.search, DEFAULT_CANDIDATE_LIMIT)
            .into_iter()
            .map(|m: &StockRecoveryMetric| Candidate {
                symbol: m.symbol.clone(),
                label: m.label().to_string(),
                sector: m.sector.clone(),
            })
            .collect::<Vec<_>>()
    });
    Ok(respond(result))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/compare", web::get().to(compare))
        .route("/compare/candidates", web::get().to(candidates));
}
