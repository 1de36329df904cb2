use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use super::respond;
use crate::models::{SeriesPoint, StockMetadata, StockRecoveryMetric, Tone};
use crate::services::analytics::{display_date, series_points};
use crate::state::AppState;

/// 个股详情
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetail {
    pub metric: StockRecoveryMetric,
    pub metadata: Option<StockMetadata>,
    pub lowest_date_label: String,
    pub bounce_tone: Tone,
    pub vs_sector_tone: Tone,
    pub series: Vec<SeriesPoint>,
}

/// GET /api/v1/stocks/{symbol}
pub async fn get_stock(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    Ok(respond(load_detail(&state, &symbol).await))
}

/// 标的不在指标集合中时直接返回 NotFound，不拉取日线
async fn load_detail(state: &AppState, symbol: &str) -> crate::error::Result<StockDetail> {
    let snapshot = state.snapshots.current(&state.client).await?;
    let metric = snapshot.require(symbol)?.clone();
    let points = state.series.get_or_fetch(&state.client, symbol).await?;

    Ok(StockDetail {
        metadata: snapshot.metadata_for(symbol).cloned(),
        lowest_date_label: display_date(metric.lowest_date),
        bounce_tone: Tone::of(metric.bounce_percentage),
        vs_sector_tone: Tone::of(metric.relative_sector_performance),
        series: series_points(&points, metric.lowest_price),
        metric,
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/stocks/{symbol}", web::get().to(get_stock));
}
