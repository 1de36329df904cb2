//! 行业视图处理器

use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use super::respond;
use crate::error::DashboardError;
use crate::models::{MarketCapDistribution, SectorAggregate, StockRecoveryMetric};
use crate::services::analytics::{
    aggregate_by_sector, bottom_performers, market_cap_distribution, top_performers,
};
use crate::state::AppState;

/// 行业详情中的涨幅榜长度
const SECTOR_PERFORMERS: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorOverview {
    pub sectors: Vec<SectorAggregate>,
    pub distribution: Vec<MarketCapDistribution>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorDetail<'a> {
    pub aggregate: SectorAggregate,
    pub distribution: MarketCapDistribution,
    pub top_performers: Vec<&'a StockRecoveryMetric>,
    pub bottom_performers: Vec<&'a StockRecoveryMetric>,
    pub stocks: Vec<&'a StockRecoveryMetric>,
}

/// GET /api/v1/sectors
pub async fn list_sectors(state: web::Data<AppState>) -> Result<HttpResponse> {
    let result = state
        .snapshots
        .current(&state.client)
        .await
        .map(|snapshot| SectorOverview {
            sectors: aggregate_by_sector(&snapshot.metrics),
            distribution: market_cap_distribution(&snapshot.metrics),
        });
    Ok(respond(result))
}

/// GET /api/v1/sectors/{sector}
pub async fn get_sector(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let sector = path.into_inner();
    let snapshot = match state.snapshots.current(&state.client).await {
        Ok(snapshot) => snapshot,
        Err(e) => return Ok(respond::<()>(Err(e))),
    };

    let stocks: Vec<&StockRecoveryMetric> = snapshot
        .metrics
        .iter()
        .filter(|m| m.sector == sector)
        .collect();

    let aggregate = aggregate_by_sector(stocks.iter().copied()).into_iter().next();
    let distribution = market_cap_distribution(stocks.iter().copied()).into_iter().next();

    let result = match (aggregate, distribution) {
        (Some(aggregate), Some(distribution)) => Ok(SectorDetail {
            aggregate,
            distribution,
            top_performers: top_performers(stocks.iter().copied(), SECTOR_PERFORMERS),
            bottom_performers: bottom_performers(stocks.iter().copied(), SECTOR_PERFORMERS),
            stocks,
        }),
        _ => Err(DashboardError::NotFound(sector)),
    };
    Ok(respond(result))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/sectors", web::get().to(list_sectors))
        .route("/sectors/{sector}", web::get().to(get_sector));
}
