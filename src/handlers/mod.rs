pub mod compare;
pub mod dashboard;
pub mod health;
pub mod sectors;
pub mod stocks;

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::models::ApiResponse;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(dashboard::config)
            .configure(stocks::config)
            .configure(sectors::config)
            .configure(compare::config)
    );
}

/// 将处理结果包装为统一响应
///
/// NotFound -> 404，InvalidInput -> 400，Fetch -> 502
pub fn respond<T: Serialize>(result: Result<T>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data)),
        Err(e) => {
            let body = ApiResponse::<()>::error(e.to_string());
            match e {
                DashboardError::NotFound(_) => HttpResponse::NotFound().json(body),
                DashboardError::InvalidInput(_) => HttpResponse::BadRequest().json(body),
                DashboardError::Fetch { .. } => HttpResponse::BadGateway().json(body),
            }
        }
    }
}
