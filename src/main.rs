//! 股票跌后恢复分析后端服务
//!
//! 提供恢复指标看板、个股详情、行业汇总和多股对比的 RESTful API
//! 数据来源：Supabase (PostgREST)

mod config;     // 配置
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 数据访问与聚合计算
mod state;      // 共享状态

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::middleware::ApiKeyMiddleware;
use crate::services::SupabaseClient;
use crate::state::AppState;

/// 应用程序入口
///
/// 读取配置后启动 HTTP 服务器，默认监听 0.0.0.0:8080
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let (config, notes) = AppConfig::load();

    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    for note in &notes {
        log::info!("{}", note);
    }

    let client = SupabaseClient::new(&config.supabase)?;
    let state = web::Data::new(AppState::new(client, config.dashboard.clone()));

    let api_key = config.api.api_key.clone();
    if !ApiKeyMiddleware::new(&api_key).enabled() {
        log::warn!("未设置 API_KEY，接口不做认证");
    }

    log::info!("启动恢复分析服务: {}", config.bind_addr());

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(ApiKeyMiddleware::new(&api_key)) // API Key 认证
            .wrap(Logger::default()) // 请求日志
            .configure(handlers::config)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.bind_addr())?.run().await?;
    Ok(())
}
