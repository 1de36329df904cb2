//! 远端数据存储接口实现
//!
//! 通过 PostgREST 接口读取三张表：
//! - stock_recovery_metrics：每个标的一行恢复指标（分页拉取）
//! - stock_metadata：标的描述信息
//! - stock_data：日线行情，按 Symbol 过滤、Date 升序

use std::future::Future;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::config::SupabaseConfig;
use crate::error::{DashboardError, Result};
use crate::models::{DailyPricePoint, StockMetadata, StockRecoveryMetric};

/// 恢复指标表
pub const METRICS_TABLE: &str = "stock_recovery_metrics";
/// 描述信息表
pub const METADATA_TABLE: &str = "stock_metadata";
/// 日线行情表
pub const DAILY_TABLE: &str = "stock_data";

/// 一页数据及远端报告的总条数
pub type PageResult<T> = (Vec<T>, Option<usize>);

/// 远端数据存储客户端
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    rest_base: Url,
    anon_key: String,
    page_size: usize,
    max_pages: usize,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            rest_base: rest_base(&config.url)?,
            anon_key: config.anon_key.clone(),
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        self.rest_base
            .join(table)
            .map_err(|e| DashboardError::fetch(table, e))
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    /// 请求一页数据
    ///
    /// range 为闭区间行号；count 为 true 时要求远端在 Content-Range 中返回总数
    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        target: &str,
        query: &[(&str, &str)],
        range: Option<(usize, usize)>,
        count: bool,
    ) -> Result<PageResult<T>> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().extend_pairs(query);

        let mut request = self.get(url);
        if let Some((from, to)) = range {
            request = request
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", from, to));
        }
        if count {
            request = request.header("Prefer", "count=exact");
        }

        let response = request
            .send()
            .await
            .map_err(|e| DashboardError::fetch(target, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(DashboardError::fetch(target, format!("{} {}", status, preview)));
        }

        let total = response
            .headers()
            .get("Content-Range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        let rows = response
            .json::<Vec<T>>()
            .await
            .map_err(|e| DashboardError::fetch(target, e))?;

        Ok((rows, total))
    }

    /// 获取全部恢复指标，超过一页时分页拉取
    pub async fn fetch_recovery_metrics(&self) -> Result<Vec<StockRecoveryMetric>> {
        let query = [("select", "*")];
        let rows = paginate(self.page_size, self.max_pages, |page, from, to| {
            let query = &query;
            async move {
                let result = self
                    .fetch_rows(METRICS_TABLE, METRICS_TABLE, query, Some((from, to)), page == 0)
                    .await;
                if let Ok((rows, _)) = &result {
                    log::debug!("第 {} 页获取 {} 条恢复指标", page, rows.len());
                }
                result
            }
        })
        .await
        .map_err(|e| {
            log::error!("获取恢复指标失败: {}", e);
            e
        })?;

        log::info!("共获取恢复指标 {} 条", rows.len());
        Ok(rows)
    }

    /// 获取标的描述信息
    pub async fn fetch_stock_metadata(&self) -> Result<Vec<StockMetadata>> {
        let (rows, _) = self
            .fetch_rows(METADATA_TABLE, METADATA_TABLE, &[("select", "*")], None, false)
            .await
            .map_err(|e| {
                log::error!("获取标的描述信息失败: {}", e);
                e
            })?;
        Ok(rows)
    }

    /// 获取单个标的的日线，按日期升序
    pub async fn fetch_daily_series(&self, symbol: &str) -> Result<Vec<DailyPricePoint>> {
        let filter = format!("eq.{}", symbol);
        let query = [("select", "*"), ("Symbol", filter.as_str()), ("order", "Date.asc")];

        let (rows, _) = self
            .fetch_rows(DAILY_TABLE, symbol, &query, None, false)
            .await
            .map_err(|e| {
                log::error!("获取 {} 日线失败: {}", symbol, e);
                e
            })?;
        log::debug!("获取 {} 日线 {} 条", symbol, rows.len());
        Ok(rows)
    }
}

/// 规范化为 `<url>/rest/v1/`
fn rest_base(url: &str) -> anyhow::Result<Url> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        anyhow::bail!("未配置数据存储地址 (SUPABASE_URL)");
    }
    Ok(Url::parse(&format!("{}/", trimmed))?.join("rest/v1/")?)
}

/// 解析 Content-Range 中的总条数，如 `0-999/2345`、`*/0`；总数未知（`*`）时返回 None
pub fn parse_content_range(header: &str) -> Option<usize> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// 分页拉取
///
/// fetch 接收（页号, 起始行, 结束行），首页返回的总数决定是否继续；
/// 已取够、达到页数上限或遇到空页时停止，各页按顺序拼接
pub async fn paginate<T, F, Fut>(page_size: usize, max_pages: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize, usize, usize) -> Fut,
    Fut: Future<Output = Result<PageResult<T>>>,
{
    let (mut rows, total) = fetch(0, 0, page_size - 1).await?;
    let total = total.unwrap_or(rows.len());

    let mut page = 1;
    while rows.len() < total && page < max_pages {
        let from = page * page_size;
        let (next, _) = fetch(page, from, from + page_size - 1).await?;
        if next.is_empty() {
            break;
        }
        rows.extend(next);
        page += 1;
    }

    if rows.len() < total {
        log::warn!("数据共 {} 条，达到 {} 页上限后仅获取 {} 条", total, max_pages, rows.len());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-999/2345"), Some(2345));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_rest_base_normalizes_trailing_slash() {
        let base = rest_base("https://demo.supabase.co/").unwrap();
        assert_eq!(base.as_str(), "https://demo.supabase.co/rest/v1/");
        assert_eq!(
            base.join(METRICS_TABLE).unwrap().as_str(),
            "https://demo.supabase.co/rest/v1/stock_recovery_metrics"
        );
        assert!(rest_base("").is_err());
    }

    /// 模拟远端：共 total 条，每页 page_size 条
    fn fake_rows(total: usize, from: usize, to: usize) -> Vec<usize> {
        (from..=to.min(total.saturating_sub(1))).filter(|i| *i < total).collect()
    }

    #[tokio::test]
    async fn test_paginate_concatenates_pages_in_order() {
        let calls = RefCell::new(Vec::new());
        let rows = paginate(1000, 10, |page, from, to| {
            calls.borrow_mut().push((page, from, to));
            async move { Ok((fake_rows(2500, from, to), Some(2500))) }
        })
        .await
        .unwrap();

        assert_eq!(rows.len(), 2500);
        assert!(rows.windows(2).all(|w| w[0] + 1 == w[1]));
        assert_eq!(
            *calls.borrow(),
            vec![(0, 0, 999), (1, 1000, 1999), (2, 2000, 2999)]
        );
    }

    #[tokio::test]
    async fn test_paginate_stops_at_page_cap() {
        let rows = paginate(10, 3, |_, from, to| async move {
            Ok((fake_rows(100, from, to), Some(100)))
        })
        .await
        .unwrap();
        assert_eq!(rows.len(), 30);
    }

    #[tokio::test]
    async fn test_paginate_stops_on_empty_page() {
        let rows = paginate(10, 10, |page, from, to| async move {
            // 远端声称 50 条，实际只有 15 条
            let rows = if page < 2 { fake_rows(15, from, to) } else { Vec::new() };
            Ok((rows, Some(50)))
        })
        .await
        .unwrap();
        assert_eq!(rows.len(), 15);
    }

    #[tokio::test]
    async fn test_paginate_propagates_fetch_error() {
        let result: Result<Vec<usize>> = paginate(10, 10, |page, from, to| async move {
            if page == 1 {
                Err(DashboardError::fetch(METRICS_TABLE, "boom"))
            } else {
                Ok((fake_rows(20, from, to), Some(20)))
            }
        })
        .await;
        assert!(matches!(result, Err(DashboardError::Fetch { .. })));
    }
}
