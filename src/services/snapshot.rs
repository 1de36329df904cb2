//! 恢复指标快照
//!
//! 首次访问时加载指标与描述信息，之后一直复用，直到显式刷新。
//! 刷新失败时保留旧快照。

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

use super::supabase::SupabaseClient;
use crate::error::{DashboardError, Result};
use crate::models::{StockMetadata, StockRecoveryMetric};

/// 某一时刻的完整指标数据，构建后不再修改
#[derive(Debug)]
pub struct MetricsSnapshot {
    pub metrics: Vec<StockRecoveryMetric>,
    pub metadata: Vec<StockMetadata>,
    pub loaded_at: DateTime<Utc>,
}

impl MetricsSnapshot {
    /// 标的代码重复时保留首条
    pub fn new(metrics: Vec<StockRecoveryMetric>, metadata: Vec<StockMetadata>) -> Self {
        let mut seen = HashSet::new();
        let total = metrics.len();
        let metrics: Vec<StockRecoveryMetric> = metrics
            .into_iter()
            .filter(|m| seen.insert(m.symbol.clone()))
            .collect();
        if metrics.len() < total {
            log::warn!("恢复指标中有 {} 条重复标的已忽略", total - metrics.len());
        }

        Self {
            metrics,
            metadata,
            loaded_at: Utc::now(),
        }
    }

    pub fn find(&self, symbol: &str) -> Option<&StockRecoveryMetric> {
        self.metrics.iter().find(|m| m.symbol == symbol)
    }

    /// 查找标的，不存在时返回 NotFound
    pub fn require(&self, symbol: &str) -> Result<&StockRecoveryMetric> {
        self.find(symbol)
            .ok_or_else(|| DashboardError::NotFound(symbol.to_string()))
    }

    pub fn metadata_for(&self, symbol: &str) -> Option<&StockMetadata> {
        self.metadata.iter().find(|m| m.symbol == symbol)
    }
}

/// 快照存储
///
/// 首次加载与刷新在 `loading` 锁内串行执行，并发请求只触发一次远端加载
#[derive(Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<MetricsSnapshot>>>,
    loading: Mutex<()>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用已有数据初始化
    #[cfg(test)]
    pub fn with_snapshot(snapshot: MetricsSnapshot) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
            loading: Mutex::new(()),
        }
    }

    fn cached(&self) -> Option<Arc<MetricsSnapshot>> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn replace(&self, snapshot: MetricsSnapshot) -> Arc<MetricsSnapshot> {
        let snapshot = Arc::new(snapshot);
        log::info!(
            "快照已更新: {} 条指标, {} 条描述信息",
            snapshot.metrics.len(),
            snapshot.metadata.len()
        );
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        snapshot
    }

    /// 当前快照，尚未加载时从远端加载
    pub async fn current(&self, client: &SupabaseClient) -> Result<Arc<MetricsSnapshot>> {
        self.current_with(|| load(client)).await
    }

    /// 并发拉取指标与描述信息并替换快照，失败时保留旧快照
    pub async fn reload(&self, client: &SupabaseClient) -> Result<Arc<MetricsSnapshot>> {
        self.reload_with(|| load(client)).await
    }

    async fn current_with<F, Fut>(&self, load: F) -> Result<Arc<MetricsSnapshot>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MetricsSnapshot>>,
    {
        if let Some(snapshot) = self.cached() {
            return Ok(snapshot);
        }

        let _guard = self.loading.lock().await;
        // 等锁期间可能已由其他请求加载完成
        if let Some(snapshot) = self.cached() {
            return Ok(snapshot);
        }
        Ok(self.replace(load().await?))
    }

    async fn reload_with<F, Fut>(&self, load: F) -> Result<Arc<MetricsSnapshot>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MetricsSnapshot>>,
    {
        let _guard = self.loading.lock().await;
        Ok(self.replace(load().await?))
    }
}

async fn load(client: &SupabaseClient) -> Result<MetricsSnapshot> {
    let (metrics, metadata) = futures::try_join!(
        client.fetch_recovery_metrics(),
        client.fetch_stock_metadata()
    )?;
    Ok(MetricsSnapshot::new(metrics, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarketCapCategory;
    use crate::services::analytics::test_support::stock;
    use futures::future::join_all;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_duplicate_symbols_keep_first() {
        let snapshot = MetricsSnapshot::new(
            vec![
                stock("TCS", "IT", MarketCapCategory::Large, 1.0),
                stock("TCS", "IT", MarketCapCategory::Large, 2.0),
            ],
            Vec::new(),
        );
        assert_eq!(snapshot.metrics.len(), 1);
        assert_eq!(snapshot.find("TCS").unwrap().bounce_percentage, 1.0);
    }

    #[test]
    fn test_require_unknown_symbol_is_not_found() {
        let snapshot = MetricsSnapshot::new(Vec::new(), Vec::new());
        assert!(matches!(snapshot.require("NOPE"), Err(DashboardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_preloaded_snapshot_is_reused() {
        let store = SnapshotStore::with_snapshot(MetricsSnapshot::new(
            vec![stock("TCS", "IT", MarketCapCategory::Large, 1.0)],
            Vec::new(),
        ));
        let config = crate::config::SupabaseConfig {
            url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = SupabaseClient::new(&config).unwrap();

        let snapshot = store.current(&client).await.unwrap();
        assert_eq!(snapshot.metrics.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_load_runs_once() {
        let store = SnapshotStore::new();
        let loads = AtomicUsize::new(0);

        let calls = (0..8).map(|_| {
            store.current_with(|| async {
                loads.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(MetricsSnapshot::new(
                    vec![stock("TCS", "IT", MarketCapCategory::Large, 1.0)],
                    Vec::new(),
                ))
            })
        });
        let results = join_all(calls).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshot() {
        let store = SnapshotStore::with_snapshot(MetricsSnapshot::new(
            vec![stock("TCS", "IT", MarketCapCategory::Large, 1.0)],
            Vec::new(),
        ));

        let result = store
            .reload_with(|| async { Err(DashboardError::fetch("stock_recovery_metrics", "down")) })
            .await;
        assert!(result.is_err());

        let snapshot = store
            .current_with(|| async { Ok(MetricsSnapshot::new(Vec::new(), Vec::new())) })
            .await
            .unwrap();
        assert_eq!(snapshot.metrics.len(), 1);
    }
}
