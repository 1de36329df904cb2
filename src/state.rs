//! 应用共享状态

use crate::config::DashboardConfig;
use crate::services::{SeriesCache, SnapshotStore, SupabaseClient};

/// 各请求共享的客户端、快照与日线缓存
pub struct AppState {
    pub client: SupabaseClient,
    pub snapshots: SnapshotStore,
    pub series: SeriesCache,
    pub dashboard: DashboardConfig,
}

impl AppState {
    pub fn new(client: SupabaseClient, dashboard: DashboardConfig) -> Self {
        Self {
            client,
            snapshots: SnapshotStore::new(),
            series: SeriesCache::new(),
            dashboard,
        }
    }
}
