//! 业务逻辑服务模块
//!
//! 数据获取、缓存与聚合计算

pub mod analytics;     // 聚合计算（纯函数）
pub mod series_cache;  // 日线缓存
pub mod snapshot;      // 恢复指标快照
pub mod supabase;      // 远端数据存储客户端

pub use series_cache::SeriesCache;
pub use snapshot::SnapshotStore;
pub use supabase::SupabaseClient;
