//! 日线缓存
//!
//! 按标的缓存已拉取的日线，只拉取尚未缓存的标的。
//! 聚合引擎不直接访问缓存，只接收 `snapshot` 返回的普通映射。

use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::analytics::SeriesBySymbol;
use super::supabase::SupabaseClient;
use crate::error::Result;
use crate::models::DailyPricePoint;

#[derive(Default)]
pub struct SeriesCache {
    entries: RwLock<HashMap<String, Arc<Vec<DailyPricePoint>>>>,
    /// 每次 clear 加一，拉取期间发生过清空的结果不再写入
    generation: AtomicU64,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<Arc<Vec<DailyPricePoint>>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(symbol)
            .cloned()
    }

    #[cfg(test)]
    pub fn insert(&self, symbol: &str, points: Vec<DailyPricePoint>) -> Arc<Vec<DailyPricePoint>> {
        let points = Arc::new(points);
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(symbol.to_string(), points.clone());
        points
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        self.generation.fetch_add(1, Ordering::SeqCst);
        entries.clear();
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 仅当 generation 之后未清空过时写入缓存，总是返回数据本身
    fn insert_if_current(
        &self,
        symbol: &str,
        points: Vec<DailyPricePoint>,
        generation: u64,
    ) -> Arc<Vec<DailyPricePoint>> {
        let points = Arc::new(points);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if self.generation() == generation {
            entries.insert(symbol.to_string(), points.clone());
        } else {
            log::debug!("{} 日线拉取期间缓存已清空，结果不写入", symbol);
        }
        points
    }

    /// 当前已缓存的部分，未缓存的标的不出现在结果中
    pub fn snapshot(&self, symbols: &[String]) -> SeriesBySymbol {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        symbols
            .iter()
            .filter_map(|s| entries.get(s).map(|points| (s.clone(), points.clone())))
            .collect()
    }

    /// 获取单个标的日线，未缓存时拉取
    pub async fn get_or_fetch(
        &self,
        client: &SupabaseClient,
        symbol: &str,
    ) -> Result<Arc<Vec<DailyPricePoint>>> {
        if let Some(points) = self.get(symbol) {
            log::debug!("日线缓存命中: {}", symbol);
            return Ok(points);
        }

        let generation = self.generation();
        log::info!("拉取 {} 日线", symbol);
        let points = client.fetch_daily_series(symbol).await?;
        Ok(self.insert_if_current(symbol, points, generation))
    }

    /// 并发拉取缺失标的后返回这些标的的日线
    pub async fn ensure_loaded(
        &self,
        client: &SupabaseClient,
        symbols: &[String],
    ) -> Result<SeriesBySymbol> {
        let missing: Vec<&String> = symbols.iter().filter(|s| self.get(s).is_none()).collect();
        if !missing.is_empty() {
            log::info!("日线缓存缺失 {} 个标的", missing.len());
            try_join_all(missing.into_iter().map(|s| self.get_or_fetch(client, s))).await?;
        }
        Ok(self.snapshot(symbols))
    }
}
