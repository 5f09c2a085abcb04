//! In-process catalog for embedding and tests

use async_trait::async_trait;
use chartdex_core::{
    error::Result, ChartCatalog, ChartId, ChartRecord, CreateChart, Fingerprint,
};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: ChartId,
    by_path: HashMap<String, ChartRecord>,
}

/// Chart catalog held in memory
///
/// Behaves like [`SqliteCatalog`](crate::SqliteCatalog): IDs are stable
/// across upserts of one path and never reused.
#[derive(Default)]
pub struct MemoryCatalog {
    inner: RwLock<Inner>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_path.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of every record, sorted by path
    pub async fn records(&self) -> Vec<ChartRecord> {
        let mut records: Vec<_> = self.inner.read().await.by_path.values().cloned().collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
impl ChartCatalog for MemoryCatalog {
    async fn get_all_paths(&self) -> Result<HashSet<String>> {
        Ok(self.inner.read().await.by_path.keys().cloned().collect())
    }

    async fn get_all_hashes(&self) -> Result<HashMap<String, Fingerprint>> {
        Ok(self
            .inner
            .read()
            .await
            .by_path
            .iter()
            .map(|(path, record)| (path.clone(), record.fingerprint.clone()))
            .collect())
    }

    async fn upsert_chart(&self, chart: CreateChart) -> Result<ChartId> {
        let mut inner = self.inner.write().await;

        let id = match inner.by_path.get(&chart.path) {
            Some(existing) => existing.id,
            None => {
                inner.next_id += 1;
                inner.next_id
            }
        };

        inner.by_path.insert(
            chart.path.clone(),
            ChartRecord {
                id,
                path: chart.path,
                chart_type: chart.chart_type,
                fingerprint: chart.fingerprint,
                last_scanned: now_ms(),
                metadata: chart.metadata,
            },
        );

        Ok(id)
    }

    async fn touch_chart(&self, path: &str) -> Result<()> {
        if let Some(record) = self.inner.write().await.by_path.get_mut(path) {
            record.last_scanned = now_ms();
        }
        Ok(())
    }

    async fn delete_orphans(&self, seen_paths: &HashSet<String>) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.by_path.len();
        inner.by_path.retain(|path, _| seen_paths.contains(path));
        Ok((before - inner.by_path.len()) as u64)
    }

    async fn get_chart(&self, id: ChartId) -> Result<Option<ChartRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .by_path
            .values()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn get_chart_by_path(&self, path: &str) -> Result<Option<ChartRecord>> {
        Ok(self.inner.read().await.by_path.get(path).cloned())
    }
}
