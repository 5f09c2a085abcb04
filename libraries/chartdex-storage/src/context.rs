use crate::charts;
use async_trait::async_trait;
use chartdex_core::{
    error::Result, ChartCatalog, ChartId, ChartRecord, CreateChart, Fingerprint,
};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

/// Chart catalog backed by `SQLite`
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every stored chart, ordered by artist then name
    pub async fn get_all_charts(&self) -> Result<Vec<ChartRecord>> {
        charts::get_all(&self.pool).await
    }
}

#[async_trait]
impl ChartCatalog for SqliteCatalog {
    async fn get_all_paths(&self) -> Result<HashSet<String>> {
        charts::get_all_paths(&self.pool).await
    }

    async fn get_all_hashes(&self) -> Result<HashMap<String, Fingerprint>> {
        charts::get_all_hashes(&self.pool).await
    }

    async fn upsert_chart(&self, chart: CreateChart) -> Result<ChartId> {
        charts::upsert(&self.pool, chart).await
    }

    async fn touch_chart(&self, path: &str) -> Result<()> {
        charts::touch(&self.pool, path).await
    }

    async fn delete_orphans(&self, seen_paths: &HashSet<String>) -> Result<u64> {
        charts::delete_orphans(&self.pool, seen_paths).await
    }

    async fn get_chart(&self, id: ChartId) -> Result<Option<ChartRecord>> {
        charts::get_by_id(&self.pool, id).await
    }

    async fn get_chart_by_path(&self, path: &str) -> Result<Option<ChartRecord>> {
        charts::get_by_path(&self.pool, path).await
    }
}
