//! Catalog trait: the read/write contract of the persistent chart store

use crate::error::Result;
use crate::types::{ChartId, ChartRecord, CreateChart, Fingerprint};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Persistent catalog of chart records
///
/// Records are keyed by `path`; implementations must never hold two records
/// with the same path. Timestamps (`last_scanned`) are owned by the catalog
/// and set on every upsert and touch.
#[async_trait]
pub trait ChartCatalog: Send + Sync {
    /// Every path currently in the catalog
    async fn get_all_paths(&self) -> Result<HashSet<String>>;

    /// Stored fingerprint for every path in the catalog
    async fn get_all_hashes(&self) -> Result<HashMap<String, Fingerprint>>;

    /// Insert a record, or replace the record stored at the same path
    ///
    /// Returns the record ID, which is stable across updates of one path.
    async fn upsert_chart(&self, chart: CreateChart) -> Result<ChartId>;

    /// Bump `last_scanned` for an unchanged record
    async fn touch_chart(&self, path: &str) -> Result<()>;

    /// Delete every record whose path is not in `seen_paths`
    ///
    /// Returns the number of deleted records.
    async fn delete_orphans(&self, seen_paths: &HashSet<String>) -> Result<u64>;

    /// Get record by ID
    async fn get_chart(&self, id: ChartId) -> Result<Option<ChartRecord>>;

    /// Get record by path
    async fn get_chart_by_path(&self, path: &str) -> Result<Option<ChartRecord>>;
}
