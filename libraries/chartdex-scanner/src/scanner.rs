/// Chart library scanner
use crate::change::CatalogSnapshot;
use crate::discovery::{discover_units, is_container, list_dir};
use crate::error::{Result, ScanError};
use crate::extract::ingest_unit;
use crate::fingerprint::fingerprint_unit;
use crate::options::ScanOptions;
use crate::progress::ProgressReporter;
use crate::scheduler::{schedule, ScheduleContext, WorkerPool};
use chartdex_core::{
    path_key, ChartCatalog, ChartParser, ChartRecord, ChartUnit, ScanIssue, ScanPhase,
    ScanProgress, ScanResult,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Clears the scanning flag when a run ends, however it ends
struct ScanGuard<'a>(&'a AtomicBool);

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Scans library roots and keeps a chart catalog in sync with them
///
/// Each scanner owns its scanning flag, cancel flag and worker pool; a second
/// `scan_library_paths` call while one is running is rejected with
/// [`ScanError::AlreadyScanning`].
pub struct ChartScanner {
    catalog: Arc<dyn ChartCatalog>,
    parser: Arc<dyn ChartParser>,
    options: ScanOptions,
    scanning: AtomicBool,
    cancel: Arc<AtomicBool>,
    pool: WorkerPool,
    state: Arc<Mutex<Option<ScanProgress>>>,
}

impl ChartScanner {
    /// Create a scanner with default options
    pub fn new(catalog: Arc<dyn ChartCatalog>, parser: Arc<dyn ChartParser>) -> Self {
        Self::with_options(catalog, parser, ScanOptions::default())
    }

    /// Create a scanner with custom options
    pub fn with_options(
        catalog: Arc<dyn ChartCatalog>,
        parser: Arc<dyn ChartParser>,
        options: ScanOptions,
    ) -> Self {
        Self {
            catalog,
            parser,
            options,
            scanning: AtomicBool::new(false),
            cancel: Arc::new(AtomicBool::new(false)),
            pool: WorkerPool::new(),
            state: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Last progress reported by the current or most recent run
    pub fn state(&self) -> Option<ScanProgress> {
        self.state.lock().ok().and_then(|state| state.clone())
    }

    /// Ask the running scan to stop
    ///
    /// No new units are dispatched; units already being ingested finish and
    /// are counted. Orphans are not deleted after a cancelled run.
    pub fn cancel_scan(&self) {
        if self.is_scanning() {
            info!("Scan cancellation requested");
            self.cancel.store(true, Ordering::SeqCst);
        }
    }

    /// Scan every root in `paths` and reconcile the catalog
    ///
    /// Per-root and per-unit failures are collected in
    /// [`ScanResult::errors`]. The call itself fails only when a scan is
    /// already running, no paths were given, or the catalog cannot be read.
    ///
    /// # Arguments
    /// * `paths` - Library roots to scan
    /// * `progress_tx` - Optional channel for progress updates
    pub async fn scan_library_paths(
        &self,
        paths: &[PathBuf],
        progress_tx: Option<mpsc::Sender<ScanProgress>>,
    ) -> Result<ScanResult> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ScanError::AlreadyScanning);
        }
        let _guard = ScanGuard(&self.scanning);
        self.cancel.store(false, Ordering::SeqCst);

        let reporter = ProgressReporter::new(progress_tx, self.state.clone());
        match self.run(paths, &reporter).await {
            Ok(result) => Ok(result),
            Err(e) => {
                reporter.phase(ScanPhase::Error, e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn run(&self, paths: &[PathBuf], reporter: &ProgressReporter) -> Result<ScanResult> {
        let start = Instant::now();
        let roots = dedupe_roots(paths);
        if roots.is_empty() {
            return Err(ScanError::NoLibraryPaths);
        }

        let snapshot = Arc::new(CatalogSnapshot::new(
            self.catalog.get_all_paths().await?,
            self.catalog.get_all_hashes().await?,
        ));

        info!(roots = roots.len(), catalogued = snapshot.len(), "Starting library scan");
        reporter
            .phase(
                ScanPhase::Discovering,
                format!("Discovering charts in {} library paths", roots.len()),
            )
            .await;

        let mut result = ScanResult::default();
        let mut failed_roots = Vec::new();
        let mut units = Vec::new();
        let mut unit_keys = HashSet::new();

        for root in &roots {
            if self.cancel.load(Ordering::SeqCst) {
                break;
            }
            match self.discover_root(root).await {
                Ok(found) => {
                    for unit in found {
                        if unit_keys.insert(unit.key()) {
                            units.push(unit);
                        }
                    }
                }
                Err(e) => {
                    warn!(path = %root.display(), error = %e, "Cannot read library path");
                    result.errors.push(ScanIssue::new(
                        path_key(root),
                        format!("Cannot read library path: {}", e),
                    ));
                    failed_roots.push(root.clone());
                }
            }
        }

        if self.cancel.load(Ordering::SeqCst) {
            return Ok(self.finish_cancelled(result, start, reporter).await);
        }

        let total = units.len();
        info!(units = total, "Discovery complete");
        reporter
            .report(ScanProgress {
                phase: ScanPhase::Scanning,
                current: 0,
                total,
                current_path: None,
                message: format!("Scanning {} charts", total),
            })
            .await;

        let ctx = Arc::new(ScheduleContext {
            catalog: self.catalog.clone(),
            parser: self.parser.clone(),
            snapshot: snapshot.clone(),
            cancel: self.cancel.clone(),
            reporter: reporter.clone(),
            progress_interval: self.options.progress_interval,
        });
        let outcome = schedule(units, &self.pool, ctx).await;

        result.added = outcome.added;
        result.updated = outcome.updated;
        result.errors.extend(outcome.errors);

        if outcome.cancelled || self.cancel.load(Ordering::SeqCst) {
            return Ok(self.finish_cancelled(result, start, reporter).await);
        }

        reporter
            .phase(ScanPhase::Reconciling, "Removing charts that no longer exist")
            .await;

        let mut seen = outcome.seen;
        for root in &failed_roots {
            seen.extend(snapshot.paths_under(root).cloned());
        }

        match self.catalog.delete_orphans(&seen).await {
            Ok(removed) => result.removed = removed,
            Err(e) => {
                warn!(error = %e, "Failed to remove orphaned charts");
                result
                    .errors
                    .push(ScanIssue::new(String::new(), format!("Failed to remove orphans: {}", e)));
            }
        }

        result.duration = start.elapsed();
        info!(
            added = result.added,
            updated = result.updated,
            removed = result.removed,
            errors = result.errors.len(),
            duration_ms = result.duration.as_millis() as u64,
            "Library scan complete"
        );
        reporter
            .report(ScanProgress {
                phase: ScanPhase::Complete,
                current: total,
                total,
                current_path: None,
                message: format!(
                    "Added {}, updated {}, removed {}",
                    result.added, result.updated, result.removed
                ),
            })
            .await;

        Ok(result)
    }

    async fn discover_root(&self, root: &Path) -> std::io::Result<Vec<ChartUnit>> {
        let root = root.to_path_buf();
        let max_depth = self.options.max_depth;
        let cancel = self.cancel.clone();

        tokio::task::spawn_blocking(move || -> std::io::Result<Vec<ChartUnit>> {
            // An unreadable root is an error, unlike unreadable directories below it
            std::fs::read_dir(&root)?;
            Ok(discover_units(&root, max_depth, &cancel))
        })
        .await
        .map_err(std::io::Error::other)?
    }

    async fn finish_cancelled(
        &self,
        mut result: ScanResult,
        start: Instant,
        reporter: &ProgressReporter,
    ) -> ScanResult {
        self.pool.reset();
        result.removed = 0;
        result.duration = start.elapsed();
        info!(
            added = result.added,
            updated = result.updated,
            "Library scan cancelled"
        );
        reporter.phase(ScanPhase::Cancelled, "Scan cancelled").await;
        result
    }

    /// Re-ingest a single chart folder or container, skipping change detection
    ///
    /// Returns `Ok(None)` when `path` does not exist or is not a chart unit.
    /// A folder that has subdirectories is not a unit, matching discovery.
    pub async fn rescan_chart(&self, path: &Path) -> Result<Option<ChartRecord>> {
        let path = path.to_path_buf();
        let parser = self.parser.clone();

        let chart = tokio::task::spawn_blocking(move || -> Result<_> {
            let Some(unit) = unit_at(&path)? else {
                return Ok(None);
            };
            let fingerprint = fingerprint_unit(&unit)?;
            Ok(Some(ingest_unit(&unit, parser.as_ref(), fingerprint)?))
        })
        .await??;

        let Some(chart) = chart else {
            return Ok(None);
        };
        let id = self.catalog.upsert_chart(chart).await?;
        info!(id, "Rescanned chart");

        Ok(self.catalog.get_chart(id).await?)
    }
}

/// Classify a single path as a chart unit
fn unit_at(path: &Path) -> Result<Option<ChartUnit>> {
    let Ok(metadata) = std::fs::metadata(path) else {
        return Ok(None);
    };

    if metadata.is_file() {
        let is_sng = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_container);
        return Ok(is_sng.then(|| ChartUnit::Container {
            path: path.to_path_buf(),
        }));
    }

    // Same rule as discovery, so a full scan keeps what this stores
    let listing = list_dir(path)?;
    Ok(listing.is_chart_folder().then(|| ChartUnit::Folder {
        path: path.to_path_buf(),
        files: listing.files,
    }))
}

/// Drop duplicate roots and roots nested inside another root
fn dedupe_roots(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for path in paths {
        if roots.iter().any(|root| path.starts_with(root)) {
            continue;
        }
        roots.retain(|root| !root.starts_with(path));
        roots.push(path.clone());
    }
    roots
}
