//! Bounded-concurrency ingestion of discovered units

use crate::change::{CatalogSnapshot, ChangeStatus};
use crate::error::Result;
use crate::extract::ingest_unit;
use crate::fingerprint::fingerprint_unit;
use crate::options::SCAN_CONCURRENCY;
use crate::progress::ProgressReporter;
use chartdex_core::{ChartCatalog, ChartParser, ChartUnit, ScanIssue, ScanPhase, ScanProgress};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

/// Fixed-size pool of ingestion permits
pub(crate) struct WorkerPool {
    permits: Mutex<Arc<Semaphore>>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self {
            permits: Mutex::new(Arc::new(Semaphore::new(SCAN_CONCURRENCY))),
        }
    }

    fn permits(&self) -> Arc<Semaphore> {
        match self.permits.lock() {
            Ok(permits) => permits.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Start over with a fresh pool; permits still held by finishing
    /// work go back to the old one
    pub fn reset(&self) {
        let fresh = Arc::new(Semaphore::new(SCAN_CONCURRENCY));
        match self.permits.lock() {
            Ok(mut permits) => *permits = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }
}

/// Everything a unit task needs, shared by all tasks of one run
pub(crate) struct ScheduleContext {
    pub catalog: Arc<dyn ChartCatalog>,
    pub parser: Arc<dyn ChartParser>,
    pub snapshot: Arc<CatalogSnapshot>,
    pub cancel: Arc<AtomicBool>,
    pub reporter: ProgressReporter,
    pub progress_interval: usize,
}

/// What the scheduler did with the units it was given
#[derive(Debug, Default)]
pub(crate) struct ScheduleOutcome {
    pub added: usize,
    pub updated: usize,
    pub errors: Vec<ScanIssue>,
    /// Paths of every dispatched unit, including failed ones
    pub seen: HashSet<String>,
    pub cancelled: bool,
}

enum Settled {
    Added,
    Updated,
    Failed(ScanIssue),
}

/// Folds settled tasks into the outcome and reports progress
///
/// Only the dispatching task touches it, so `current` only ever grows.
struct Tally<'a> {
    ctx: &'a ScheduleContext,
    outcome: ScheduleOutcome,
    total: usize,
    done: usize,
}

impl<'a> Tally<'a> {
    fn settle(&mut self, joined: std::result::Result<(String, Settled), JoinError>) {
        let key = match joined {
            Ok((key, Settled::Added)) => {
                self.outcome.added += 1;
                key
            }
            Ok((key, Settled::Updated)) => {
                self.outcome.updated += 1;
                key
            }
            Ok((key, Settled::Failed(issue))) => {
                self.outcome.errors.push(issue);
                key
            }
            Err(e) => {
                warn!(error = %e, "Chart task panicked");
                self.outcome
                    .errors
                    .push(ScanIssue::new(String::new(), format!("Scan task failed: {}", e)));
                String::new()
            }
        };

        self.done += 1;
        let interval = self.ctx.progress_interval;
        if interval > 0 && self.done % interval == 0 {
            self.ctx.reporter.offer(ScanProgress {
                phase: ScanPhase::Scanning,
                current: self.done,
                total: self.total,
                current_path: Some(key),
                message: format!("Scanned {} of {} charts", self.done, self.total),
            });
        }
    }
}

/// Ingest `units` with at most [`SCAN_CONCURRENCY`] in flight
///
/// Returns once every dispatched unit has settled. Dispatch stops as soon as
/// the cancel flag is seen.
pub(crate) async fn schedule(
    units: Vec<ChartUnit>,
    pool: &WorkerPool,
    ctx: Arc<ScheduleContext>,
) -> ScheduleOutcome {
    let total = units.len();
    let permits = pool.permits();
    let mut tasks: JoinSet<(String, Settled)> = JoinSet::new();
    let mut tally = Tally {
        ctx: ctx.as_ref(),
        outcome: ScheduleOutcome {
            seen: HashSet::with_capacity(total),
            ..ScheduleOutcome::default()
        },
        total,
        done: 0,
    };

    for unit in units {
        if ctx.cancel.load(Ordering::SeqCst) {
            tally.outcome.cancelled = true;
            break;
        }

        // Settle finished units while waiting for a free permit
        let permit = loop {
            tokio::select! {
                permit = permits.clone().acquire_owned() => break permit.ok(),
                Some(joined) = tasks.join_next() => tally.settle(joined),
            }
        };
        let Some(permit) = permit else {
            break;
        };
        // Cancellation may have arrived while waiting for a permit
        if ctx.cancel.load(Ordering::SeqCst) {
            tally.outcome.cancelled = true;
            break;
        }

        let key = unit.key();
        tally.outcome.seen.insert(key.clone());

        let task_ctx = ctx.clone();
        tasks.spawn(async move {
            let settled = match process_unit(unit, &task_ctx).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(path = %key, error = %e, "Failed to ingest chart");
                    Settled::Failed(ScanIssue::new(key.clone(), e.to_string()))
                }
            };
            drop(permit);
            (key, settled)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        tally.settle(joined);
    }

    let done = tally.done;
    ctx.reporter
        .report(ScanProgress {
            phase: ScanPhase::Scanning,
            current: done,
            total,
            current_path: None,
            message: format!("Scanned {} of {} charts", done, total),
        })
        .await;

    tally.outcome
}

async fn process_unit(unit: ChartUnit, ctx: &ScheduleContext) -> Result<Settled> {
    let key = unit.key();

    let (unit, fingerprint) = tokio::task::spawn_blocking(move || {
        let fingerprint = fingerprint_unit(&unit);
        (unit, fingerprint)
    })
    .await?;
    let fingerprint = fingerprint?;

    let status = ctx.snapshot.classify(&key, &fingerprint);
    if status == ChangeStatus::Unchanged {
        ctx.catalog.touch_chart(&key).await?;
        debug!(path = %key, "Chart unchanged");
        return Ok(Settled::Updated);
    }

    let parser = ctx.parser.clone();
    let chart =
        tokio::task::spawn_blocking(move || ingest_unit(&unit, parser.as_ref(), fingerprint))
            .await??;
    ctx.catalog.upsert_chart(chart).await?;

    Ok(match status {
        ChangeStatus::New => Settled::Added,
        _ => Settled::Updated,
    })
}
