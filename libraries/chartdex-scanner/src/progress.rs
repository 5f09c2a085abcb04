//! Progress delivery and the pollable run state

use chartdex_core::{ScanPhase, ScanProgress};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Sends progress to the caller's channel and records it as the current state
#[derive(Clone)]
pub(crate) struct ProgressReporter {
    tx: Option<mpsc::Sender<ScanProgress>>,
    state: Arc<Mutex<Option<ScanProgress>>>,
}

impl ProgressReporter {
    pub fn new(
        tx: Option<mpsc::Sender<ScanProgress>>,
        state: Arc<Mutex<Option<ScanProgress>>>,
    ) -> Self {
        Self { tx, state }
    }

    pub async fn report(&self, progress: ScanProgress) {
        if let Ok(mut state) = self.state.lock() {
            *state = Some(progress.clone());
        }
        if let Some(tx) = &self.tx {
            // A dropped receiver only means nobody is listening
            let _ = tx.send(progress).await;
        }
    }

    /// Record `progress` and pass it on only if the channel has room
    ///
    /// Used for per-unit updates so a slow receiver never holds up ingestion.
    pub fn offer(&self, progress: ScanProgress) {
        if let Ok(mut state) = self.state.lock() {
            *state = Some(progress.clone());
        }
        if let Some(tx) = &self.tx {
            if tx.try_send(progress).is_err() {
                tracing::trace!("Progress channel full, dropping update");
            }
        }
    }

    pub async fn phase(&self, phase: ScanPhase, message: impl Into<String>) {
        self.report(ScanProgress::new(phase, message)).await;
    }
}
