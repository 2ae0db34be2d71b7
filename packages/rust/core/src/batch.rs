//! Batch enrichment over a bounded worker pool.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use leadenrich_shared::{EnrichError, EnrichmentRecord, Result};

use crate::pipeline::{Pipeline, RunReport, SilentProgress};

/// Per-record progress for batch runs.
pub trait BatchProgress: Send + Sync {
    /// Called as each record's result is collected, in input order.
    fn record_finished(&self, index: usize, ok: bool, done: usize, total: usize);
}

impl BatchProgress for SilentProgress {
    fn record_finished(&self, _index: usize, _ok: bool, _done: usize, _total: usize) {}
}

/// Outcome of a batch: one result per input, in input order.
#[derive(Debug)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub results: Vec<Result<RunReport>>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn elapsed(&self) -> Duration {
        (self.completed_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Enrich every input with at most `concurrency` records in flight.
///
/// A failing record, or a panicking worker, only fails its own slot.
#[instrument(skip_all, fields(records = inputs.len(), concurrency))]
pub async fn enrich_batch(
    pipeline: Arc<Pipeline>,
    inputs: Vec<EnrichmentRecord>,
    concurrency: usize,
    progress: &dyn BatchProgress,
) -> BatchReport {
    let started_at = Utc::now();
    let total = inputs.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    info!("starting batch");

    let mut handles = Vec::with_capacity(total);
    for record in inputs {
        let pipeline = Arc::clone(&pipeline);
        let sem = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            match sem.acquire_owned().await {
                Ok(_permit) => pipeline.run_with_report(record, &SilentProgress).await,
                Err(_) => Err(EnrichError::Task("worker pool closed".into())),
            }
        }));
    }

    let mut results = Vec::with_capacity(total);
    for (index, handle) in handles.into_iter().enumerate() {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(EnrichError::Task(e.to_string())),
        };
        if let Err(e) = &result {
            warn!(index, error = %e, "record failed");
        }
        progress.record_finished(index, result.is_ok(), index + 1, total);
        results.push(result);
    }

    let report = BatchReport {
        started_at,
        completed_at: Utc::now(),
        results,
    };
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        elapsed_ms = u64::try_from(report.elapsed().as_millis()).unwrap_or(u64::MAX),
        "batch complete"
    );
    report
}
