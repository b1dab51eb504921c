use chrono::{NaiveDate, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::jobs_model::{GuardOutcome, JobStatus};
use super::jobs_repository::JobExecutionRepositoryTrait;
use crate::constants::DIFF_JOB_NAME;
use crate::diff::DiffServiceTrait;
use crate::errors::Result;
use crate::queue::{AnalysisUniverse, QueueServiceTrait};
use crate::snapshots::SnapshotRepositoryTrait;

/// Counts for one diff-job run across all baskets with data on the date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiffJobSummary {
    pub baskets_seen: usize,
    pub baskets_diffed: usize,
    pub baskets_without_history: usize,
    pub baskets_failed: usize,
    pub noise_changesets: usize,
    pub entries_enqueued: usize,
}

/// Scheduler entry point for the daily diff pass.
///
/// Each basket is diffed independently; a failure in one basket is logged
/// and counted but never aborts the rest of the run.
pub struct DiffJobService {
    guard: Arc<dyn JobExecutionRepositoryTrait + Send + Sync>,
    snapshots: Arc<dyn SnapshotRepositoryTrait + Send + Sync>,
    diff: Arc<dyn DiffServiceTrait + Send + Sync>,
    queue: Arc<dyn QueueServiceTrait + Send + Sync>,
}

impl DiffJobService {
    pub fn new(
        guard: Arc<dyn JobExecutionRepositoryTrait + Send + Sync>,
        snapshots: Arc<dyn SnapshotRepositoryTrait + Send + Sync>,
        diff: Arc<dyn DiffServiceTrait + Send + Sync>,
        queue: Arc<dyn QueueServiceTrait + Send + Sync>,
    ) -> Self {
        Self {
            guard,
            snapshots,
            diff,
            queue,
        }
    }

    /// Diffs every basket that has a snapshot on `as_of` and populates the
    /// analysis queue from the reportable changes.
    ///
    /// Returns `None` when another run for the same date is already in
    /// progress.
    pub fn run(
        &self,
        as_of: NaiveDate,
        universe: &AnalysisUniverse,
    ) -> Result<Option<DiffJobSummary>> {
        let record = match self.guard.try_begin(DIFF_JOB_NAME, as_of, "all")? {
            GuardOutcome::Started(record) => record,
            GuardOutcome::AlreadyRunning => {
                info!("Diff job for {} already running; skipping", as_of);
                return Ok(None);
            }
        };

        let outcome = self.run_guarded(as_of, universe);

        match &outcome {
            Ok(summary) => {
                self.guard
                    .finish(&record.id, JobStatus::Success, None, Utc::now())?;
                info!(
                    "Diff job for {}: {} baskets, {} diffed, {} without history, {} failed, {} noise, {} enqueued",
                    as_of,
                    summary.baskets_seen,
                    summary.baskets_diffed,
                    summary.baskets_without_history,
                    summary.baskets_failed,
                    summary.noise_changesets,
                    summary.entries_enqueued
                );
            }
            Err(e) => {
                self.guard.finish(
                    &record.id,
                    JobStatus::Failed,
                    Some(&e.to_string()),
                    Utc::now(),
                )?;
            }
        }

        outcome.map(Some)
    }

    fn run_guarded(&self, as_of: NaiveDate, universe: &AnalysisUniverse) -> Result<DiffJobSummary> {
        let mut summary = DiffJobSummary::default();
        let baskets = self.snapshots.baskets_for_date(as_of)?;
        summary.baskets_seen = baskets.len();

        for basket_id in &baskets {
            match self.diff.diff_basket(basket_id, as_of) {
                Ok(Some(report)) => {
                    summary.baskets_diffed += 1;
                    if report.classified_noise {
                        summary.noise_changesets += 1;
                    }
                    if report.has_reportable_changes() {
                        // Population failures are isolated per basket, like
                        // diff failures: the remaining baskets still run.
                        match self.queue.populate_from_report(&report, universe, Utc::now()) {
                            Ok(population) => summary.entries_enqueued += population.enqueued,
                            Err(e) => {
                                error!(
                                    "Queue population failed for basket {} on {}: {}",
                                    basket_id, as_of, e
                                );
                                summary.baskets_failed += 1;
                            }
                        }
                    }
                }
                Ok(None) => {
                    summary.baskets_without_history += 1;
                }
                Err(e) => {
                    error!("Diff failed for basket {} on {}: {}", basket_id, as_of, e);
                    summary.baskets_failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
