use chrono::{DateTime, Duration, Utc};
use log::info;
use std::collections::HashSet;
use std::sync::Arc;

use super::queue_model::{AnalysisKind, AnalysisQueueEntry, EnqueueOutcome};
use super::queue_repository::QueueRepositoryTrait;
use super::skip_service::SkipListServiceTrait;
use crate::analysis::{is_fresh, AnalysisResultRepositoryTrait};
use crate::constants::{
    ANALYSIS_FRESHNESS_HOURS, PRIORITY_DEFAULT, PRIORITY_MANUAL, PRIORITY_PORTFOLIO_HELD,
    PRIORITY_WATCHLIST,
};
use crate::diff::BasketChangeReport;
use crate::errors::Result;

/// Instruments the surrounding product currently holds or watches; drives
/// priority tiering during default queue population.
#[derive(Debug, Clone, Default)]
pub struct AnalysisUniverse {
    pub held: HashSet<String>,
    pub watchlist: HashSet<String>,
}

impl AnalysisUniverse {
    pub fn priority_for(&self, instrument_id: &str) -> i32 {
        if self.held.contains(instrument_id) {
            PRIORITY_PORTFOLIO_HELD
        } else if self.watchlist.contains(instrument_id) {
            PRIORITY_WATCHLIST
        } else {
            PRIORITY_DEFAULT
        }
    }
}

/// Outcome counts of one queue-population pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationSummary {
    pub enqueued: usize,
    pub already_active: usize,
    pub skipped_quarantined: usize,
    pub skipped_fresh: usize,
}

/// Trait defining the public interface of queue population.
pub trait QueueServiceTrait: Send + Sync {
    /// Manual re-analysis request: clears any quarantine for the key and
    /// enqueues at top priority, bypassing the freshness window.
    fn request_manual(&self, kind: AnalysisKind, target_key: &str) -> Result<EnqueueOutcome>;

    /// Populates the queue from one basket's significant changes: a
    /// basket-group entry plus one instrument entry per significant delta.
    fn populate_from_report(
        &self,
        report: &BasketChangeReport,
        universe: &AnalysisUniverse,
        now: DateTime<Utc>,
    ) -> Result<PopulationSummary>;
}

pub struct QueueService {
    repository: Arc<dyn QueueRepositoryTrait + Send + Sync>,
    skip_list: Arc<dyn SkipListServiceTrait + Send + Sync>,
    results: Arc<dyn AnalysisResultRepositoryTrait + Send + Sync>,
    freshness_window: Duration,
}

impl QueueService {
    pub fn new(
        repository: Arc<dyn QueueRepositoryTrait + Send + Sync>,
        skip_list: Arc<dyn SkipListServiceTrait + Send + Sync>,
        results: Arc<dyn AnalysisResultRepositoryTrait + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            skip_list,
            results,
            freshness_window: Duration::hours(ANALYSIS_FRESHNESS_HOURS),
        }
    }

    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// Basket-group entries are keyed "basket@date" so each basket/date pair
    /// is its own logical unit of work.
    pub fn basket_group_key(report: &BasketChangeReport) -> String {
        format!("{}@{}", report.basket_id, report.as_of)
    }

    fn try_enqueue(
        &self,
        kind: AnalysisKind,
        key: &str,
        priority: i32,
        now: DateTime<Utc>,
        summary: &mut PopulationSummary,
    ) -> Result<()> {
        if self.skip_list.is_skipped(key, now)? {
            summary.skipped_quarantined += 1;
            return Ok(());
        }
        let last_success = self.results.last_success_at(key, kind)?;
        if is_fresh(last_success, now, self.freshness_window) {
            summary.skipped_fresh += 1;
            return Ok(());
        }
        let entry = AnalysisQueueEntry::new(kind, key, priority, false);
        match self.repository.enqueue(entry)? {
            EnqueueOutcome::Inserted(_) => summary.enqueued += 1,
            EnqueueOutcome::AlreadyActive => summary.already_active += 1,
        }
        Ok(())
    }
}

impl QueueServiceTrait for QueueService {
    fn request_manual(&self, kind: AnalysisKind, target_key: &str) -> Result<EnqueueOutcome> {
        self.skip_list.clear(target_key)?;

        let entry = AnalysisQueueEntry::new(kind, target_key, PRIORITY_MANUAL, true);
        let outcome = self.repository.enqueue(entry)?;

        if let EnqueueOutcome::Inserted(ref inserted) = outcome {
            info!(
                "Manual analysis requested for {} {} (entry {})",
                kind.as_str(),
                target_key,
                inserted.id
            );
        }

        Ok(outcome)
    }

    fn populate_from_report(
        &self,
        report: &BasketChangeReport,
        universe: &AnalysisUniverse,
        now: DateTime<Utc>,
    ) -> Result<PopulationSummary> {
        let mut summary = PopulationSummary::default();

        if !report.has_reportable_changes() {
            return Ok(summary);
        }

        let group_key = Self::basket_group_key(report);
        self.try_enqueue(
            AnalysisKind::BasketGroup,
            &group_key,
            PRIORITY_DEFAULT,
            now,
            &mut summary,
        )?;

        for delta in &report.significant {
            let priority = universe.priority_for(&delta.instrument_id);
            self.try_enqueue(
                AnalysisKind::Instrument,
                &delta.instrument_id,
                priority,
                now,
                &mut summary,
            )?;
        }

        info!(
            "Queue population for basket {} on {}: {} enqueued, {} active, {} quarantined, {} fresh",
            report.basket_id,
            report.as_of,
            summary.enqueued,
            summary.already_active,
            summary.skipped_quarantined,
            summary.skipped_fresh
        );

        Ok(summary)
    }
}
