use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;

use super::queue_errors::Result;
use super::skip_model::{SkipAddedBy, SkipListEntry, SkipPolicy};
use super::skip_repository::SkipListRepositoryTrait;
use crate::constants::SKIP_LIST_FAILURE_THRESHOLD;

/// Trait defining the public interface of the skip list.
pub trait SkipListServiceTrait: Send + Sync {
    /// Records a failure for the key. Quarantines the entity once its
    /// consecutive-failure count (since last success) reaches the threshold.
    /// Returns the quarantine entry when one was created or refreshed.
    fn record_failure(
        &self,
        entity_key: &str,
        reason: &str,
        consecutive_failures: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<SkipListEntry>>;

    /// Whether non-manual queue population must exclude the key at `now`.
    fn is_skipped(&self, entity_key: &str, now: DateTime<Utc>) -> Result<bool>;

    /// Lifts the quarantine; invoked when a manual re-analysis targets the key.
    fn clear(&self, entity_key: &str) -> Result<()>;

    fn all_entries(&self) -> Result<Vec<SkipListEntry>>;
}

pub struct SkipListService {
    repository: Arc<dyn SkipListRepositoryTrait + Send + Sync>,
    failure_threshold: i32,
}

impl SkipListService {
    pub fn new(repository: Arc<dyn SkipListRepositoryTrait + Send + Sync>) -> Self {
        Self {
            repository,
            failure_threshold: SKIP_LIST_FAILURE_THRESHOLD,
        }
    }

    pub fn with_threshold(
        repository: Arc<dyn SkipListRepositoryTrait + Send + Sync>,
        failure_threshold: i32,
    ) -> Self {
        Self {
            repository,
            failure_threshold,
        }
    }
}

impl SkipListServiceTrait for SkipListService {
    fn record_failure(
        &self,
        entity_key: &str,
        reason: &str,
        consecutive_failures: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<SkipListEntry>> {
        if consecutive_failures < self.failure_threshold {
            return Ok(None);
        }

        let entry = match self.repository.get(entity_key)? {
            Some(mut existing) => {
                existing.failure_count = consecutive_failures;
                existing.last_failed_at = now;
                existing.reason = reason.to_string();
                existing.updated_at = now;
                existing
            }
            None => {
                warn!(
                    "Quarantining {} after {} consecutive failures: {}",
                    entity_key, consecutive_failures, reason
                );
                SkipListEntry {
                    entity_key: entity_key.to_string(),
                    reason: reason.to_string(),
                    failure_count: consecutive_failures,
                    first_failed_at: now,
                    last_failed_at: now,
                    policy: SkipPolicy::Forever,
                    added_by: SkipAddedBy::System,
                    notes: None,
                    created_at: now,
                    updated_at: now,
                }
            }
        };

        Ok(Some(self.repository.upsert(entry)?))
    }

    fn is_skipped(&self, entity_key: &str, now: DateTime<Utc>) -> Result<bool> {
        match self.repository.get(entity_key)? {
            Some(entry) => Ok(entry.policy.is_active(now)),
            None => Ok(false),
        }
    }

    fn clear(&self, entity_key: &str) -> Result<()> {
        if self.repository.get(entity_key)?.is_some() {
            info!("Clearing skip-list quarantine for {}", entity_key);
            self.repository.delete(entity_key)?;
        }
        Ok(())
    }

    fn all_entries(&self) -> Result<Vec<SkipListEntry>> {
        self.repository.all()
    }
}
