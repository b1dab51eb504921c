use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::DatabaseErrorKind;
use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::queue_errors::{QueueError, Result};
use super::queue_model::{
    AnalysisKind, AnalysisQueueEntry, AnalysisQueueEntryDB, EnqueueOutcome, QueueStatus,
};
use crate::db::get_connection;
use crate::schema::analysis_queue;

const ACTIVE_STATUSES: [&str; 2] = ["PENDING", "IN_PROGRESS"];

pub trait QueueRepositoryTrait: Send + Sync {
    /// Inserts a new entry, or reports `AlreadyActive` when the logical key
    /// already has a pending or in-progress row. The uniqueness is enforced
    /// by a partial unique index, so concurrent enqueues cannot both win.
    fn enqueue(&self, entry: AnalysisQueueEntry) -> Result<EnqueueOutcome>;

    /// Highest-priority pending entry; ties broken by oldest creation time.
    fn dequeue_next(&self) -> Result<Option<AnalysisQueueEntry>>;

    fn mark_in_progress(&self, id: &str) -> Result<AnalysisQueueEntry>;
    fn mark_completed(&self, id: &str) -> Result<()>;
    fn mark_failed(&self, id: &str, error: &str) -> Result<()>;

    fn find_active(&self, kind: AnalysisKind, target_key: &str)
        -> Result<Option<AnalysisQueueEntry>>;

    /// Failed terminal entries for this key since its most recent completed
    /// one. Feeds the skip-list quarantine threshold.
    fn count_consecutive_failures(&self, kind: AnalysisKind, target_key: &str) -> Result<i32>;

    fn pending_count(&self) -> Result<i64>;
}

pub struct QueueRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl QueueRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn get_entry(&self, id: &str) -> Result<AnalysisQueueEntry> {
        let mut conn = get_connection(&self.pool)?;
        let row = analysis_queue::table
            .find(id)
            .first::<AnalysisQueueEntryDB>(&mut conn)
            .optional()?
            .ok_or_else(|| QueueError::NotFound(id.to_string()))?;
        Ok(row.into())
    }
}

impl QueueRepositoryTrait for QueueRepository {
    fn enqueue(&self, entry: AnalysisQueueEntry) -> Result<EnqueueOutcome> {
        let mut conn = get_connection(&self.pool)?;
        let db_entry = AnalysisQueueEntryDB::from(entry);

        match diesel::insert_into(analysis_queue::table)
            .values(&db_entry)
            .execute(&mut conn)
        {
            Ok(_) => {
                debug!(
                    "Enqueued {} {} at priority {}",
                    db_entry.kind, db_entry.target_key, db_entry.priority
                );
                Ok(EnqueueOutcome::Inserted(db_entry.into()))
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                debug!(
                    "Enqueue rejected, {} {} already active",
                    db_entry.kind, db_entry.target_key
                );
                Ok(EnqueueOutcome::AlreadyActive)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn dequeue_next(&self) -> Result<Option<AnalysisQueueEntry>> {
        let mut conn = get_connection(&self.pool)?;

        let row = analysis_queue::table
            .filter(analysis_queue::status.eq(QueueStatus::Pending.as_str()))
            .order((
                analysis_queue::priority.desc(),
                analysis_queue::created_at.asc(),
            ))
            .first::<AnalysisQueueEntryDB>(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn mark_in_progress(&self, id: &str) -> Result<AnalysisQueueEntry> {
        let mut conn = get_connection(&self.pool)?;

        let updated = diesel::update(
            analysis_queue::table
                .filter(analysis_queue::id.eq(id))
                .filter(analysis_queue::status.eq(QueueStatus::Pending.as_str())),
        )
            .set((
                analysis_queue::status.eq(QueueStatus::InProgress.as_str()),
                analysis_queue::started_at.eq(Some(Utc::now().to_rfc3339())),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(QueueError::NotFound(format!(
                "no pending entry with id {}",
                id
            )));
        }

        self.get_entry(id)
    }

    fn mark_completed(&self, id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(analysis_queue::table.find(id))
            .set((
                analysis_queue::status.eq(QueueStatus::Completed.as_str()),
                analysis_queue::completed_at.eq(Some(Utc::now().to_rfc3339())),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    fn mark_failed(&self, id: &str, error: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(analysis_queue::table.find(id))
            .set((
                analysis_queue::status.eq(QueueStatus::Failed.as_str()),
                analysis_queue::completed_at.eq(Some(Utc::now().to_rfc3339())),
                analysis_queue::error.eq(Some(error.to_string())),
                analysis_queue::retry_count.eq(analysis_queue::retry_count + 1),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    fn find_active(
        &self,
        kind: AnalysisKind,
        target_key: &str,
    ) -> Result<Option<AnalysisQueueEntry>> {
        let mut conn = get_connection(&self.pool)?;

        let row = analysis_queue::table
            .filter(analysis_queue::kind.eq(kind.as_str()))
            .filter(analysis_queue::target_key.eq(target_key))
            .filter(analysis_queue::status.eq_any(ACTIVE_STATUSES))
            .first::<AnalysisQueueEntryDB>(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn count_consecutive_failures(&self, kind: AnalysisKind, target_key: &str) -> Result<i32> {
        let mut conn = get_connection(&self.pool)?;

        let terminal: Vec<String> = analysis_queue::table
            .filter(analysis_queue::kind.eq(kind.as_str()))
            .filter(analysis_queue::target_key.eq(target_key))
            .filter(analysis_queue::status.eq_any([
                QueueStatus::Completed.as_str(),
                QueueStatus::Failed.as_str(),
            ]))
            .order(analysis_queue::completed_at.desc())
            .select(analysis_queue::status)
            .load(&mut conn)?;

        let mut consecutive = 0;
        for status in terminal {
            if status == QueueStatus::Failed.as_str() {
                consecutive += 1;
            } else {
                break;
            }
        }

        Ok(consecutive)
    }

    fn pending_count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        let count = analysis_queue::table
            .filter(analysis_queue::status.eq(QueueStatus::Pending.as_str()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }
}
