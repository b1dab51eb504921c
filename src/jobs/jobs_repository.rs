use chrono::{DateTime, Duration, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use log::warn;
use std::sync::Arc;

use super::jobs_errors::Result;
use super::jobs_model::{GuardOutcome, JobExecutionRecord, JobExecutionRecordDB, JobStatus};
use crate::constants::JOB_STALE_AFTER_HOURS;
use crate::db::get_connection;
use crate::schema::job_executions;

pub trait JobExecutionRepositoryTrait: Send + Sync {
    /// Attempts to claim the run slot for (job, date, scope). At most one
    /// RUNNING record can exist per slot; a concurrent claim returns
    /// `AlreadyRunning` instead of an error. A RUNNING record older than the
    /// stale window is assumed dead, closed as failed, and the slot is
    /// claimed by the caller.
    fn try_begin(
        &self,
        job_name: &str,
        target_date: NaiveDate,
        scope: &str,
    ) -> Result<GuardOutcome>;

    /// Closes a record, stamping the finish time and wall-clock duration.
    fn finish(
        &self,
        id: &str,
        status: JobStatus,
        error: Option<&str>,
        finished_at: DateTime<Utc>,
    ) -> Result<JobExecutionRecord>;

    fn get(&self, id: &str) -> Result<Option<JobExecutionRecord>>;

    /// Recent executions of one job, newest first.
    fn recent_for_job(&self, job_name: &str, limit: i64) -> Result<Vec<JobExecutionRecord>>;
}

pub struct JobExecutionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    stale_after: Duration,
}

impl JobExecutionRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            pool,
            stale_after: Duration::hours(JOB_STALE_AFTER_HOURS),
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    fn close_stale_running(
        &self,
        conn: &mut SqliteConnection,
        job_name: &str,
        scope: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let cutoff = (now - self.stale_after).to_rfc3339();

        let stale: Vec<JobExecutionRecordDB> = job_executions::table
            .filter(job_executions::job_name.eq(job_name))
            .filter(job_executions::scope.eq(scope))
            .filter(job_executions::status.eq(JobStatus::Running.as_str()))
            .filter(job_executions::started_at.lt(&cutoff))
            .load(conn)?;

        for record in stale {
            warn!(
                "Job {} execution {} has been RUNNING since {}; closing as stale and taking over",
                job_name, record.id, record.started_at
            );
            diesel::update(job_executions::table.filter(job_executions::id.eq(&record.id)))
                .set((
                    job_executions::status.eq(JobStatus::Failed.as_str()),
                    job_executions::finished_at.eq(Some(now.to_rfc3339())),
                    job_executions::error.eq(Some("stale: no heartbeat before takeover")),
                ))
                .execute(conn)?;
        }

        Ok(())
    }
}

impl JobExecutionRepositoryTrait for JobExecutionRepository {
    fn try_begin(
        &self,
        job_name: &str,
        target_date: NaiveDate,
        scope: &str,
    ) -> Result<GuardOutcome> {
        let mut conn = get_connection(&self.pool)?;
        let now = Utc::now();

        self.close_stale_running(&mut conn, job_name, scope, now)?;

        let record = JobExecutionRecord::start(job_name, target_date, scope);
        let db_record = JobExecutionRecordDB::from(record.clone());

        // The partial unique index on RUNNING rows arbitrates concurrent
        // starts; the loser sees a unique violation.
        match diesel::insert_into(job_executions::table)
            .values(&db_record)
            .execute(&mut conn)
        {
            Ok(_) => Ok(GuardOutcome::Started(record)),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Ok(GuardOutcome::AlreadyRunning)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn finish(
        &self,
        id: &str,
        status: JobStatus,
        error: Option<&str>,
        finished_at: DateTime<Utc>,
    ) -> Result<JobExecutionRecord> {
        let mut conn = get_connection(&self.pool)?;

        let existing: JobExecutionRecordDB = job_executions::table
            .filter(job_executions::id.eq(id))
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| super::jobs_errors::JobError::NotFound(id.to_string()))?;

        let started = DateTime::parse_from_rfc3339(&existing.started_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(finished_at);
        let duration_ms = (finished_at - started).num_milliseconds().max(0);

        diesel::update(job_executions::table.filter(job_executions::id.eq(id)))
            .set((
                job_executions::status.eq(status.as_str()),
                job_executions::finished_at.eq(Some(finished_at.to_rfc3339())),
                job_executions::error.eq(error),
                job_executions::duration_ms.eq(Some(duration_ms)),
            ))
            .execute(&mut conn)?;

        let updated: JobExecutionRecordDB = job_executions::table
            .filter(job_executions::id.eq(id))
            .first(&mut conn)?;

        Ok(updated.into())
    }

    fn get(&self, id: &str) -> Result<Option<JobExecutionRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = job_executions::table
            .filter(job_executions::id.eq(id))
            .first::<JobExecutionRecordDB>(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn recent_for_job(&self, job_name: &str, limit: i64) -> Result<Vec<JobExecutionRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = job_executions::table
            .filter(job_executions::job_name.eq(job_name))
            .order(job_executions::started_at.desc())
            .limit(limit)
            .load::<JobExecutionRecordDB>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
