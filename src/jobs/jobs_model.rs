use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::snapshots::snapshots_model::DATE_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[default]
    Running,
    Success,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "RUNNING",
            JobStatus::Success => "SUCCESS",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "RUNNING" => Some(JobStatus::Running),
            "SUCCESS" => Some(JobStatus::Success),
            "FAILED" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

/// One scheduled-job invocation. Only one RUNNING record may exist per
/// (job name, target date, scope); that uniqueness is the concurrency guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionRecord {
    pub id: String,
    pub job_name: String,
    pub target_date: NaiveDate,
    pub scope: String,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub duration_ms: Option<i64>,
}

impl JobExecutionRecord {
    pub fn start(job_name: &str, target_date: NaiveDate, scope: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_name: job_name.to_string(),
            target_date,
            scope: scope.to_string(),
            status: JobStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
            duration_ms: None,
        }
    }
}

/// Outcome of a guard check at job start. A duplicate concurrent run is an
/// expected no-op, not an error.
#[derive(Debug, Clone)]
pub enum GuardOutcome {
    Started(JobExecutionRecord),
    AlreadyRunning,
}

/// Database model for job execution records
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::job_executions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobExecutionRecordDB {
    pub id: String,
    pub job_name: String,
    pub target_date: String,
    pub scope: String,
    pub status: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub error: Option<String>,
    pub duration_ms: Option<i64>,
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<JobExecutionRecordDB> for JobExecutionRecord {
    fn from(db: JobExecutionRecordDB) -> Self {
        Self {
            target_date: NaiveDate::parse_from_str(&db.target_date, DATE_FORMAT)
                .unwrap_or_else(|_| Utc::now().date_naive()),
            status: JobStatus::parse(&db.status).unwrap_or_default(),
            started_at: parse_timestamp(&db.started_at),
            finished_at: db.finished_at.as_deref().map(parse_timestamp),
            id: db.id,
            job_name: db.job_name,
            scope: db.scope,
            error: db.error,
            duration_ms: db.duration_ms,
        }
    }
}

impl From<JobExecutionRecord> for JobExecutionRecordDB {
    fn from(domain: JobExecutionRecord) -> Self {
        Self {
            id: domain.id,
            job_name: domain.job_name,
            target_date: domain.target_date.format(DATE_FORMAT).to_string(),
            scope: domain.scope,
            status: domain.status.as_str().to_string(),
            started_at: domain.started_at.to_rfc3339(),
            finished_at: domain.finished_at.map(|dt| dt.to_rfc3339()),
            error: domain.error,
            duration_ms: domain.duration_ms,
        }
    }
}
