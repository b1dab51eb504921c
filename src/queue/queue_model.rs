use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of entity a queue entry analyzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisKind {
    /// Basket-level trading-pattern narrative, keyed "basket@date".
    BasketGroup,
    /// Single-instrument narrative, keyed by symbol.
    Instrument,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::BasketGroup => "BASKET_GROUP",
            AnalysisKind::Instrument => "INSTRUMENT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "BASKET_GROUP" => Some(AnalysisKind::BasketGroup),
            "INSTRUMENT" => Some(AnalysisKind::Instrument),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "PENDING",
            QueueStatus::InProgress => "IN_PROGRESS",
            QueueStatus::Completed => "COMPLETED",
            QueueStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(QueueStatus::Pending),
            "IN_PROGRESS" => Some(QueueStatus::InProgress),
            "COMPLETED" => Some(QueueStatus::Completed),
            "FAILED" => Some(QueueStatus::Failed),
            _ => None,
        }
    }
}

/// One unit of analysis work. For a given (kind, target_key) at most one
/// entry may be pending or in progress at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisQueueEntry {
    pub id: String,
    pub kind: AnalysisKind,
    pub target_key: String,
    pub priority: i32,
    pub status: QueueStatus,
    pub is_manual: bool,
    pub error: Option<String>,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AnalysisQueueEntry {
    pub fn new(kind: AnalysisKind, target_key: &str, priority: i32, is_manual: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            target_key: target_key.to_string(),
            priority,
            status: QueueStatus::Pending,
            is_manual,
            error: None,
            retry_count: 0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}

/// Result of an enqueue attempt. A duplicate for an active key is an
/// expected outcome, not an error.
#[derive(Debug, Clone)]
pub enum EnqueueOutcome {
    Inserted(AnalysisQueueEntry),
    AlreadyActive,
}

impl EnqueueOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, EnqueueOutcome::Inserted(_))
    }
}

/// Database model for queue entries
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::analysis_queue)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalysisQueueEntryDB {
    pub id: String,
    pub kind: String,
    pub target_key: String,
    pub priority: i32,
    pub status: String,
    pub is_manual: bool,
    pub error: Option<String>,
    pub retry_count: i32,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<AnalysisQueueEntryDB> for AnalysisQueueEntry {
    fn from(db: AnalysisQueueEntryDB) -> Self {
        Self {
            kind: AnalysisKind::parse(&db.kind).unwrap_or(AnalysisKind::Instrument),
            status: QueueStatus::parse(&db.status).unwrap_or_default(),
            created_at: parse_timestamp(&db.created_at),
            started_at: db.started_at.as_deref().map(parse_timestamp),
            completed_at: db.completed_at.as_deref().map(parse_timestamp),
            id: db.id,
            target_key: db.target_key,
            priority: db.priority,
            is_manual: db.is_manual,
            error: db.error,
            retry_count: db.retry_count,
        }
    }
}

impl From<AnalysisQueueEntry> for AnalysisQueueEntryDB {
    fn from(domain: AnalysisQueueEntry) -> Self {
        Self {
            id: domain.id,
            kind: domain.kind.as_str().to_string(),
            target_key: domain.target_key,
            priority: domain.priority,
            status: domain.status.as_str().to_string(),
            is_manual: domain.is_manual,
            error: domain.error,
            retry_count: domain.retry_count,
            created_at: domain.created_at.to_rfc3339(),
            started_at: domain.started_at.map(|dt| dt.to_rfc3339()),
            completed_at: domain.completed_at.map(|dt| dt.to_rfc3339()),
        }
    }
}
