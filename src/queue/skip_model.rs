use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// How long a quarantined entity stays excluded from default queue
/// population. Modeled as a tagged variant so both cases are handled
/// exhaustively at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "policy", content = "until")]
pub enum SkipPolicy {
    Forever,
    Until(DateTime<Utc>),
}

impl SkipPolicy {
    /// Whether the quarantine still applies at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self {
            SkipPolicy::Forever => true,
            SkipPolicy::Until(expiry) => now < *expiry,
        }
    }
}

/// Who added a quarantine entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipAddedBy {
    System,
    Operator(String),
}

impl SkipAddedBy {
    pub fn as_db_string(&self) -> String {
        match self {
            SkipAddedBy::System => "SYSTEM".to_string(),
            SkipAddedBy::Operator(name) => format!("OPERATOR:{}", name),
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.strip_prefix("OPERATOR:") {
            Some(name) => SkipAddedBy::Operator(name.to_string()),
            None => SkipAddedBy::System,
        }
    }
}

/// Quarantine record for an entity with repeated analysis failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipListEntry {
    pub entity_key: String,
    pub reason: String,
    pub failure_count: i32,
    pub first_failed_at: DateTime<Utc>,
    pub last_failed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub policy: SkipPolicy,
    pub added_by: SkipAddedBy,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for skip list entries
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::skip_list)]
#[diesel(primary_key(entity_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SkipListEntryDB {
    pub entity_key: String,
    pub reason: String,
    pub failure_count: i32,
    pub first_failed_at: String,
    pub last_failed_at: String,
    pub policy: String,
    pub skip_until: Option<String>,
    pub added_by: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<SkipListEntryDB> for SkipListEntry {
    fn from(db: SkipListEntryDB) -> Self {
        let policy = match (db.policy.as_str(), db.skip_until.as_deref()) {
            ("UNTIL", Some(ts)) => SkipPolicy::Until(parse_timestamp(ts)),
            _ => SkipPolicy::Forever,
        };
        Self {
            policy,
            added_by: SkipAddedBy::parse(&db.added_by),
            first_failed_at: parse_timestamp(&db.first_failed_at),
            last_failed_at: parse_timestamp(&db.last_failed_at),
            created_at: parse_timestamp(&db.created_at),
            updated_at: parse_timestamp(&db.updated_at),
            entity_key: db.entity_key,
            reason: db.reason,
            failure_count: db.failure_count,
            notes: db.notes,
        }
    }
}

impl From<SkipListEntry> for SkipListEntryDB {
    fn from(domain: SkipListEntry) -> Self {
        let (policy, skip_until) = match domain.policy {
            SkipPolicy::Forever => ("FOREVER".to_string(), None),
            SkipPolicy::Until(expiry) => ("UNTIL".to_string(), Some(expiry.to_rfc3339())),
        };
        Self {
            entity_key: domain.entity_key,
            reason: domain.reason,
            failure_count: domain.failure_count,
            first_failed_at: domain.first_failed_at.to_rfc3339(),
            last_failed_at: domain.last_failed_at.to_rfc3339(),
            policy,
            skip_until,
            added_by: domain.added_by.as_db_string(),
            notes: domain.notes,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }
}
