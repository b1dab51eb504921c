use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::analysis_errors::Result;
use super::analysis_model::{AnalysisResult, AnalysisResultDB};
use crate::db::get_connection;
use crate::queue::AnalysisKind;
use crate::schema::analysis_results;
use crate::snapshots::snapshots_model::DATE_FORMAT;

pub trait AnalysisResultRepositoryTrait: Send + Sync {
    /// Idempotent write: a second result for the same (entity, kind, date)
    /// replaces the first, so retries on the same day cannot duplicate.
    fn upsert(&self, result: AnalysisResult) -> Result<AnalysisResult>;

    fn get(
        &self,
        entity_key: &str,
        kind: AnalysisKind,
        as_of: NaiveDate,
    ) -> Result<Option<AnalysisResult>>;

    /// When the entity was last successfully analyzed, for freshness checks.
    fn last_success_at(
        &self,
        entity_key: &str,
        kind: AnalysisKind,
    ) -> Result<Option<DateTime<Utc>>>;

    /// Most recent results for the entity, newest first.
    fn recent_for_entity(
        &self,
        entity_key: &str,
        kind: AnalysisKind,
        limit: i64,
    ) -> Result<Vec<AnalysisResult>>;
}

pub struct AnalysisResultRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl AnalysisResultRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl AnalysisResultRepositoryTrait for AnalysisResultRepository {
    fn upsert(&self, result: AnalysisResult) -> Result<AnalysisResult> {
        let mut conn = get_connection(&self.pool)?;
        let db_result = AnalysisResultDB::from(result);

        // REPLACE resolves the conflict on the (entity, kind, date) unique
        // index, dropping the superseded row.
        diesel::replace_into(analysis_results::table)
            .values(&db_result)
            .execute(&mut conn)?;

        Ok(db_result.into())
    }

    fn get(
        &self,
        entity_key: &str,
        kind: AnalysisKind,
        as_of: NaiveDate,
    ) -> Result<Option<AnalysisResult>> {
        let mut conn = get_connection(&self.pool)?;

        let row = analysis_results::table
            .filter(analysis_results::entity_key.eq(entity_key))
            .filter(analysis_results::kind.eq(kind.as_str()))
            .filter(analysis_results::as_of.eq(as_of.format(DATE_FORMAT).to_string()))
            .first::<AnalysisResultDB>(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn last_success_at(
        &self,
        entity_key: &str,
        kind: AnalysisKind,
    ) -> Result<Option<DateTime<Utc>>> {
        let mut conn = get_connection(&self.pool)?;

        let latest: Option<String> = analysis_results::table
            .filter(analysis_results::entity_key.eq(entity_key))
            .filter(analysis_results::kind.eq(kind.as_str()))
            .select(diesel::dsl::max(analysis_results::created_at))
            .first(&mut conn)?;

        Ok(latest.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }))
    }

    fn recent_for_entity(
        &self,
        entity_key: &str,
        kind: AnalysisKind,
        limit: i64,
    ) -> Result<Vec<AnalysisResult>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = analysis_results::table
            .filter(analysis_results::entity_key.eq(entity_key))
            .filter(analysis_results::kind.eq(kind.as_str()))
            .order(analysis_results::as_of.desc())
            .limit(limit)
            .load::<AnalysisResultDB>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
