use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::snapshots_errors::Result;
use super::snapshots_model::{HoldingsSnapshot, HoldingsSnapshotDB, DATE_FORMAT};
use crate::db::get_connection;
use crate::schema::holdings_snapshots;

/// Read/write access to the append-only snapshot store.
///
/// Reads are page-capped: `get_holdings_page` never returns more than `limit`
/// rows, regardless of how many exist. Exhaustive retrieval is the
/// `PaginatedRetriever`'s job.
pub trait SnapshotRepositoryTrait: Send + Sync {
    fn save_snapshots(&self, rows: &[HoldingsSnapshot]) -> Result<usize>;
    fn get_holdings_page(
        &self,
        basket_id: &str,
        as_of: NaiveDate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HoldingsSnapshot>>;
    fn count_for_date(&self, basket_id: &str, as_of: NaiveDate) -> Result<i64>;
    /// Most recent date strictly before `as_of` for which the basket has rows.
    fn previous_date_before(&self, basket_id: &str, as_of: NaiveDate)
        -> Result<Option<NaiveDate>>;
    fn available_dates(&self, basket_id: &str) -> Result<Vec<NaiveDate>>;
    fn baskets_for_date(&self, as_of: NaiveDate) -> Result<Vec<String>>;
}

pub struct SnapshotRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl SnapshotRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl SnapshotRepositoryTrait for SnapshotRepository {
    fn save_snapshots(&self, rows: &[HoldingsSnapshot]) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let mut inserted = 0;

        // Batch to keep the parameter count per statement bounded.
        for chunk in rows.chunks(100) {
            let db_rows: Vec<HoldingsSnapshotDB> =
                chunk.iter().map(|r| HoldingsSnapshotDB::from(r.clone())).collect();

            // Snapshot rows are immutable; a re-ingest of the same
            // (basket, date, instrument) is ignored, never overwritten.
            inserted += diesel::insert_or_ignore_into(holdings_snapshots::table)
                .values(&db_rows)
                .execute(&mut conn)?;
        }

        Ok(inserted)
    }

    fn get_holdings_page(
        &self,
        basket_id: &str,
        as_of: NaiveDate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HoldingsSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = holdings_snapshots::table
            .filter(holdings_snapshots::basket_id.eq(basket_id))
            .filter(holdings_snapshots::as_of.eq(as_of.format(DATE_FORMAT).to_string()))
            .order(holdings_snapshots::instrument_id.asc())
            .limit(limit)
            .offset(offset)
            .load::<HoldingsSnapshotDB>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn count_for_date(&self, basket_id: &str, as_of: NaiveDate) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        let count = holdings_snapshots::table
            .filter(holdings_snapshots::basket_id.eq(basket_id))
            .filter(holdings_snapshots::as_of.eq(as_of.format(DATE_FORMAT).to_string()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    fn previous_date_before(
        &self,
        basket_id: &str,
        as_of: NaiveDate,
    ) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;

        let date: Option<String> = holdings_snapshots::table
            .filter(holdings_snapshots::basket_id.eq(basket_id))
            .filter(holdings_snapshots::as_of.lt(as_of.format(DATE_FORMAT).to_string()))
            .select(diesel::dsl::max(holdings_snapshots::as_of))
            .first(&mut conn)?;

        Ok(date.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()))
    }

    fn available_dates(&self, basket_id: &str) -> Result<Vec<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;

        let dates: Vec<String> = holdings_snapshots::table
            .filter(holdings_snapshots::basket_id.eq(basket_id))
            .select(holdings_snapshots::as_of)
            .distinct()
            .order(holdings_snapshots::as_of.asc())
            .load(&mut conn)?;

        Ok(dates
            .into_iter()
            .filter_map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok())
            .collect())
    }

    fn baskets_for_date(&self, as_of: NaiveDate) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;

        let baskets: Vec<String> = holdings_snapshots::table
            .filter(holdings_snapshots::as_of.eq(as_of.format(DATE_FORMAT).to_string()))
            .select(holdings_snapshots::basket_id)
            .distinct()
            .order(holdings_snapshots::basket_id.asc())
            .load(&mut conn)?;

        Ok(baskets)
    }
}
