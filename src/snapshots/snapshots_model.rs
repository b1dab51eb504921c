use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One instrument row of a basket's daily holdings record.
///
/// Rows are immutable once written; a correction arrives as a new dated row,
/// never as an in-place edit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsSnapshot {
    pub id: String,
    pub basket_id: String,
    pub as_of: NaiveDate,
    pub instrument_id: String,
    pub instrument_name: String,
    pub shares: Decimal,
    pub weight_pct: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl HoldingsSnapshot {
    pub fn new(
        basket_id: &str,
        as_of: NaiveDate,
        instrument_id: &str,
        instrument_name: &str,
        shares: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            basket_id: basket_id.to_string(),
            as_of,
            instrument_id: instrument_id.to_string(),
            instrument_name: instrument_name.to_string(),
            shares,
            weight_pct: None,
            market_value: None,
            created_at: Utc::now(),
        }
    }
}

/// Database model for holdings snapshots
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HoldingsSnapshotDB {
    pub id: String,
    pub basket_id: String,
    pub as_of: String,
    pub instrument_id: String,
    pub instrument_name: String,
    pub shares: String,
    pub weight_pct: Option<String>,
    pub market_value: Option<String>,
    pub created_at: String,
}

impl From<HoldingsSnapshotDB> for HoldingsSnapshot {
    fn from(db: HoldingsSnapshotDB) -> Self {
        Self {
            id: db.id,
            basket_id: db.basket_id,
            as_of: NaiveDate::parse_from_str(&db.as_of, DATE_FORMAT)
                .unwrap_or_else(|_| Utc::now().date_naive()),
            instrument_id: db.instrument_id,
            instrument_name: db.instrument_name,
            shares: Decimal::from_str(&db.shares).unwrap_or(Decimal::ZERO),
            weight_pct: db.weight_pct.and_then(|s| Decimal::from_str(&s).ok()),
            market_value: db.market_value.and_then(|s| Decimal::from_str(&s).ok()),
            created_at: DateTime::parse_from_rfc3339(&db.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }
    }
}

impl From<HoldingsSnapshot> for HoldingsSnapshotDB {
    fn from(domain: HoldingsSnapshot) -> Self {
        Self {
            id: domain.id,
            basket_id: domain.basket_id,
            as_of: domain.as_of.format(DATE_FORMAT).to_string(),
            instrument_id: domain.instrument_id,
            instrument_name: domain.instrument_name,
            shares: domain.shares.to_string(),
            weight_pct: domain.weight_pct.map(|d| d.to_string()),
            market_value: domain.market_value.map(|d| d.to_string()),
            created_at: domain.created_at.to_rfc3339(),
        }
    }
}
