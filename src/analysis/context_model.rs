use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::analysis_model::SourceCounts;

/// One daily closing price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// A basket-change mention of the instrument (another basket traded it).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketMention {
    pub basket_id: String,
    pub as_of: NaiveDate,
    pub action: String,
    pub share_delta: Decimal,
    pub percent_delta: Decimal,
}

/// A disclosed legislator trade in the instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegislatorTrade {
    pub legislator: String,
    pub chamber: Option<String>,
    pub as_of: NaiveDate,
    pub action: String,
    pub amount_range: Option<String>,
}

/// Latest technical indicator readings for the instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSnapshot {
    pub as_of: NaiveDate,
    pub rsi_14: Option<Decimal>,
    pub sma_50: Option<Decimal>,
    pub sma_200: Option<Decimal>,
    pub macd: Option<Decimal>,
}

/// Fundamental profile summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsSummary {
    pub name: String,
    pub sector: Option<String>,
    pub market_cap: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
}

/// Aggregated news/social sentiment over a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAggregate {
    pub average_score: Decimal,
    pub article_count: i64,
}

/// The bounded context handed to the inference collaborator, plus the
/// per-source counts recorded for audit.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub entity_key: String,
    pub as_of: NaiveDate,
    pub text: String,
    pub source_counts: SourceCounts,
}
