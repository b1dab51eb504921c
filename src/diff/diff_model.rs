use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of one per-instrument change between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaKind {
    New,
    Exit,
    Buy,
    Sell,
    Hold,
}

impl DeltaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeltaKind::New => "NEW",
            DeltaKind::Exit => "EXIT",
            DeltaKind::Buy => "BUY",
            DeltaKind::Sell => "SELL",
            DeltaKind::Hold => "HOLD",
        }
    }
}

/// Per-instrument change between two snapshot dates. Derived on demand,
/// never persisted as its own table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsDelta {
    pub basket_id: String,
    pub instrument_id: String,
    pub instrument_name: String,
    pub previous_shares: Decimal,
    pub current_shares: Decimal,
    pub share_delta: Decimal,
    /// Undefined when previous shares = 0; reported as 100 for NEW positions.
    pub percent_delta: Decimal,
    pub kind: DeltaKind,
}

/// Outcome of noise classification for one basket/date changeset.
#[derive(Debug, Clone)]
pub enum ChangesetClass {
    /// Systematic proportional adjustment; the whole changeset is discarded.
    Noise,
    /// Genuine trading activity.
    Signal(Vec<HoldingsDelta>),
}

/// Per-basket summary of one diff pass, for logging and downstream readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketChangeReport {
    pub basket_id: String,
    pub as_of: NaiveDate,
    pub previous_as_of: NaiveDate,
    pub current_count: usize,
    pub previous_count: usize,
    pub total_deltas: usize,
    pub classified_noise: bool,
    pub significant: Vec<HoldingsDelta>,
}

impl BasketChangeReport {
    pub fn has_reportable_changes(&self) -> bool {
        !self.classified_noise && !self.significant.is_empty()
    }
}
