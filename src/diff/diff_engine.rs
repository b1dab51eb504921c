use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use super::diff_model::{DeltaKind, HoldingsDelta};
use crate::snapshots::HoldingsSnapshot;

pub const PERCENT_SCALE: u32 = 8;

/// Instrument classes a basket provider marks as non-tradable overlays
/// (cash sweep, currency forwards, derivatives). Provider-specific; the
/// default predicate matches the markers of the providers we ingest.
const DEFAULT_NON_TRADABLE_MARKERS: &[&str] = &["CASH", "FWD", "SWAP", "OPT", "FUT"];

type TradablePredicate = Box<dyn Fn(&HoldingsSnapshot) -> bool + Send + Sync>;

/// Computes per-instrument deltas between two snapshot sets via a full
/// outer join on instrument identifier.
pub struct DiffEngine {
    is_tradable: TradablePredicate,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self {
            is_tradable: Box::new(default_tradable_predicate),
        }
    }

    /// Replaces the non-tradable exclusion predicate. The predicate returns
    /// true for instruments that should participate in diffing.
    pub fn with_tradable_predicate<F>(predicate: F) -> Self
    where
        F: Fn(&HoldingsSnapshot) -> bool + Send + Sync + 'static,
    {
        Self {
            is_tradable: Box::new(predicate),
        }
    }

    pub fn diff(
        &self,
        current: &[HoldingsSnapshot],
        previous: &[HoldingsSnapshot],
    ) -> Vec<HoldingsDelta> {
        let current: Vec<&HoldingsSnapshot> =
            current.iter().filter(|s| (self.is_tradable)(s)).collect();
        let previous: Vec<&HoldingsSnapshot> =
            previous.iter().filter(|s| (self.is_tradable)(s)).collect();

        let previous_by_id: HashMap<&str, &HoldingsSnapshot> = previous
            .iter()
            .map(|s| (s.instrument_id.as_str(), *s))
            .collect();

        let mut deltas: Vec<HoldingsDelta> = Vec::with_capacity(current.len());
        let mut seen: HashSet<&str> = HashSet::with_capacity(current.len());

        for snap in &current {
            seen.insert(snap.instrument_id.as_str());
            match previous_by_id.get(snap.instrument_id.as_str()) {
                None => deltas.push(new_position(snap)),
                Some(prev) => deltas.push(continued_position(snap, prev)),
            }
        }

        for prev in &previous {
            if !seen.contains(prev.instrument_id.as_str()) {
                deltas.push(exited_position(prev));
            }
        }

        deltas
    }
}

fn default_tradable_predicate(snapshot: &HoldingsSnapshot) -> bool {
    let id = snapshot.instrument_id.to_uppercase();
    !DEFAULT_NON_TRADABLE_MARKERS
        .iter()
        .any(|marker| id.starts_with(marker))
}

fn new_position(snap: &HoldingsSnapshot) -> HoldingsDelta {
    HoldingsDelta {
        basket_id: snap.basket_id.clone(),
        instrument_id: snap.instrument_id.clone(),
        instrument_name: snap.instrument_name.clone(),
        previous_shares: Decimal::ZERO,
        current_shares: snap.shares,
        share_delta: snap.shares,
        percent_delta: Decimal::ONE_HUNDRED,
        kind: DeltaKind::New,
    }
}

fn exited_position(prev: &HoldingsSnapshot) -> HoldingsDelta {
    HoldingsDelta {
        basket_id: prev.basket_id.clone(),
        instrument_id: prev.instrument_id.clone(),
        instrument_name: prev.instrument_name.clone(),
        previous_shares: prev.shares,
        current_shares: Decimal::ZERO,
        share_delta: -prev.shares,
        percent_delta: -Decimal::ONE_HUNDRED,
        kind: DeltaKind::Exit,
    }
}

fn continued_position(snap: &HoldingsSnapshot, prev: &HoldingsSnapshot) -> HoldingsDelta {
    let share_delta = snap.shares - prev.shares;
    let percent_delta = if prev.shares.is_zero() {
        // Previous row exists with zero shares; treat like a new position.
        Decimal::ONE_HUNDRED
    } else {
        (share_delta / prev.shares * Decimal::ONE_HUNDRED).round_dp(PERCENT_SCALE)
    };

    let kind = if share_delta.is_zero() {
        DeltaKind::Hold
    } else if share_delta > Decimal::ZERO {
        DeltaKind::Buy
    } else {
        DeltaKind::Sell
    };

    HoldingsDelta {
        basket_id: snap.basket_id.clone(),
        instrument_id: snap.instrument_id.clone(),
        instrument_name: snap.instrument_name.clone(),
        previous_shares: prev.shares,
        current_shares: snap.shares,
        share_delta,
        percent_delta: if share_delta.is_zero() {
            Decimal::ZERO
        } else {
            percent_delta
        },
        kind,
    }
}
