use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::diff_model::{ChangesetClass, HoldingsDelta};
use crate::constants::{NOISE_CLUSTER_RATIO, NOISE_MAX_MAGNITUDE};

/// Thresholds for systematic-adjustment detection.
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    /// Fraction of changed rows that must share one percent bucket.
    pub cluster_ratio: Decimal,
    /// Largest percent magnitude a systematic bucket may have.
    pub max_magnitude: Decimal,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            cluster_ratio: Decimal::from_str_radix(NOISE_CLUSTER_RATIO, 10)
                .unwrap_or_else(|_| Decimal::new(8, 1)),
            max_magnitude: Decimal::from_str_radix(NOISE_MAX_MAGNITUDE, 10)
                .unwrap_or_else(|_| Decimal::new(2, 0)),
        }
    }
}

/// Detects changesets that are a uniform proportional adjustment (fee
/// accrual, share-count rebasing) rather than trading activity.
///
/// Real trading is rarely uniform across an entire basket; administrative
/// adjustments are. Baskets with very few holdings can cluster by chance,
/// which is a known tuning risk of the thresholds.
pub struct NoiseClassifier {
    config: NoiseConfig,
}

impl Default for NoiseClassifier {
    fn default() -> Self {
        Self::new(NoiseConfig::default())
    }
}

impl NoiseClassifier {
    pub fn new(config: NoiseConfig) -> Self {
        Self { config }
    }

    /// Buckets changed rows by percent delta rounded to one decimal place.
    /// The changeset is Noise iff the largest bucket holds at least
    /// `cluster_ratio` of ALL deltas, its magnitude is at most
    /// `max_magnitude` percent, and every row in it moved in the same
    /// direction. Unchanged (HOLD) rows never form a bucket themselves but
    /// they do count in the denominator: a mostly-unchanged basket with a
    /// handful of uniform trades is trading activity, not an adjustment.
    pub fn classify(&self, deltas: &[HoldingsDelta]) -> ChangesetClass {
        let mut buckets: HashMap<Decimal, Vec<&HoldingsDelta>> = HashMap::new();
        for delta in deltas.iter().filter(|d| !d.share_delta.is_zero()) {
            buckets
                .entry(delta.percent_delta.round_dp(1))
                .or_default()
                .push(delta);
        }

        let Some((bucket_value, members)) = buckets
            .into_iter()
            .max_by_key(|(_, members)| members.len())
        else {
            return ChangesetClass::Signal(deltas.to_vec());
        };

        let cluster_share =
            Decimal::from(members.len() as i64) / Decimal::from(deltas.len() as i64);
        let uniform_sign = members.iter().all(|d| d.share_delta > Decimal::ZERO)
            || members.iter().all(|d| d.share_delta < Decimal::ZERO);

        if cluster_share >= self.config.cluster_ratio
            && bucket_value.abs() <= self.config.max_magnitude
            && uniform_sign
        {
            debug!(
                "Changeset classified as noise: {}/{} rows clustered at {}%",
                members.len(),
                deltas.len(),
                bucket_value
            );
            return ChangesetClass::Noise;
        }

        ChangesetClass::Signal(deltas.to_vec())
    }
}
