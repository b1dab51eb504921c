use rust_decimal::Decimal;

use super::diff_model::HoldingsDelta;
use crate::constants::{MIN_PERCENT_CHANGE, MIN_SHARE_CHANGE};

/// Thresholds below which a delta is not worth reporting.
#[derive(Debug, Clone)]
pub struct SignificanceConfig {
    pub min_share_change: Decimal,
    pub min_percent_change: Decimal,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            min_share_change: Decimal::from_str_radix(MIN_SHARE_CHANGE, 10)
                .unwrap_or_else(|_| Decimal::new(1000, 0)),
            min_percent_change: Decimal::from_str_radix(MIN_PERCENT_CHANGE, 10)
                .unwrap_or_else(|_| Decimal::new(5, 1)),
        }
    }
}

/// Drops sub-threshold deltas from a changeset the noise classifier has
/// already approved as Signal. Runs independently of classification so a
/// basket with genuine mixed trading still suppresses its own small noise.
pub struct SignificanceFilter {
    config: SignificanceConfig,
}

impl Default for SignificanceFilter {
    fn default() -> Self {
        Self::new(SignificanceConfig::default())
    }
}

impl SignificanceFilter {
    pub fn new(config: SignificanceConfig) -> Self {
        Self { config }
    }

    /// Keeps deltas where either the absolute share change or the absolute
    /// percent change clears its threshold.
    pub fn filter(&self, deltas: Vec<HoldingsDelta>) -> Vec<HoldingsDelta> {
        deltas
            .into_iter()
            .filter(|d| {
                d.share_delta.abs() >= self.config.min_share_change
                    || d.percent_delta.abs() >= self.config.min_percent_change
            })
            .collect()
    }
}
