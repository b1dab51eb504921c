#[cfg(test)]
mod tests {
    use crate::diff::diff_model::{DeltaKind, HoldingsDelta};
    use crate::diff::significance::{SignificanceConfig, SignificanceFilter};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn delta(
        instrument: &str,
        share_delta: Decimal,
        percent_delta: Decimal,
        kind: DeltaKind,
    ) -> HoldingsDelta {
        HoldingsDelta {
            basket_id: "B".to_string(),
            instrument_id: instrument.to_string(),
            instrument_name: instrument.to_string(),
            previous_shares: dec!(100000),
            current_shares: dec!(100000) + share_delta,
            share_delta,
            percent_delta,
            kind,
        }
    }

    #[test]
    fn keeps_deltas_clearing_either_threshold() {
        let filter = SignificanceFilter::default();
        let deltas = vec![
            // Clears the share threshold only.
            delta("SHARES", dec!(1500), dec!(0.1), DeltaKind::Buy),
            // Clears the percent threshold only.
            delta("PCT", dec!(200), dec!(0.9), DeltaKind::Buy),
            // Clears neither.
            delta("SMALL", dec!(100), dec!(0.05), DeltaKind::Buy),
        ];

        let kept = filter.filter(deltas);
        let ids: Vec<&str> = kept.iter().map(|d| d.instrument_id.as_str()).collect();
        assert_eq!(ids, vec!["SHARES", "PCT"]);
    }

    #[test]
    fn sell_clearing_both_thresholds_passes() {
        // -2000 shares (>= 1000) and -2.0 percent (>= 0.5): reported.
        let filter = SignificanceFilter::default();
        let kept = filter.filter(vec![delta("X", dec!(-2000), dec!(-2.0), DeltaKind::Sell)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind, DeltaKind::Sell);
    }

    #[test]
    fn boundary_values_are_inclusive() {
        let filter = SignificanceFilter::default();
        let kept = filter.filter(vec![
            delta("A", dec!(1000), dec!(0.01), DeltaKind::Buy),
            delta("B", dec!(-10), dec!(-0.5), DeltaKind::Sell),
        ]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn hold_rows_never_pass() {
        let filter = SignificanceFilter::default();
        let kept = filter.filter(vec![delta("H", Decimal::ZERO, Decimal::ZERO, DeltaKind::Hold)]);
        assert!(kept.is_empty());
    }

    #[test]
    fn custom_thresholds() {
        let filter = SignificanceFilter::new(SignificanceConfig {
            min_share_change: dec!(10),
            min_percent_change: dec!(5),
        });
        let kept = filter.filter(vec![delta("A", dec!(20), dec!(0.02), DeltaKind::Buy)]);
        assert_eq!(kept.len(), 1);
    }
}
