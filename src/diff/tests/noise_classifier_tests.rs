#[cfg(test)]
mod tests {
    use crate::diff::diff_model::{ChangesetClass, DeltaKind, HoldingsDelta};
    use crate::diff::noise_classifier::{NoiseClassifier, NoiseConfig};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn delta(instrument: &str, previous: Decimal, current: Decimal) -> HoldingsDelta {
        let share_delta = current - previous;
        let percent_delta = if previous.is_zero() {
            dec!(100)
        } else {
            (share_delta / previous * dec!(100)).round_dp(8)
        };
        let kind = if share_delta.is_zero() {
            DeltaKind::Hold
        } else if share_delta > Decimal::ZERO {
            DeltaKind::Buy
        } else {
            DeltaKind::Sell
        };
        HoldingsDelta {
            basket_id: "C".to_string(),
            instrument_id: instrument.to_string(),
            instrument_name: instrument.to_string(),
            previous_shares: previous,
            current_shares: current,
            share_delta,
            percent_delta,
            kind,
        }
    }

    #[test]
    fn uniform_small_proportional_sells_are_noise() {
        // 30 holdings each down exactly 0.5 percent.
        let deltas: Vec<HoldingsDelta> = (0..30)
            .map(|i| {
                let prev = dec!(10000) + Decimal::from(i * 1000);
                delta(&format!("I{}", i), prev, prev * dec!(0.995))
            })
            .collect();

        let classifier = NoiseClassifier::default();
        assert!(matches!(
            classifier.classify(&deltas),
            ChangesetClass::Noise
        ));
    }

    #[test]
    fn dominant_cluster_with_minority_outliers_is_still_noise() {
        // 80% of rows at -1.0 percent; the remaining 20% vary wildly.
        let mut deltas: Vec<HoldingsDelta> = (0..16)
            .map(|i| delta(&format!("U{}", i), dec!(10000), dec!(9900)))
            .collect();
        deltas.push(delta("A", dec!(10000), dec!(25000)));
        deltas.push(delta("B", dec!(10000), dec!(100)));
        deltas.push(delta("C", dec!(10000), dec!(10500)));
        deltas.push(delta("D", Decimal::ZERO, dec!(7000)));

        let classifier = NoiseClassifier::default();
        assert!(matches!(
            classifier.classify(&deltas),
            ChangesetClass::Noise
        ));
    }

    #[test]
    fn heterogeneous_changes_are_signal() {
        let deltas = vec![
            delta("A", dec!(10000), dec!(12000)),
            delta("B", dec!(10000), dec!(8000)),
            delta("C", dec!(10000), dec!(10050)),
            delta("D", dec!(5000), dec!(5500)),
            delta("E", dec!(20000), dec!(15000)),
        ];

        let classifier = NoiseClassifier::default();
        match classifier.classify(&deltas) {
            ChangesetClass::Signal(kept) => assert_eq!(kept.len(), 5),
            ChangesetClass::Noise => panic!("heterogeneous changeset classified as noise"),
        }
    }

    #[test]
    fn large_uniform_move_is_not_noise() {
        // Every row down exactly 5 percent: uniform, but above the 2 percent
        // magnitude cap, so it is genuine basket-wide selling.
        let deltas: Vec<HoldingsDelta> = (0..20)
            .map(|i| delta(&format!("I{}", i), dec!(10000), dec!(9500)))
            .collect();

        let classifier = NoiseClassifier::default();
        assert!(matches!(
            classifier.classify(&deltas),
            ChangesetClass::Signal(_)
        ));
    }

    #[test]
    fn mixed_signs_within_cluster_are_not_noise() {
        // Rows cluster at +/-0.0 percent rounded but move in both
        // directions; a systematic adjustment never does that.
        let mut deltas: Vec<HoldingsDelta> = (0..10)
            .map(|i| delta(&format!("UP{}", i), dec!(100000), dec!(100040)))
            .collect();
        deltas.extend((0..10).map(|i| delta(&format!("DN{}", i), dec!(100000), dec!(99960))));

        let classifier = NoiseClassifier::default();
        assert!(matches!(
            classifier.classify(&deltas),
            ChangesetClass::Signal(_)
        ));
    }

    #[test]
    fn hold_rows_never_form_a_bucket() {
        // 20 unchanged rows plus 3 genuine trades: the unchanged rows must
        // not form a dominant zero-percent bucket of their own.
        let mut deltas: Vec<HoldingsDelta> = (0..20)
            .map(|i| delta(&format!("H{}", i), dec!(10000), dec!(10000)))
            .collect();
        deltas.push(delta("A", dec!(10000), dec!(12000)));
        deltas.push(delta("B", dec!(10000), dec!(9000)));
        deltas.push(delta("C", dec!(10000), dec!(11000)));

        let classifier = NoiseClassifier::default();
        assert!(matches!(
            classifier.classify(&deltas),
            ChangesetClass::Signal(_)
        ));
    }

    #[test]
    fn hold_rows_count_against_the_cluster_ratio() {
        // 25 unchanged rows plus 5 uniform -0.5 percent sells: the sells
        // cluster perfectly among themselves, but they are only a sixth of
        // the basket, far below the 80 percent bar. Genuine trades in a
        // mostly-quiet basket must not be discarded as an adjustment.
        let mut deltas: Vec<HoldingsDelta> = (0..25)
            .map(|i| delta(&format!("H{}", i), dec!(10000), dec!(10000)))
            .collect();
        deltas.extend((0..5).map(|i| delta(&format!("S{}", i), dec!(200000), dec!(199000))));

        let classifier = NoiseClassifier::default();
        match classifier.classify(&deltas) {
            ChangesetClass::Signal(kept) => assert_eq!(kept.len(), 30),
            ChangesetClass::Noise => panic!("diluted uniform sells classified as noise"),
        }
    }

    #[test]
    fn all_hold_changeset_passes_through_as_signal() {
        let deltas: Vec<HoldingsDelta> = (0..4)
            .map(|i| delta(&format!("H{}", i), dec!(10000), dec!(10000)))
            .collect();

        let classifier = NoiseClassifier::default();
        match classifier.classify(&deltas) {
            ChangesetClass::Signal(kept) => assert_eq!(kept.len(), 4),
            ChangesetClass::Noise => panic!("all-hold changeset classified as noise"),
        }
    }

    #[test]
    fn empty_changeset_is_empty_signal() {
        let classifier = NoiseClassifier::default();
        match classifier.classify(&[]) {
            ChangesetClass::Signal(kept) => assert!(kept.is_empty()),
            ChangesetClass::Noise => panic!("empty changeset classified as noise"),
        }
    }

    #[test]
    fn custom_thresholds_are_honored() {
        // With the ratio raised to 1.0, a 90 percent cluster is no longer
        // enough to classify as noise.
        let mut deltas: Vec<HoldingsDelta> = (0..18)
            .map(|i| delta(&format!("U{}", i), dec!(10000), dec!(9900)))
            .collect();
        deltas.push(delta("A", dec!(10000), dec!(30000)));
        deltas.push(delta("B", dec!(10000), dec!(29000)));

        let classifier = NoiseClassifier::new(NoiseConfig {
            cluster_ratio: dec!(1.0),
            max_magnitude: dec!(2.0),
        });
        assert!(matches!(
            classifier.classify(&deltas),
            ChangesetClass::Signal(_)
        ));
    }
}
