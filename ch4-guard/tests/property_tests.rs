//! Property-based tests for the anomaly classifier.
//!
//! Scores are checked for determinism and shift invariance, tiers for
//! monotonicity, and constant series for rejection, over generated inputs.

use ch4_guard::classifier::{classify, score, BaselineStats, ClassifierThresholds, RiskTier};
use ch4_guard::error::GuardError;
use ch4_guard::model::HistoricalSeries;
use proptest::prelude::*;

fn ch4_series() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1700.0f64..2100.0, 2..64)
}

proptest! {
    #[test]
    fn prop_classify_is_monotonic(a in -10.0f64..10.0, b in -10.0f64..10.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(classify(lo).0 <= classify(hi).0);
    }

    #[test]
    fn prop_non_positive_scores_are_normal(z in -1000.0f64..=0.0) {
        let (tier, action) = classify(z);
        prop_assert_eq!(tier, RiskTier::Normal);
        prop_assert_eq!(action, "Continuous monitoring");
    }

    #[test]
    fn prop_custom_thresholds_are_monotonic(
        anomalous in 0.5f64..3.0,
        gap in 0.1f64..3.0,
        a in -10.0f64..10.0,
        b in -10.0f64..10.0,
    ) {
        let thresholds = ClassifierThresholds::new(anomalous, anomalous + gap).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(thresholds.tier_for(lo) <= thresholds.tier_for(hi));
    }

    #[test]
    fn prop_score_is_deterministic(values in ch4_series(), value in 1700.0f64..2100.0) {
        let series = HistoricalSeries::new(values).unwrap();
        match (score(value, &series), score(value, &series)) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a.to_bits(), b.to_bits()),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "score changed between calls"),
        }
    }

    #[test]
    fn prop_score_is_shift_invariant(
        values in ch4_series(),
        value in 1700.0f64..2100.0,
        shift in -500.0f64..500.0,
    ) {
        let series = HistoricalSeries::new(values.clone()).unwrap();
        let spread = BaselineStats::from_series(&series).map(|b| b.std_dev).unwrap_or(0.0);
        prop_assume!(spread > 1.0);
        let shifted = HistoricalSeries::new(values.iter().map(|v| v + shift).collect()).unwrap();
        if let (Ok(a), Ok(b)) = (score(value, &series), score(value + shift, &shifted)) {
            prop_assert!((a - b).abs() <= 1e-6 * a.abs().max(1.0));
        }
    }

    #[test]
    fn prop_constant_series_is_degenerate(
        level in 0.0f64..5000.0,
        len in 2usize..50,
        value in 0.0f64..5000.0,
    ) {
        let series = HistoricalSeries::new(vec![level; len]).unwrap();
        let err = score(value, &series).unwrap_err();
        prop_assert!(
            matches!(err, GuardError::DegenerateSeries { .. }),
            "unexpected error: {}",
            err
        );
    }
}

mod edge_case_tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(classify(2.0).0, RiskTier::Normal);
        assert_eq!(classify(2.0001).0, RiskTier::Anomalous);
        assert_eq!(classify(3.0).0, RiskTier::Anomalous);
        assert_eq!(classify(3.0001).0, RiskTier::Critical);
    }

    #[test]
    fn test_reference_series() {
        let series = HistoricalSeries::new(vec![90.0, 95.0, 100.0, 105.0, 110.0]).unwrap();
        let z = score(125.0, &series).unwrap();
        assert!((z - 3.162278).abs() < 1e-6);
        assert_eq!(classify(z).0, RiskTier::Critical);
    }

    #[test]
    fn test_flat_series_rejected() {
        let flat = HistoricalSeries::new(vec![10.0, 10.0, 10.0]).unwrap();
        assert!(score(9999.0, &flat).unwrap_err().is_degenerate_series());
        let flat = HistoricalSeries::new(vec![100.0; 4]).unwrap();
        assert!(score(100.0, &flat).unwrap_err().is_degenerate_series());
    }

    #[test]
    fn test_short_series_rejected() {
        let single = HistoricalSeries::new(vec![1900.0]).unwrap();
        assert!(score(1950.0, &single).unwrap_err().is_degenerate_series());
        assert!(score(1950.0, &HistoricalSeries::default())
            .unwrap_err()
            .is_degenerate_series());
    }
}
