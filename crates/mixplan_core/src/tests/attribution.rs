//! End-to-end attribution tests on synthetic data
//!
//! These tests verify that:
//! - Known linear generating coefficients are recovered in raw spend units
//! - In-sample fit quality is reported
//! - Bootstrap intervals are ordered and reproducible with a fixed seed
//! - Contributions equal coefficient times total spend
//! - Row counts are checked again after revenue alignment

use crate::attribution::{AttributionConfig, fit};
use crate::error::{AttributionError, FittingError};
use crate::model::MODEL_VERSION;

use super::fixtures::linear_two_channel;

fn seeded_config() -> AttributionConfig {
    AttributionConfig {
        seed: Some(42),
        ..Default::default()
    }
}

/// 90 days, revenue = 3a + 5b + noise
#[test]
fn test_recovers_generating_coefficients() {
    let observations = linear_two_channel(90, 50.0, 2024);
    let fit = fit(&observations, &seeded_config()).unwrap();
    let result = &fit.result;

    assert_eq!(result.model_version, MODEL_VERSION);
    assert_eq!(result.sample_count, 90);
    assert!(
        (result.marginal_roas["a"] - 3.0).abs() < 1.0,
        "a: {}",
        result.marginal_roas["a"]
    );
    assert!(
        (result.marginal_roas["b"] - 5.0).abs() < 1.0,
        "b: {}",
        result.marginal_roas["b"]
    );
    assert!(result.r_squared > 0.8, "r_squared = {}", result.r_squared);
    assert!(result.mape >= 0.0);
}

#[test]
fn test_interval_ordering_with_fixed_seed() {
    let observations = linear_two_channel(90, 50.0, 11);
    let result = fit(&observations, &seeded_config()).unwrap().result;

    assert_eq!(result.confidence_intervals.len(), 2);
    for (channel, ci) in &result.confidence_intervals {
        assert!(ci.lower <= ci.upper, "{channel}: {ci:?}");
        assert!(
            ci.lower - 1e-6 <= ci.mean && ci.mean <= ci.upper + 1e-6,
            "{channel}: {ci:?}"
        );
        assert!((ci.mean - result.marginal_roas[channel]).abs() < 1e-9);
    }
}

#[test]
fn test_fixed_seed_is_reproducible() {
    let observations = linear_two_channel(70, 30.0, 5);
    let config = AttributionConfig {
        bootstrap_count: 25,
        ..seeded_config()
    };
    let first = fit(&observations, &config).unwrap().result;
    let second = fit(&observations, &config).unwrap().result;
    assert_eq!(first, second);
}

#[test]
fn test_contributions_are_coefficient_times_spend() {
    let observations = linear_two_channel(80, 20.0, 9);
    let result = fit(&observations, &seeded_config()).unwrap().result;

    for channel in ["a", "b"] {
        let total_spend: f64 = observations
            .iter()
            .filter(|o| o.channel == channel)
            .map(|o| o.spend)
            .sum();
        let expected = result.marginal_roas[channel] * total_spend;
        assert!((result.contributions[channel] - expected).abs() < 1e-6 * expected.abs().max(1.0));
    }
}

#[test]
fn test_fitted_model_predicts_history() {
    let observations = linear_two_channel(90, 10.0, 77);
    let fit = fit(&observations, &seeded_config()).unwrap();

    let predictions = fit.model.predict(&observations).unwrap();
    assert_eq!(predictions.len(), 90);

    // Late rows have every lag populated; predictions should track the target closely
    let (date, predicted) = predictions[60];
    let actual: f64 = observations
        .iter()
        .filter(|o| o.date == date)
        .map(|o| o.revenue)
        .sum();
    assert!((predicted - actual).abs() < 0.1 * actual.abs(), "{predicted} vs {actual}");
}

#[test]
fn test_empty_input_is_insufficient_data() {
    let err = fit(&[], &AttributionConfig::default()).unwrap_err();
    assert_eq!(
        err,
        AttributionError::InsufficientData {
            required: 60,
            found: 0
        }
    );
}

/// Days whose revenue is missing drop out of the design even though they
/// count toward the raw day total
#[test]
fn test_missing_revenue_days_fail_row_check() {
    let mut observations = linear_two_channel(70, 10.0, 3);
    // Two rows per day; the last 15 days lose their revenue
    for obs in observations.iter_mut().skip(55 * 2) {
        obs.revenue = f64::NAN;
    }

    let err = fit(&observations, &seeded_config()).unwrap_err();
    assert_eq!(
        err,
        AttributionError::InsufficientData {
            required: 60,
            found: 55
        }
    );
}

#[test]
fn test_no_revenue_at_all_is_fitting_error() {
    let mut observations = linear_two_channel(70, 10.0, 3);
    for obs in &mut observations {
        obs.revenue = f64::INFINITY;
    }

    let err = fit(&observations, &seeded_config()).unwrap_err();
    assert_eq!(
        err,
        AttributionError::Fitting(FittingError::EmptyAfterAlignment)
    );
}
