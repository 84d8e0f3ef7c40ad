//! Tests for forward revenue projection

use std::collections::BTreeMap;

use crate::calendar::add_days;
use crate::error::ForecastError;
use crate::forecast::{ForecastConfig, ForecastRequest, Forecaster, RidgeForecaster};

use super::fixtures::{START, linear_two_channel};

#[test]
fn test_forecast_covers_following_days() {
    let history = linear_two_channel(60, 20.0, 31);
    let forecast = RidgeForecaster::default()
        .forecast(
            &history,
            &ForecastRequest {
                horizon: 14,
                future_spend: None,
            },
        )
        .unwrap();

    assert_eq!(forecast.horizon, 14);
    assert_eq!(forecast.points.len(), 14);
    for (i, point) in forecast.points.iter().enumerate() {
        assert_eq!(point.date, add_days(START, 60 + i as i64));
        assert!(point.lower <= point.point && point.point <= point.upper);
    }
}

#[test]
fn test_mean_spend_forecast_is_near_mean_revenue() {
    let history = linear_two_channel(90, 20.0, 8);
    let forecast = RidgeForecaster::default()
        .forecast(&history, &ForecastRequest::default())
        .unwrap();

    let mean_revenue = history.iter().map(|o| o.revenue).sum::<f64>() / 90.0;
    let mean_point = forecast.total_revenue() / forecast.points.len() as f64;
    assert!(
        (mean_point - mean_revenue).abs() < 0.1 * mean_revenue,
        "{mean_point} vs {mean_revenue}"
    );
}

#[test]
fn test_more_planned_spend_raises_forecast() {
    let history = linear_two_channel(60, 20.0, 12);
    let forecaster = RidgeForecaster::default();
    let plan = |level: f64| ForecastRequest {
        horizon: 7,
        future_spend: Some(BTreeMap::from([
            ("a".to_string(), vec![level; 7]),
            ("b".to_string(), vec![level; 7]),
        ])),
    };

    let low = forecaster.forecast(&history, &plan(100.0)).unwrap();
    let high = forecaster.forecast(&history, &plan(800.0)).unwrap();
    assert!(high.total_revenue() > low.total_revenue());
}

#[test]
fn test_short_history_is_insufficient() {
    let history = linear_two_channel(20, 20.0, 1);
    let err = RidgeForecaster::default()
        .forecast(&history, &ForecastRequest::default())
        .unwrap_err();
    assert_eq!(
        err,
        ForecastError::InsufficientData {
            required: 30,
            found: 20
        }
    );
}

#[test]
fn test_custom_minimum_history() {
    let history = linear_two_channel(20, 20.0, 1);
    let forecaster = RidgeForecaster::new(ForecastConfig {
        min_days: 15,
        lags: vec![7],
        ..Default::default()
    });
    let forecast = forecaster
        .forecast(
            &history,
            &ForecastRequest {
                horizon: 3,
                future_spend: None,
            },
        )
        .unwrap();
    assert_eq!(forecast.points.len(), 3);
}
