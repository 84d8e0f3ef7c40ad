//! Revenue forecasting
//!
//! [`Forecaster`] is the seam for any time-series model. [`RidgeForecaster`]
//! reuses the attribution regression: it fits the point model on history,
//! appends planned spend for the coming days, and reads predictions off the
//! appended rows. Lag columns of the first future days therefore see real
//! history.

use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::attribution::{AttributionConfig, FittedModel, fit_model};
use crate::calendar::following_days;
use crate::error::{ConfigurationError, ForecastError};
use crate::features::{DEFAULT_LAGS, SpendFrame, aggregate_revenue, pivot_spend};
use crate::model::{Observation, distinct_dates};

pub const DEFAULT_HORIZON: usize = 30;

/// What to forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Number of days after the last history date
    #[serde(default = "default_horizon")]
    pub horizon: usize,

    /// Planned daily spend per channel; when absent each channel repeats its
    /// mean spend over the history days it ran
    #[serde(default)]
    pub future_spend: Option<BTreeMap<String, Vec<f64>>>,
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            future_spend: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: Date,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub horizon: usize,
}

impl Forecast {
    #[must_use]
    pub fn total_revenue(&self) -> f64 {
        self.points.iter().map(|p| p.point).sum()
    }
}

/// Anything that can project daily revenue forward from history
pub trait Forecaster {
    fn forecast(
        &self,
        history: &[Observation],
        request: &ForecastRequest,
    ) -> Result<Forecast, ForecastError>;
}

/// Settings for [`RidgeForecaster`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Minimum number of distinct history days
    #[serde(default = "default_min_days")]
    pub min_days: usize,

    /// Half-width of the interval in residual standard deviations
    #[serde(default = "default_interval_z")]
    pub interval_z: f64,

    #[serde(default = "default_alpha")]
    pub alpha: f64,

    #[serde(default = "default_lags")]
    pub lags: Vec<usize>,
}

fn default_min_days() -> usize {
    30
}

fn default_interval_z() -> f64 {
    1.96
}

fn default_alpha() -> f64 {
    1.0
}

fn default_lags() -> Vec<usize> {
    DEFAULT_LAGS.to_vec()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_days: default_min_days(),
            interval_z: default_interval_z(),
            alpha: default_alpha(),
            lags: default_lags(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RidgeForecaster {
    config: ForecastConfig,
}

impl RidgeForecaster {
    #[must_use]
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    fn attribution_config(&self) -> AttributionConfig {
        AttributionConfig {
            alpha: self.config.alpha,
            lags: self.config.lags.clone(),
            min_days: self.config.min_days,
            ..Default::default()
        }
    }
}

impl Forecaster for RidgeForecaster {
    fn forecast(
        &self,
        history: &[Observation],
        request: &ForecastRequest,
    ) -> Result<Forecast, ForecastError> {
        if request.horizon == 0 {
            return Err(ConfigurationError::InvalidHorizon.into());
        }
        let days = distinct_dates(history);
        if days < self.config.min_days {
            return Err(ForecastError::InsufficientData {
                required: self.config.min_days,
                found: days,
            });
        }
        if !self.config.interval_z.is_finite() || self.config.interval_z < 0.0 {
            return Err(ConfigurationError::NonFiniteInput("interval_z".to_string()).into());
        }

        let model = fit_model(history, &self.attribution_config())?;
        let mut frame = aligned_history(history, &model);
        let Some(&last_date) = frame.dates.last() else {
            return Err(ForecastError::InsufficientData {
                required: self.config.min_days,
                found: 0,
            });
        };

        let future_rows = future_spend_rows(&frame, history, request)?;
        let future_dates = following_days(last_date, request.horizon);
        let history_rows = frame.num_rows();
        frame.extend(&future_dates, future_rows);

        let predicted = model.predict_spend(&frame)?;
        let half_width = self.config.interval_z * model.residual_std;
        let points = future_dates
            .into_iter()
            .zip(predicted.iter().skip(history_rows))
            .map(|(date, &point)| ForecastPoint {
                date,
                point,
                lower: point - half_width,
                upper: point + half_width,
            })
            .collect();

        tracing::info!(
            horizon = request.horizon,
            history_days = history_rows,
            "Forecast complete"
        );

        Ok(Forecast {
            points,
            horizon: request.horizon,
        })
    }
}

/// History spend restricted to the model's channels and to dates with revenue
fn aligned_history(history: &[Observation], model: &FittedModel) -> SpendFrame {
    let revenue_dates: BTreeSet<Date> = aggregate_revenue(history).into_keys().collect();
    let full = pivot_spend(history, Some(&model.channels));
    let (dates, spend): (Vec<Date>, Vec<Vec<f64>>) = full
        .dates
        .into_iter()
        .zip(full.spend)
        .filter(|(date, _)| revenue_dates.contains(date))
        .unzip();
    SpendFrame {
        dates,
        channels: full.channels,
        spend,
    }
}

/// Mean spend per channel over the history days it actually ran
///
/// Days without an observation for the channel are left out rather than
/// counted as zero spend, so sparse channels keep their typical daily level.
fn active_day_means(frame: &SpendFrame, history: &[Observation]) -> Vec<f64> {
    let active: BTreeSet<(&str, Date)> = history
        .iter()
        .filter(|o| o.spend.is_finite())
        .map(|o| (o.channel.as_str(), o.date))
        .collect();

    frame
        .channels
        .iter()
        .enumerate()
        .map(|(col, channel)| {
            let (sum, days) = frame
                .dates
                .iter()
                .zip(&frame.spend)
                .filter(|(date, _)| active.contains(&(channel.as_str(), **date)))
                .fold((0.0, 0usize), |(sum, days), (_, row)| (sum + row[col], days + 1));
            if days == 0 { 0.0 } else { sum / days as f64 }
        })
        .collect()
}

/// One spend row per future day
///
/// Planned series are zero-padded or truncated to the horizon; channels
/// missing from a plan spend nothing. Without a plan every channel repeats
/// its [`active_day_means`].
fn future_spend_rows(
    frame: &SpendFrame,
    history: &[Observation],
    request: &ForecastRequest,
) -> Result<Vec<Vec<f64>>, ForecastError> {
    let horizon = request.horizon;
    let Some(plan) = &request.future_spend else {
        return Ok(vec![active_day_means(frame, history); horizon]);
    };

    for channel in plan.keys() {
        if !frame.channels.contains(channel) {
            tracing::warn!(channel = %channel, "ignoring future spend for unknown channel");
        }
    }

    let mut rows = vec![vec![0.0; frame.channels.len()]; horizon];
    for (col, channel) in frame.channels.iter().enumerate() {
        let Some(series) = plan.get(channel) else {
            continue;
        };
        for (day, &value) in series.iter().take(horizon).enumerate() {
            if !value.is_finite() {
                return Err(
                    ConfigurationError::NonFiniteInput(format!("future_spend[{channel}]")).into(),
                );
            }
            if value < 0.0 {
                return Err(ConfigurationError::NegativeSpend {
                    channel: channel.clone(),
                    value,
                }
                .into());
            }
            rows[day][col] = value;
        }
    }
    Ok(rows)
}
