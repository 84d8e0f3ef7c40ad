//! Attribution estimator
//!
//! Fits a ridge regression of daily revenue on standardized spend features and
//! reports per-channel marginal returns, contributions and bootstrap intervals.
//! Each fit returns an immutable [`FittedModel`] that carries everything needed
//! for later predictions; nothing is cached between calls.

use std::collections::BTreeMap;

use jiff::civil::Date;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::bootstrap::{BootstrapConfig, confidence_intervals};
use crate::error::{AttributionError, ConfigurationError, FittingError};
use crate::features::{DEFAULT_LAGS, FeatureBuilder, SpendFrame, channel_spend_totals};
use crate::model::{AttributionResult, ConfidenceInterval, MODEL_VERSION, Observation, distinct_dates};
use crate::ridge::{RidgeModel, Standardizer, fit_ridge};
use crate::stats;

/// Hyperparameters for an attribution fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionConfig {
    /// Ridge regularization strength
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Lag offsets (in days) for delayed spend effects
    #[serde(default = "default_lags")]
    pub lags: Vec<usize>,

    /// Number of bootstrap resamples for confidence intervals
    #[serde(default = "default_bootstrap_count")]
    pub bootstrap_count: usize,

    /// Two-sided confidence level for the intervals
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    /// Minimum number of distinct days required to fit
    #[serde(default = "default_min_days")]
    pub min_days: usize,

    /// Base seed for bootstrap resampling (random when absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_alpha() -> f64 {
    1.0
}

fn default_lags() -> Vec<usize> {
    DEFAULT_LAGS.to_vec()
}

fn default_bootstrap_count() -> usize {
    100
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_min_days() -> usize {
    60
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            lags: default_lags(),
            bootstrap_count: default_bootstrap_count(),
            confidence_level: default_confidence_level(),
            min_days: default_min_days(),
            seed: None,
        }
    }
}

impl AttributionConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        // The one-hot calendar blocks are collinear with the intercept, so an
        // unpenalized solve is always singular.
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(ConfigurationError::InvalidAlpha(self.alpha));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigurationError::InvalidConfidenceLevel(
                self.confidence_level,
            ));
        }
        if self.bootstrap_count == 0 {
            return Err(ConfigurationError::ZeroBootstrapCount);
        }
        Ok(())
    }
}

/// Immutable artifact produced by one fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub model_version: String,
    pub channels: Vec<String>,
    pub lags: Vec<usize>,
    pub columns: Vec<String>,
    pub standardizer: Standardizer,
    pub ridge: RidgeModel,
    /// Population standard deviation of the in-sample residuals
    pub residual_std: f64,
    pub sample_count: usize,
    pub last_date: Option<Date>,
}

impl FittedModel {
    /// Revenue per unit of raw spend for each channel's lag-0 column
    #[must_use]
    pub fn marginal_roas(&self) -> BTreeMap<String, f64> {
        self.channels
            .iter()
            .enumerate()
            .map(|(idx, channel)| (channel.clone(), self.raw_coefficient(idx)))
            .collect()
    }

    fn raw_coefficient(&self, column: usize) -> f64 {
        self.ridge.coefficients[column] / self.standardizer.scales[column]
    }

    fn builder(&self) -> FeatureBuilder {
        FeatureBuilder::new(self.lags.clone())
    }

    /// Predict daily revenue for new observations
    ///
    /// Features are rebuilt for this model's channels; channels the model has
    /// not seen are ignored and missing ones read as zero spend.
    pub fn predict(&self, observations: &[Observation]) -> Result<Vec<(Date, f64)>, FittingError> {
        let design = self.builder().build_for_channels(observations, &self.channels);
        let scaled = self.standardizer.transform(&design.features)?;
        let predicted = self.ridge.predict(&scaled);
        Ok(design.dates.into_iter().zip(predicted.iter().copied()).collect())
    }

    /// Predict revenue for every row of a spend table
    pub fn predict_spend(&self, spend: &SpendFrame) -> Result<DVector<f64>, FittingError> {
        if spend.channels != self.channels {
            return Err(FittingError::DimensionMismatch {
                context: "spend table channels",
                expected: self.channels.len(),
                actual: spend.channels.len(),
            });
        }
        let features = self.builder().design(spend);
        let scaled = self.standardizer.transform(&features)?;
        Ok(self.ridge.predict(&scaled))
    }
}

/// Output of a full attribution run
#[derive(Debug, Clone)]
pub struct Attribution {
    pub result: AttributionResult,
    pub model: FittedModel,
}

/// Fit the attribution model and compute bootstrap intervals
pub fn fit(
    observations: &[Observation],
    config: &AttributionConfig,
) -> Result<Attribution, AttributionError> {
    config.validate()?;
    let fitted = fit_primary(observations, config)?;

    let bootstrap = BootstrapConfig {
        bootstrap_count: config.bootstrap_count,
        confidence_level: config.confidence_level,
        alpha: config.alpha,
        seed: config.seed,
    };
    tracing::debug!(
        resamples = bootstrap.bootstrap_count,
        "Computing bootstrap confidence intervals"
    );
    let standardized = confidence_intervals(
        &fitted.scaled,
        &fitted.target,
        &fitted.channel_columns,
        &fitted.model.ridge,
        &bootstrap,
    )?;

    // Interval bounds live in standardized space; rescale to raw spend units.
    let confidence_intervals = standardized
        .into_iter()
        .map(|(channel, ci)| {
            let scale = fitted.model.standardizer.scales[fitted.channel_columns[&channel]];
            (
                channel,
                ConfidenceInterval {
                    lower: ci.lower / scale,
                    upper: ci.upper / scale,
                    mean: ci.mean / scale,
                },
            )
        })
        .collect();

    let marginal_roas = fitted.model.marginal_roas();
    let totals = channel_spend_totals(observations);
    let contributions = marginal_roas
        .iter()
        .map(|(channel, coef)| {
            let spend = totals.get(channel).copied().unwrap_or(0.0);
            (channel.clone(), coef * spend)
        })
        .collect();

    let result = AttributionResult {
        model_version: fitted.model.model_version.clone(),
        r_squared: fitted.r_squared,
        mape: fitted.mape,
        marginal_roas,
        contributions,
        confidence_intervals,
        sample_count: fitted.model.sample_count,
    };

    tracing::info!(
        rows = result.sample_count,
        channels = result.marginal_roas.len(),
        r_squared = result.r_squared,
        "Attribution fit complete"
    );

    Ok(Attribution {
        result,
        model: fitted.model,
    })
}

/// Fit only the point model, skipping the bootstrap
pub fn fit_model(
    observations: &[Observation],
    config: &AttributionConfig,
) -> Result<FittedModel, AttributionError> {
    if !config.alpha.is_finite() || config.alpha <= 0.0 {
        return Err(ConfigurationError::InvalidAlpha(config.alpha).into());
    }
    Ok(fit_primary(observations, config)?.model)
}

/// Everything the bootstrap and the metrics need from the primary fit
struct PrimaryFit {
    model: FittedModel,
    scaled: nalgebra::DMatrix<f64>,
    target: DVector<f64>,
    channel_columns: BTreeMap<String, usize>,
    r_squared: f64,
    mape: f64,
}

fn fit_primary(
    observations: &[Observation],
    config: &AttributionConfig,
) -> Result<PrimaryFit, AttributionError> {
    let days = distinct_dates(observations);
    if days < config.min_days {
        return Err(AttributionError::InsufficientData {
            required: config.min_days,
            found: days,
        });
    }

    let builder = FeatureBuilder::new(config.lags.clone());
    let design = builder.build(observations);

    if design.channels.is_empty() {
        return Err(FittingError::NoChannels.into());
    }
    if design.num_rows() == 0 {
        return Err(FittingError::EmptyAfterAlignment.into());
    }
    if design.num_rows() < config.min_days {
        return Err(AttributionError::InsufficientData {
            required: config.min_days,
            found: design.num_rows(),
        });
    }
    if design.target.len() != design.num_rows() {
        return Err(FittingError::DimensionMismatch {
            context: "design target",
            expected: design.num_rows(),
            actual: design.target.len(),
        }
        .into());
    }

    tracing::debug!(
        rows = design.num_rows(),
        columns = design.columns.len(),
        channels = design.channels.len(),
        "Built attribution features"
    );

    let standardizer = Standardizer::fit(&design.features)?;
    let scaled = standardizer.transform(&design.features)?;
    let ridge = fit_ridge(&scaled, &design.target, config.alpha)?;

    let predicted = ridge.predict(&scaled);
    let r_squared = stats::r_squared(&design.target, &predicted);
    let mape = stats::mape(&design.target, &predicted);
    let residual_std = stats::residual_std(&design.target, &predicted);

    let channel_columns = design.channel_columns();
    let model = FittedModel {
        model_version: MODEL_VERSION.to_string(),
        last_date: design.dates.last().copied(),
        sample_count: design.num_rows(),
        channels: design.channels,
        lags: config.lags.clone(),
        columns: design.columns,
        standardizer,
        ridge,
        residual_std,
    };

    Ok(PrimaryFit {
        model,
        scaled,
        target: design.target,
        channel_columns,
        r_squared,
        mape,
    })
}
