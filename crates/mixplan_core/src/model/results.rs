//! Attribution outputs handed to the persistence/response layer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Version tag stamped on every fitted model
pub const MODEL_VERSION: &str = "ridge_v1";

/// Bootstrap interval around a channel's deployed coefficient
///
/// `mean` is the primary fit's coefficient, not the mean of the resampled
/// coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub mean: f64,
}

/// Metrics and per-channel estimates from one attribution fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub model_version: String,
    /// In-sample coefficient of determination
    pub r_squared: f64,
    /// Mean absolute percentage error, in percent
    pub mape: f64,
    /// Revenue per additional unit of spend, per channel
    pub marginal_roas: BTreeMap<String, f64>,
    /// Coefficient times total historical spend, per channel
    pub contributions: BTreeMap<String, f64>,
    pub confidence_intervals: BTreeMap<String, ConfidenceInterval>,
    /// Number of aligned daily rows the model was fitted on
    pub sample_count: usize,
}
