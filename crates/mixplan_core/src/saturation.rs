//! Saturation curves - diminishing returns in channel spend.
//!
//! A curve maps spend to a multiplier on the channel's marginal return. Every
//! curve here equals 1 at zero spend, decreases toward 0 as spend grows, and
//! never goes negative.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Spend at which the default curve halves the marginal return
pub const DEFAULT_HALF_POINT: f64 = 1000.0;

/// Relative step for the central-difference derivative
const DERIVATIVE_STEP: f64 = 1e-6;

/// Capability: spend -> effective marginal-return multiplier
pub trait SaturationCurve: Send + Sync {
    fn multiplier(&self, spend: f64) -> f64;

    /// d(multiplier)/d(spend), used by the optimizer's gradient
    fn derivative(&self, spend: f64) -> f64 {
        let h = DERIVATIVE_STEP * spend.abs().max(1.0);
        let lo = (spend - h).max(0.0);
        let hi = spend + h;
        (self.multiplier(hi) - self.multiplier(lo)) / (hi - lo)
    }
}

impl<F> SaturationCurve for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn multiplier(&self, spend: f64) -> f64 {
        self(spend).max(0.0)
    }
}

/// `1 / (1 + spend / half_point)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reciprocal {
    pub half_point: f64,
}

impl Default for Reciprocal {
    fn default() -> Self {
        Self {
            half_point: DEFAULT_HALF_POINT,
        }
    }
}

impl SaturationCurve for Reciprocal {
    fn multiplier(&self, spend: f64) -> f64 {
        1.0 / (1.0 + spend.max(0.0) / self.half_point)
    }

    fn derivative(&self, spend: f64) -> f64 {
        let denom = 1.0 + spend.max(0.0) / self.half_point;
        -1.0 / (self.half_point * denom * denom)
    }
}

/// Hill curve: `k^s / (k^s + spend^s)`
///
/// `k` is the half-saturation point and `s` the steepness; `s = 1` reduces to
/// [`Reciprocal`] with `half_point = k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hill {
    pub k: f64,
    pub s: f64,
}

impl SaturationCurve for Hill {
    fn multiplier(&self, spend: f64) -> f64 {
        let k_pow_s = self.k.powf(self.s);
        let x_pow_s = spend.max(0.0).powf(self.s);
        let denom = k_pow_s + x_pow_s;
        if denom == 0.0 { 1.0 } else { k_pow_s / denom }
    }
}

/// Per-channel curves with a shared fallback
#[derive(Clone)]
pub struct SaturationModel {
    fallback: Arc<dyn SaturationCurve>,
    curves: BTreeMap<String, Arc<dyn SaturationCurve>>,
}

impl Default for SaturationModel {
    fn default() -> Self {
        Self::uniform(Reciprocal::default())
    }
}

impl fmt::Debug for SaturationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaturationModel")
            .field("custom_channels", &self.curves.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SaturationModel {
    /// Use the same curve for every channel
    pub fn uniform(curve: impl SaturationCurve + 'static) -> Self {
        Self {
            fallback: Arc::new(curve),
            curves: BTreeMap::new(),
        }
    }

    /// Override the curve for one channel
    #[must_use]
    pub fn with_curve(
        mut self,
        channel: impl Into<String>,
        curve: impl SaturationCurve + 'static,
    ) -> Self {
        self.curves.insert(channel.into(), Arc::new(curve));
        self
    }

    #[must_use]
    pub fn curve(&self, channel: &str) -> &dyn SaturationCurve {
        self.curves
            .get(channel)
            .map_or(self.fallback.as_ref(), |c| c.as_ref())
    }

    /// Expected revenue from one channel: `spend * roas * multiplier(spend)`
    #[must_use]
    pub fn channel_revenue(&self, channel: &str, spend: f64, roas: f64) -> f64 {
        spend * roas * self.curve(channel).multiplier(spend)
    }

    /// d(channel_revenue)/d(spend)
    #[must_use]
    pub fn marginal_revenue(&self, channel: &str, spend: f64, roas: f64) -> f64 {
        let curve = self.curve(channel);
        roas * (curve.multiplier(spend) + spend * curve.derivative(spend))
    }
}
