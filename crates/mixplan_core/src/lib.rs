//! Marketing mix modeling library
//!
//! This crate estimates how much revenue each marketing channel drives and
//! turns those estimates into budget recommendations. It supports:
//! - Lagged spend and calendar-seasonality features built from daily observations
//! - Ridge regression attribution with bootstrap confidence intervals
//! - Budget allocation under diminishing returns, with per-channel bounds
//! - What-if scoring of hand-written allocations
//! - Short-horizon revenue forecasts from planned spend
//!
//! Every operation is a pure computation over in-memory inputs. Fits return an
//! immutable [`FittedModel`] instead of mutating shared state.
//!
//! ```ignore
//! use mixplan_core::{AttributionConfig, BudgetOptimizer, SpendBounds, attribution};
//!
//! let fit = attribution::fit(&observations, &AttributionConfig::default())?;
//! let plan = BudgetOptimizer::new(fit.result.marginal_roas.clone())
//!     .optimize(50_000.0, &SpendBounds::new().with_min("search", 5_000.0))?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod attribution;
pub mod bootstrap;
pub mod calendar;
pub mod error;
pub mod features;
pub mod forecast;
pub mod optimization;
pub mod ridge;
pub mod saturation;
pub mod scenario;
pub mod stats;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use attribution::{Attribution, AttributionConfig, FittedModel};
pub use error::{AttributionError, ConfigurationError, FittingError, ForecastError};
pub use features::FeatureBuilder;
pub use forecast::{Forecast, ForecastConfig, ForecastRequest, Forecaster, RidgeForecaster};
pub use model::{AttributionResult, ConfidenceInterval, Observation};
pub use optimization::{BudgetOptimizer, OptimizationConfig, OptimizationResult, SpendBounds};
pub use saturation::{Hill, Reciprocal, SaturationCurve, SaturationModel};
pub use scenario::ScenarioResult;
