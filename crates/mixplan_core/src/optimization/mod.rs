//! Budget allocation across channels
//!
//! Given per-channel marginal returns, finds the spend split that maximizes
//! saturated revenue subject to a fixed total budget and per-channel bounds.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use mixplan_core::optimization::{BudgetOptimizer, SpendBounds};
//!
//! let roas = BTreeMap::from([("search".to_string(), 3.0), ("social".to_string(), 1.5)]);
//! let optimizer = BudgetOptimizer::new(roas);
//! let result = optimizer
//!     .optimize(10_000.0, &SpendBounds::new().with_min("social", 1_000.0))
//!     .unwrap();
//! assert!((result.allocated_total() - 10_000.0).abs() < 1e-4);
//! assert!(result.allocations["social"] >= 1_000.0);
//! ```
//!
//! Non-convergence is not an error: the last feasible iterate is returned with
//! `converged == false` and a status message.

mod config;
mod objective;
mod projection;
mod result;
mod solver;

pub use config::{OptimizationConfig, SpendBounds};
pub use objective::RevenueObjective;
pub use projection::BudgetPolytope;
pub use result::{ConvergenceHistory, OptimizationResult, TerminationReason};
pub use solver::{Objective, SolverOutcome, maximize};

use std::collections::BTreeMap;

use crate::error::ConfigurationError;
use crate::saturation::SaturationModel;

/// Allocates a budget against fixed marginal returns
#[derive(Debug, Clone)]
pub struct BudgetOptimizer {
    marginal_roas: BTreeMap<String, f64>,
    saturation: SaturationModel,
    config: OptimizationConfig,
}

impl BudgetOptimizer {
    #[must_use]
    pub fn new(marginal_roas: BTreeMap<String, f64>) -> Self {
        Self {
            marginal_roas,
            saturation: SaturationModel::default(),
            config: OptimizationConfig::default(),
        }
    }

    #[must_use]
    pub fn with_saturation(mut self, saturation: SaturationModel) -> Self {
        self.saturation = saturation;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: OptimizationConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn marginal_roas(&self) -> &BTreeMap<String, f64> {
        &self.marginal_roas
    }

    #[must_use]
    pub fn saturation(&self) -> &SaturationModel {
        &self.saturation
    }

    /// Saturated revenue for an allocation; channels without a known ROAS are skipped
    #[must_use]
    pub fn expected_revenue(&self, allocations: &BTreeMap<String, f64>) -> f64 {
        allocations
            .iter()
            .filter_map(|(channel, &spend)| {
                self.marginal_roas
                    .get(channel)
                    .map(|&roas| self.saturation.channel_revenue(channel, spend, roas))
            })
            .sum()
    }

    /// Maximize expected revenue for `total_budget` within `bounds`
    ///
    /// # Errors
    /// Returns [`ConfigurationError`] for empty ROAS, a negative or non-finite
    /// budget, malformed bounds, or bounds that cannot meet the budget.
    pub fn optimize(
        &self,
        total_budget: f64,
        bounds: &SpendBounds,
    ) -> Result<OptimizationResult, ConfigurationError> {
        let polytope = self.validate(total_budget, bounds)?;
        let channels: Vec<String> = self.marginal_roas.keys().cloned().collect();
        let roas: Vec<f64> = self.marginal_roas.values().copied().collect();

        let x0 = vec![total_budget / channels.len() as f64; channels.len()];
        let objective = RevenueObjective::new(&channels, &roas, &self.saturation);
        let outcome = maximize(
            &objective,
            &polytope,
            &x0,
            self.config.max_iterations,
            self.config.tolerance,
        );

        let allocations: BTreeMap<String, f64> =
            channels.into_iter().zip(outcome.x.iter().copied()).collect();
        let expected_revenue = self.expected_revenue(&allocations);
        let expected_roi = roi(expected_revenue, total_budget);
        let converged = outcome.converged();

        if converged {
            tracing::debug!(
                iterations = outcome.iterations,
                steps = outcome.history.num_steps(),
                gain = outcome.history.total_gain(),
                expected_revenue,
                "budget optimization converged"
            );
        } else {
            tracing::warn!(
                iterations = outcome.iterations,
                reason = ?outcome.termination_reason,
                "budget optimization did not converge; returning last iterate"
            );
        }

        Ok(OptimizationResult {
            allocations,
            expected_revenue,
            expected_roi,
            total_budget,
            converged,
            message: outcome.termination_reason.message().to_string(),
            termination_reason: outcome.termination_reason,
            iterations: outcome.iterations,
            history: Some(outcome.history),
        })
    }

    fn validate(
        &self,
        total_budget: f64,
        bounds: &SpendBounds,
    ) -> Result<BudgetPolytope, ConfigurationError> {
        if self.marginal_roas.is_empty() {
            return Err(ConfigurationError::NoChannels);
        }
        if !total_budget.is_finite() {
            return Err(ConfigurationError::NonFiniteInput("total_budget".to_string()));
        }
        if total_budget < 0.0 {
            return Err(ConfigurationError::NegativeBudget(total_budget));
        }
        if let Some((channel, _)) = self.marginal_roas.iter().find(|(_, r)| !r.is_finite()) {
            return Err(ConfigurationError::NonFiniteInput(format!(
                "marginal_roas[{channel}]"
            )));
        }

        for channel in bounds.channels() {
            if !self.marginal_roas.contains_key(channel) {
                tracing::warn!(channel = %channel, "ignoring spend bound for unknown channel");
            }
        }

        let mut lower = Vec::with_capacity(self.marginal_roas.len());
        let mut upper = Vec::with_capacity(self.marginal_roas.len());
        for channel in self.marginal_roas.keys() {
            let (min, max) = bounds.resolve(channel, total_budget);
            if !min.is_finite() || !max.is_finite() {
                return Err(ConfigurationError::NonFiniteInput(format!(
                    "spend bound for {channel}"
                )));
            }
            for value in [min, max] {
                if value < 0.0 {
                    return Err(ConfigurationError::NegativeSpend {
                        channel: channel.clone(),
                        value,
                    });
                }
            }
            if min > max {
                return Err(ConfigurationError::InvertedBounds {
                    channel: channel.clone(),
                    min,
                    max,
                });
            }
            lower.push(min);
            upper.push(max);
        }

        let tolerance = self.config.projection_tolerance * total_budget.max(1.0);
        let min_total: f64 = lower.iter().sum();
        let max_total: f64 = upper.iter().sum();
        if min_total > total_budget + tolerance || max_total < total_budget - tolerance {
            return Err(ConfigurationError::InfeasibleBounds {
                total_budget,
                min_total,
                max_total,
            });
        }

        Ok(BudgetPolytope {
            lower,
            upper,
            budget: total_budget,
            tolerance,
        })
    }
}

/// `revenue / budget`, or 0 when the budget is 0
#[must_use]
pub fn roi(revenue: f64, total_budget: f64) -> f64 {
    if total_budget > 0.0 {
        revenue / total_budget
    } else {
        0.0
    }
}

/// One-shot optimization with the default saturation curve
///
/// # Errors
/// See [`BudgetOptimizer::optimize`].
pub fn optimize_budget(
    marginal_roas: &BTreeMap<String, f64>,
    total_budget: f64,
    min_spend: Option<&BTreeMap<String, f64>>,
    max_spend: Option<&BTreeMap<String, f64>>,
) -> Result<OptimizationResult, ConfigurationError> {
    let bounds = SpendBounds {
        min_spend: min_spend.cloned().unwrap_or_default(),
        max_spend: max_spend.cloned().unwrap_or_default(),
    };
    BudgetOptimizer::new(marginal_roas.clone()).optimize(total_budget, &bounds)
}
