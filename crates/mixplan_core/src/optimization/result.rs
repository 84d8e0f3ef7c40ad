//! Optimization result types
//!
//! Contains the solver's progress trace and the allocation reported to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Objective value after every accepted iterate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    /// Expected revenue at the starting point, then after each accepted step
    pub objective_values: Vec<f64>,
}

impl ConvergenceHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: f64) {
        self.objective_values.push(value);
    }

    #[must_use]
    pub fn num_steps(&self) -> usize {
        self.objective_values.len().saturating_sub(1)
    }

    /// Improvement from the starting point to the last iterate
    #[must_use]
    pub fn total_gain(&self) -> f64 {
        match (self.objective_values.first(), self.objective_values.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// Reason why optimization terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The projected gradient vanished within tolerance
    Converged,

    /// No step size produced sufficient increase; the iterate is numerically stationary
    Stalled,

    /// Iteration cap reached before the stopping test passed
    MaxIterationsReached,
}

impl TerminationReason {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            TerminationReason::Converged => "Optimization terminated successfully",
            TerminationReason::Stalled => "Line search could not improve the objective further",
            TerminationReason::MaxIterationsReached => "Iteration limit reached",
        }
    }
}

/// Final budget allocation
///
/// The allocation always satisfies the bounds and the budget equality, even when
/// `converged` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Spend per channel, summing to `total_budget`
    pub allocations: BTreeMap<String, f64>,

    /// Saturated revenue at the allocation
    pub expected_revenue: f64,

    /// `expected_revenue / total_budget`, or 0 for a zero budget
    pub expected_roi: f64,

    pub total_budget: f64,

    /// Whether the solver reached its stopping criterion
    #[serde(rename = "optimization_status")]
    pub converged: bool,

    /// Human-readable solver status
    pub message: String,

    pub termination_reason: TerminationReason,

    /// Number of iterations performed
    pub iterations: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<ConvergenceHistory>,
}

impl OptimizationResult {
    /// Sum of all allocations
    #[must_use]
    pub fn allocated_total(&self) -> f64 {
        self.allocations.values().sum()
    }
}
