//! What-if comparison of caller-supplied allocations
//!
//! Scenarios are scored with the optimizer's own objective. ROI always divides
//! by the requested total budget, so a scenario that underspends shows a
//! proportionally lower ROI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::optimization::{BudgetOptimizer, roi};

/// Allowed gap between a scenario's total and the requested budget before warning
pub const BUDGET_MISMATCH_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Position of the scenario in the input
    pub scenario_id: usize,
    pub allocations: BTreeMap<String, f64>,
    pub expected_revenue: f64,
    pub expected_roi: f64,
}

impl BudgetOptimizer {
    /// Score each allocation against `total_budget`, preserving input order
    ///
    /// Channels without a known ROAS contribute nothing. Scenarios that do not
    /// spend exactly `total_budget` are still scored, with a warning.
    #[must_use]
    pub fn compare_scenarios(
        &self,
        scenarios: &[BTreeMap<String, f64>],
        total_budget: f64,
    ) -> Vec<ScenarioResult> {
        scenarios
            .iter()
            .enumerate()
            .map(|(scenario_id, allocations)| {
                let allocated: f64 = allocations.values().sum();
                if (allocated - total_budget).abs() > BUDGET_MISMATCH_TOLERANCE {
                    tracing::warn!(
                        scenario_id,
                        allocated,
                        total_budget,
                        "scenario allocations do not sum to the total budget"
                    );
                }

                let expected_revenue = self.expected_revenue(allocations);
                ScenarioResult {
                    scenario_id,
                    allocations: allocations.clone(),
                    expected_revenue,
                    expected_roi: roi(expected_revenue, total_budget),
                }
            })
            .collect()
    }
}
