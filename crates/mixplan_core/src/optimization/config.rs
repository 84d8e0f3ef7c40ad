//! Optimization configuration types
//!
//! Solver settings plus the per-channel spend bounds a caller may impose.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-channel spend limits
///
/// Channels without an entry default to `[0, total_budget]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendBounds {
    #[serde(default)]
    pub min_spend: BTreeMap<String, f64>,
    #[serde(default)]
    pub max_spend: BTreeMap<String, f64>,
}

impl SpendBounds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_min(mut self, channel: impl Into<String>, min: f64) -> Self {
        self.min_spend.insert(channel.into(), min);
        self
    }

    #[must_use]
    pub fn with_max(mut self, channel: impl Into<String>, max: f64) -> Self {
        self.max_spend.insert(channel.into(), max);
        self
    }

    /// Resolved `(min, max)` for a channel under a given budget
    #[must_use]
    pub fn resolve(&self, channel: &str, total_budget: f64) -> (f64, f64) {
        (
            self.min_spend.get(channel).copied().unwrap_or(0.0),
            self.max_spend.get(channel).copied().unwrap_or(total_budget),
        )
    }

    /// Channels named in either map
    pub fn channels(&self) -> impl Iterator<Item = &String> {
        self.min_spend.keys().chain(self.max_spend.keys())
    }
}

/// Solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationConfig {
    /// Maximum solver iterations
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence tolerance, relative to the total budget
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Budget equality tolerance for the projection step, relative to the total budget
    #[serde(default = "default_projection_tolerance")]
    pub projection_tolerance: f64,
}

fn default_max_iterations() -> usize {
    1000
}

fn default_tolerance() -> f64 {
    1e-8
}

fn default_projection_tolerance() -> f64 {
    1e-10
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            projection_tolerance: default_projection_tolerance(),
        }
    }
}
