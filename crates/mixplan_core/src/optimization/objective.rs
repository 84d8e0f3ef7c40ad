//! Saturated revenue objective
//!
//! Maps a spend vector (one entry per channel, in channel order) to
//! `Σ spend_c * roas_c * multiplier_c(spend_c)` and its gradient.

use crate::saturation::SaturationModel;

use super::solver::Objective;

pub struct RevenueObjective<'a> {
    channels: &'a [String],
    roas: &'a [f64],
    saturation: &'a SaturationModel,
}

impl<'a> RevenueObjective<'a> {
    /// `channels` and `roas` must have equal length
    #[must_use]
    pub fn new(channels: &'a [String], roas: &'a [f64], saturation: &'a SaturationModel) -> Self {
        debug_assert_eq!(channels.len(), roas.len());
        Self {
            channels,
            roas,
            saturation,
        }
    }
}

impl Objective for RevenueObjective<'_> {
    fn value(&self, x: &[f64]) -> f64 {
        self.channels
            .iter()
            .zip(self.roas.iter().zip(x.iter()))
            .map(|(channel, (roas, spend))| self.saturation.channel_revenue(channel, *spend, *roas))
            .sum()
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        self.channels
            .iter()
            .zip(self.roas.iter().zip(x.iter()))
            .map(|(channel, (roas, spend))| self.saturation.marginal_revenue(channel, *spend, *roas))
            .collect()
    }
}
