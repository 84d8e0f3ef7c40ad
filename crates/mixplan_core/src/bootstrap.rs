//! Bootstrap confidence intervals for channel coefficients
//!
//! Each resample draws rows with replacement and refits an independent ridge
//! model. Resamples share only read access to the design matrix and target,
//! so with the `parallel` feature they run on the rayon pool. Every resample
//! seeds its own RNG from `base_seed + index`, which keeps results identical
//! regardless of thread scheduling.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::FittingError;
use crate::model::ConfidenceInterval;
use crate::ridge::{RidgeModel, fit_ridge};
use crate::stats::percentile;

/// Resampling settings
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapConfig {
    pub bootstrap_count: usize,
    pub confidence_level: f64,
    /// Ridge strength for every refit; matches the primary fit
    pub alpha: f64,
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            bootstrap_count: 100,
            confidence_level: 0.95,
            alpha: 1.0,
            seed: None,
        }
    }
}

/// Percentile intervals for each channel's coefficient
///
/// `mean` is taken from `primary`, the model actually deployed. Channels whose
/// column index is outside the coefficient range are left out of the result.
pub fn confidence_intervals(
    features: &DMatrix<f64>,
    target: &DVector<f64>,
    channel_columns: &BTreeMap<String, usize>,
    primary: &RidgeModel,
    config: &BootstrapConfig,
) -> Result<BTreeMap<String, ConfidenceInterval>, FittingError> {
    if features.nrows() != target.len() {
        return Err(FittingError::DimensionMismatch {
            context: "bootstrap target",
            expected: features.nrows(),
            actual: target.len(),
        });
    }
    if features.nrows() == 0 {
        return Err(FittingError::EmptyAfterAlignment);
    }

    let base_seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let samples = resample_coefficients(features, target, config, base_seed)?;

    let tail = (1.0 - config.confidence_level) / 2.0;
    let lower_q = tail * 100.0;
    let upper_q = (1.0 - tail) * 100.0;
    let num_coefficients = samples.first().map_or(0, Vec::len);

    let mut intervals = BTreeMap::new();
    for (channel, &column) in channel_columns {
        if column >= num_coefficients || column >= primary.coefficients.len() {
            continue;
        }
        let draws: Vec<f64> = samples.iter().map(|coefs| coefs[column]).collect();
        if let (Some(lower), Some(upper)) =
            (percentile(&draws, lower_q), percentile(&draws, upper_q))
        {
            intervals.insert(
                channel.clone(),
                ConfidenceInterval {
                    lower,
                    upper,
                    mean: primary.coefficients[column],
                },
            );
        }
    }

    Ok(intervals)
}

/// Coefficient vectors from every resample, indexed by resample number
fn resample_coefficients(
    features: &DMatrix<f64>,
    target: &DVector<f64>,
    config: &BootstrapConfig,
    base_seed: u64,
) -> Result<Vec<Vec<f64>>, FittingError> {
    let run = |iteration: usize| -> Result<Vec<f64>, FittingError> {
        let mut rng = SmallRng::seed_from_u64(base_seed.wrapping_add(iteration as u64));
        let indices = draw_indices(&mut rng, features.nrows());
        let x = features.select_rows(indices.iter());
        let y = target.select_rows(indices.iter());
        fit_ridge(&x, &y, config.alpha).map(|model| model.coefficients)
    };

    #[cfg(feature = "parallel")]
    let samples: Result<Vec<Vec<f64>>, FittingError> =
        (0..config.bootstrap_count).into_par_iter().map(run).collect();
    #[cfg(not(feature = "parallel"))]
    let samples: Result<Vec<Vec<f64>>, FittingError> =
        (0..config.bootstrap_count).map(run).collect();

    samples
}

/// `n` row indices drawn uniformly with replacement
fn draw_indices<R: Rng>(rng: &mut R, n: usize) -> Vec<usize> {
    (0..n).map(|_| rng.random_range(0..n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_problem(n: usize) -> (DMatrix<f64>, DVector<f64>) {
        // y = 4 * x0 - 2 * x1 with a small deterministic wobble
        let x = DMatrix::from_fn(n, 2, |i, j| {
            let t = i as f64;
            if j == 0 { (t * 0.37).sin() } else { (t * 0.11).cos() }
        });
        let y = DVector::from_fn(n, |i, _| {
            4.0 * x[(i, 0)] - 2.0 * x[(i, 1)] + 0.05 * ((i * 7 % 11) as f64 - 5.0)
        });
        (x, y)
    }

    #[test]
    fn test_draw_indices_in_range() {
        let mut rng = SmallRng::seed_from_u64(3);
        let indices = draw_indices(&mut rng, 10);
        assert_eq!(indices.len(), 10);
        assert!(indices.iter().all(|&i| i < 10));
    }

    #[test]
    fn test_intervals_bracket_primary_coefficient() {
        let (x, y) = linear_problem(80);
        let primary = fit_ridge(&x, &y, 1.0).unwrap();
        let columns = BTreeMap::from([("a".to_string(), 0), ("b".to_string(), 1)]);
        let config = BootstrapConfig {
            bootstrap_count: 200,
            seed: Some(11),
            ..Default::default()
        };

        let intervals = confidence_intervals(&x, &y, &columns, &primary, &config).unwrap();

        for (channel, ci) in &intervals {
            assert!(ci.lower <= ci.mean && ci.mean <= ci.upper, "{channel}: {ci:?}");
        }
        assert_eq!(intervals["a"].mean, primary.coefficients[0]);
        assert!((intervals["a"].mean - 4.0).abs() < 0.3);
    }

    #[test]
    fn test_same_seed_same_intervals() {
        let (x, y) = linear_problem(60);
        let primary = fit_ridge(&x, &y, 1.0).unwrap();
        let columns = BTreeMap::from([("a".to_string(), 0)]);
        let config = BootstrapConfig {
            bootstrap_count: 20,
            seed: Some(99),
            ..Default::default()
        };

        let first = confidence_intervals(&x, &y, &columns, &primary, &config).unwrap();
        let second = confidence_intervals(&x, &y, &columns, &primary, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_range_column_is_omitted() {
        let (x, y) = linear_problem(40);
        let primary = fit_ridge(&x, &y, 1.0).unwrap();
        let columns = BTreeMap::from([("a".to_string(), 0), ("ghost".to_string(), 9)]);
        let config = BootstrapConfig {
            bootstrap_count: 10,
            seed: Some(5),
            ..Default::default()
        };

        let intervals = confidence_intervals(&x, &y, &columns, &primary, &config).unwrap();
        assert!(intervals.contains_key("a"));
        assert!(!intervals.contains_key("ghost"));
    }
}
