//! Small statistics helpers shared by the estimators

use nalgebra::DVector;

/// Added to the denominator of each MAPE term
pub const MAPE_EPSILON: f64 = 1e-10;

/// Percentile of `values` with linear interpolation between order statistics
///
/// `q` is in [0, 100]. Returns `None` for an empty slice.
#[must_use]
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Coefficient of determination
///
/// A constant target yields 1.0 for a perfect fit and 0.0 otherwise.
#[must_use]
pub fn r_squared(actual: &DVector<f64>, predicted: &DVector<f64>) -> f64 {
    let mean = actual.mean();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Mean absolute percentage error, in percent
#[must_use]
pub fn mape(actual: &DVector<f64>, predicted: &DVector<f64>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| ((a - p) / (a + MAPE_EPSILON)).abs())
        .sum();
    total / actual.len() as f64 * 100.0
}

/// Population standard deviation of residuals
#[must_use]
pub fn residual_std(actual: &DVector<f64>, predicted: &DVector<f64>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let ss: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    (ss / actual.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(4.0));
        assert!((percentile(&values, 50.0).unwrap() - 2.5).abs() < 1e-12);
        assert!((percentile(&values, 2.5).unwrap() - 1.075).abs() < 1e-12);
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_r_squared_perfect_and_mean_fit() {
        let actual = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!((r_squared(&actual, &actual) - 1.0).abs() < 1e-12);

        let mean_only = DVector::from_vec(vec![2.0, 2.0, 2.0]);
        assert!(r_squared(&actual, &mean_only).abs() < 1e-12);
    }

    #[test]
    fn test_mape_percent() {
        let actual = DVector::from_vec(vec![100.0, 200.0]);
        let predicted = DVector::from_vec(vec![110.0, 180.0]);
        assert!((mape(&actual, &predicted) - 10.0).abs() < 1e-6);
    }
}
