//! Column standardization and L2-regularized least squares
//!
//! The ridge fit includes an unpenalized intercept: columns and target are
//! centered on the rows being fitted, then the regularized normal equations
//! `(XᵀX + αI) β = Xᵀy` are solved by Cholesky factorization.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::FittingError;

/// Per-column mean and scale learned from fit data
///
/// Zero-variance columns get a scale of 1 so they standardize to all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl Standardizer {
    /// Learn column means and population standard deviations
    pub fn fit(x: &DMatrix<f64>) -> Result<Self, FittingError> {
        if x.nrows() == 0 {
            return Err(FittingError::EmptyAfterAlignment);
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(FittingError::NonFinite {
                context: "feature matrix",
            });
        }

        let n = x.nrows() as f64;
        let mut means = Vec::with_capacity(x.ncols());
        let mut scales = Vec::with_capacity(x.ncols());
        for col in x.column_iter() {
            let mean = col.sum() / n;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            means.push(mean);
            scales.push(if std > f64::EPSILON { std } else { 1.0 });
        }
        Ok(Self { means, scales })
    }

    pub fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, FittingError> {
        if x.ncols() != self.means.len() {
            return Err(FittingError::DimensionMismatch {
                context: "standardizer columns",
                expected: self.means.len(),
                actual: x.ncols(),
            });
        }
        Ok(DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| {
            (x[(i, j)] - self.means[j]) / self.scales[j]
        }))
    }
}

/// A fitted ridge regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl RidgeModel {
    #[must_use]
    pub fn predict(&self, x: &DMatrix<f64>) -> DVector<f64> {
        let beta = DVector::from_column_slice(&self.coefficients);
        let mut out = x * beta;
        out.add_scalar_mut(self.intercept);
        out
    }
}

/// Fit a ridge regression of `y` on `x` with regularization strength `alpha`
pub fn fit_ridge(x: &DMatrix<f64>, y: &DVector<f64>, alpha: f64) -> Result<RidgeModel, FittingError> {
    if x.nrows() != y.len() {
        return Err(FittingError::DimensionMismatch {
            context: "ridge target",
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    if x.nrows() == 0 {
        return Err(FittingError::EmptyAfterAlignment);
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(FittingError::NonFinite { context: "target" });
    }

    let n = x.nrows() as f64;
    let p = x.ncols();
    let x_means: Vec<f64> = x.column_iter().map(|c| c.sum() / n).collect();
    let y_mean = y.sum() / n;

    let xc = DMatrix::from_fn(x.nrows(), p, |i, j| x[(i, j)] - x_means[j]);
    let yc = y.add_scalar(-y_mean);

    let mut gram = xc.tr_mul(&xc);
    for j in 0..p {
        gram[(j, j)] += alpha;
    }
    let rhs = xc.tr_mul(&yc);

    let cholesky = gram
        .cholesky()
        .ok_or(FittingError::Singular { columns: p, alpha })?;
    let beta = cholesky.solve(&rhs);

    if beta.iter().any(|v| !v.is_finite()) {
        return Err(FittingError::NonFinite {
            context: "ridge coefficients",
        });
    }

    let intercept = y_mean
        - beta
            .iter()
            .zip(x_means.iter())
            .map(|(b, m)| b * m)
            .sum::<f64>();

    Ok(RidgeModel {
        intercept,
        coefficients: beta.iter().copied().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardizer_zero_mean_unit_variance() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 5.0, 2.0, 5.0, 3.0, 5.0, 4.0, 5.0]);
        let scaler = Standardizer::fit(&x).unwrap();
        let z = scaler.transform(&x).unwrap();

        let col0 = z.column(0);
        assert!(col0.sum().abs() < 1e-12);
        let var = col0.iter().map(|v| v * v).sum::<f64>() / 4.0;
        assert!((var - 1.0).abs() < 1e-12);

        // Constant column standardizes to zeros
        assert_eq!(scaler.scales[1], 1.0);
        assert!(z.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_ridge_without_penalty_recovers_line() {
        // y = 2 + 3x
        let x = DMatrix::from_column_slice(4, 1, &[0.0, 1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![2.0, 5.0, 8.0, 11.0]);
        let model = fit_ridge(&x, &y, 0.0).unwrap();

        assert!((model.coefficients[0] - 3.0).abs() < 1e-9);
        assert!((model.intercept - 2.0).abs() < 1e-9);
        assert!((model.predict(&x) - &y).amax() < 1e-9);
    }

    #[test]
    fn test_ridge_shrinks_toward_zero() {
        let x = DMatrix::from_column_slice(4, 1, &[0.0, 1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![2.0, 5.0, 8.0, 11.0]);
        let model = fit_ridge(&x, &y, 5.0).unwrap();

        // sum of squared centered x is 5, so beta = 15 / (5 + 5)
        assert!((model.coefficients[0] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_singular_without_penalty() {
        let x = DMatrix::from_column_slice(3, 1, &[1.0, 1.0, 1.0]);
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let err = fit_ridge(&x, &y, 0.0).unwrap_err();
        assert_eq!(err, FittingError::Singular { columns: 1, alpha: 0.0 });
    }

    #[test]
    fn test_dimension_mismatch() {
        let x = DMatrix::from_column_slice(3, 1, &[1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(
            fit_ridge(&x, &y, 1.0),
            Err(FittingError::DimensionMismatch { .. })
        ));
    }
}
