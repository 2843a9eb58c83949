//! Ordinary least squares via the normal equations.

use crate::error::AnalyticsError;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// The pieces of an OLS fit the tests in this crate need.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    pub nobs: usize,
}

impl OlsFit {
    pub fn t_value(&self, column: usize) -> f64 {
        self.params[column] / self.std_errors[column]
    }

    /// Gaussian log-likelihood evaluated at the OLS estimates.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every regressor as a parameter.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.params.len() as f64
    }

    /// Coefficient of determination against the mean of `y`.
    pub fn r_squared(&self, y: &[f64]) -> f64 {
        let m = y.iter().sum::<f64>() / y.len() as f64;
        let tss: f64 = y.iter().map(|v| (v - m).powi(2)).sum();
        1.0 - self.ssr / tss
    }
}

/// Regresses `y` on the columns of `x`.
pub fn ols(y: &[f64], x: &DMatrix<f64>) -> Result<OlsFit, AnalyticsError> {
    let (nobs, k) = x.shape();
    if nobs != y.len() {
        return Err(AnalyticsError::LengthMismatch(nobs, y.len()));
    }
    if nobs <= k {
        return Err(AnalyticsError::NotEnoughData(format!(
            "{} observations for {} regressors",
            nobs, k
        )));
    }

    let y_vec = DVector::from_column_slice(y);
    let xt = x.transpose();
    let xtx_inv = (&xt * x)
        .try_inverse()
        .ok_or_else(|| AnalyticsError::SingularMatrix(format!("{}x{} design", nobs, k)))?;
    let beta = &xtx_inv * (&xt * &y_vec);

    let residuals = &y_vec - x * &beta;
    let ssr = residuals.dot(&residuals);
    let sigma2 = ssr / (nobs - k) as f64;
    let std_errors = (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).sqrt()).collect();

    Ok(OlsFit {
        params: beta.iter().copied().collect(),
        std_errors,
        residuals: residuals.iter().copied().collect(),
        ssr,
        nobs,
    })
}

/// Design matrix `[x, 1]` for a simple regression with intercept last.
pub fn with_intercept(x: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { x[i] } else { 1.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 1.0).collect();
        let fit = ols(&y, &with_intercept(&x)).unwrap();
        assert!((fit.params[0] - 3.0).abs() < 1e-10);
        assert!((fit.params[1] + 1.0).abs() < 1e-10);
        assert!(fit.ssr < 1e-18);
        assert!((fit.r_squared(&y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn standard_errors_match_hand_computation() {
        // y = 1 + 2x + e with e = [1, -1, 1, -1]
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [4.0, 4.0, 8.0, 8.0];
        let fit = ols(&y, &with_intercept(&x)).unwrap();

        // slope = Sxy / Sxx = 8 / 5, intercept = ybar - slope * xbar = 6 - 4 = 2
        assert!((fit.params[0] - 1.6).abs() < 1e-12);
        assert!((fit.params[1] - 2.0).abs() < 1e-12);
        // ssr = 3.2, sigma2 = 1.6, se(slope) = sqrt(1.6 / 5)
        assert!((fit.ssr - 3.2).abs() < 1e-12);
        assert!((fit.std_errors[0] - (1.6f64 / 5.0).sqrt()).abs() < 1e-12);
        assert!((fit.t_value(0) - 1.6 / (0.32f64).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn collinear_design_is_singular() {
        let x = DMatrix::from_fn(4, 2, |i, _| i as f64);
        assert!(matches!(
            ols(&[1.0, 2.0, 3.0, 4.0], &x),
            Err(AnalyticsError::SingularMatrix(_))
        ));
    }

    #[test]
    fn needs_more_rows_than_columns() {
        let x = with_intercept(&[1.0, 2.0]);
        assert!(matches!(
            ols(&[1.0, 2.0], &x),
            Err(AnalyticsError::NotEnoughData(_))
        ));
    }
}
