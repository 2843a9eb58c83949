//! Engle-Granger two-step cointegration test and spread half-life.

use crate::error::AnalyticsError;
use crate::regression::{ols, with_intercept};
use crate::stationarity::{adf_fit, mackinnon_crit, mackinnon_p, CriticalValues, Deterministic};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CointegrationResult {
    /// ADF statistic of the regression residuals.
    pub statistic: f64,
    pub p_value: f64,
    pub critical_values: CriticalValues,
    /// Slope of `a` regressed on `b`.
    pub hedge_ratio: f64,
    pub intercept: f64,
    pub used_lag: usize,
}

impl CointegrationResult {
    pub fn is_cointegrated(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Tests whether `a` and `b` are cointegrated.
///
/// `a` is regressed on `b` with an intercept and the residuals are tested for
/// a unit root without deterministic terms. A regression that fits almost
/// perfectly is reported as cointegrated with a statistic of `-inf`.
pub fn engle_granger(
    a: &[f64],
    b: &[f64],
    max_lag: Option<usize>,
) -> Result<CointegrationResult, AnalyticsError> {
    if a.len() != b.len() {
        return Err(AnalyticsError::LengthMismatch(a.len(), b.len()));
    }
    if a.len() < 3 {
        return Err(AnalyticsError::NotEnoughData(format!(
            "{} observations",
            a.len()
        )));
    }

    let fit = ols(a, &with_intercept(b))?;
    let hedge_ratio = fit.params[0];
    let intercept = fit.params[1];
    let critical_values = mackinnon_crit(2, a.len() - 1)?;

    let r_squared = fit.r_squared(a);
    if r_squared >= 1.0 - 100.0 * f64::EPSILON.sqrt() {
        tracing::debug!(r_squared, "near-perfect hedge regression");
        return Ok(CointegrationResult {
            statistic: f64::NEG_INFINITY,
            p_value: 0.0,
            critical_values,
            hedge_ratio,
            intercept,
            used_lag: 0,
        });
    }

    let adf = adf_fit(&fit.residuals, max_lag, Deterministic::None)?;
    let p_value = mackinnon_p(adf.statistic, 2)?;

    tracing::debug!(
        statistic = adf.statistic,
        p_value,
        hedge_ratio,
        "Engle-Granger test"
    );

    Ok(CointegrationResult {
        statistic: adf.statistic,
        p_value,
        critical_values,
        hedge_ratio,
        intercept,
        used_lag: adf.used_lag,
    })
}

/// Mean-reversion half-life of a spread, in observations.
///
/// Fits `Δs_t = c + φ (s_{t-1} - mean) + e_t`; returns `None` unless
/// `-1 < φ < 0`.
pub fn half_life(spread: &[f64]) -> Result<Option<f64>, AnalyticsError> {
    if spread.len() < 4 {
        return Err(AnalyticsError::NotEnoughData(format!(
            "{} observations",
            spread.len()
        )));
    }
    let mean = crate::stats::mean(spread);
    let lagged: Vec<f64> = spread[..spread.len() - 1].iter().map(|s| s - mean).collect();
    let deltas: Vec<f64> = spread.windows(2).map(|w| w[1] - w[0]).collect();

    let fit = ols(&deltas, &with_intercept(&lagged))?;
    let phi = fit.params[0];
    if phi > -1.0 && phi < 0.0 {
        Ok(Some(-std::f64::consts::LN_2 / (1.0 + phi).ln()))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stationarity::tests::{noise, random_walk};

    fn ar1(seed: u64, n: usize, phi: f64) -> Vec<f64> {
        noise(seed, n)
            .into_iter()
            .scan(0.0, |level, e| {
                *level = phi * *level + e;
                Some(*level)
            })
            .collect()
    }

    #[test]
    fn detects_cointegrated_pair() {
        let b = random_walk(23, 600);
        let a: Vec<f64> = b
            .iter()
            .zip(ar1(29, 600, 0.3))
            .map(|(b, e)| 0.8 * b + 5.0 + e)
            .collect();

        let result = engle_granger(&a, &b, None).unwrap();
        assert!(result.is_cointegrated(0.01), "p = {}", result.p_value);
        assert!((result.hedge_ratio - 0.8).abs() < 0.05);
        assert!(result.statistic < result.critical_values.one_pct);
    }

    #[test]
    fn independent_walks_are_not_cointegrated() {
        let a = random_walk(31, 600);
        let b = random_walk(37, 600);
        let result = engle_granger(&a, &b, None).unwrap();
        assert!(!result.is_cointegrated(0.05), "p = {}", result.p_value);
    }

    #[test]
    fn exact_linear_relation_short_circuits() {
        let b = random_walk(43, 100);
        let a: Vec<f64> = b.iter().map(|v| 2.0 * v + 1.0).collect();
        let result = engle_granger(&a, &b, None).unwrap();
        assert_eq!(result.statistic, f64::NEG_INFINITY);
        assert_eq!(result.p_value, 0.0);
        assert!((result.hedge_ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_lengths() {
        assert_eq!(
            engle_granger(&[1.0, 2.0, 3.0], &[1.0, 2.0], None),
            Err(AnalyticsError::LengthMismatch(3, 2))
        );
    }

    #[test]
    fn half_life_of_ar1() {
        // phi = 0.5 gives a half-life of one step
        let spread = ar1(41, 500, 0.5);
        let hl = half_life(&spread).unwrap().unwrap();
        assert!(hl > 0.7 && hl < 1.4, "half-life {}", hl);
    }

    #[test]
    fn explosive_spread_has_no_half_life() {
        let spread: Vec<f64> = (0..50).map(|t| 1.1f64.powi(t)).collect();
        assert_eq!(half_life(&spread).unwrap(), None);
    }
}
