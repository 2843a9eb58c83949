//! Augmented Dickey-Fuller unit-root test with MacKinnon p-values.

use crate::error::AnalyticsError;
use crate::regression::{ols, OlsFit};
use crate::stats::is_constant;
use nalgebra::DMatrix;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Deterministic terms included in the test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deterministic {
    None,
    Constant,
}

impl Deterministic {
    fn terms(self) -> usize {
        match self {
            Deterministic::None => 0,
            Deterministic::Constant => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfResult {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    pub critical_values: CriticalValues,
}

impl AdfResult {
    pub fn is_stationary(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Statistic and lag order of a fitted ADF regression.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AdfFit {
    pub statistic: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

/// Runs the ADF test with a constant, choosing the lag order by AIC.
///
/// `max_lag` defaults to `ceil(12 * (n / 100)^(1/4))`, capped so the
/// regression keeps enough degrees of freedom.
pub fn adf_test(series: &[f64], max_lag: Option<usize>) -> Result<AdfResult, AnalyticsError> {
    let fit = adf_fit(series, max_lag, Deterministic::Constant)?;
    let p_value = mackinnon_p(fit.statistic, 1)?;
    let critical_values = mackinnon_crit(1, fit.nobs)?;

    tracing::debug!(
        statistic = fit.statistic,
        p_value,
        used_lag = fit.used_lag,
        nobs = fit.nobs,
        "ADF test"
    );

    Ok(AdfResult {
        statistic: fit.statistic,
        p_value,
        used_lag: fit.used_lag,
        nobs: fit.nobs,
        critical_values,
    })
}

pub(crate) fn adf_fit(
    series: &[f64],
    max_lag: Option<usize>,
    deterministic: Deterministic,
) -> Result<AdfFit, AnalyticsError> {
    let n = series.len();
    if series.iter().any(|v| !v.is_finite()) {
        return Err(AnalyticsError::InvalidParameter(
            "series contains non-finite values".into(),
        ));
    }
    if is_constant(series) {
        return Err(AnalyticsError::DegenerateSeries(
            "ADF test on a constant series".into(),
        ));
    }

    let cap = (n / 2) as i64 - deterministic.terms() as i64 - 1;
    if cap < 0 {
        return Err(AnalyticsError::NotEnoughData(format!(
            "{} observations are too few for an ADF regression",
            n
        )));
    }
    let cap = cap as usize;
    let max_lag = match max_lag {
        Some(lag) if lag > cap => {
            return Err(AnalyticsError::InvalidParameter(format!(
                "max_lag {} exceeds {} for {} observations",
                lag, cap, n
            )))
        }
        Some(lag) => lag,
        None => {
            let default = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
            default.min(cap)
        }
    };

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    // Every candidate lag is fitted on the same rows so the AICs compare.
    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let fit = fit_lag(series, &diffs, lag, max_lag, deterministic)?;
        let aic = fit.aic();
        if best.map_or(true, |(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }
    let used_lag = best.map(|(_, lag)| lag).unwrap_or(0);

    let fit = fit_lag(series, &diffs, used_lag, used_lag, deterministic)?;
    let statistic = fit.t_value(0);
    if statistic.is_nan() {
        return Err(AnalyticsError::DegenerateSeries(
            "ADF statistic is undefined".into(),
        ));
    }

    Ok(AdfFit {
        statistic,
        used_lag,
        nobs: fit.nobs,
    })
}

/// Regresses `diffs[t]` on `[series[t], diffs[t-1..=t-lag], const?]` for
/// `t` in `start..diffs.len()`.
fn fit_lag(
    series: &[f64],
    diffs: &[f64],
    lag: usize,
    start: usize,
    deterministic: Deterministic,
) -> Result<OlsFit, AnalyticsError> {
    let rows = diffs.len().saturating_sub(start);
    let cols = 1 + lag + deterministic.terms();
    let x = DMatrix::from_fn(rows, cols, |r, c| {
        let t = start + r;
        match c {
            0 => series[t],
            c if c <= lag => diffs[t - c],
            _ => 1.0,
        }
    });
    ols(&diffs[start..], &x)
}

// MacKinnon (1994) response surfaces for the constant-only regression,
// indexed by the number of variables.
const TAU_MAX: [f64; 2] = [2.74, 0.92];
const TAU_MIN: [f64; 2] = [-18.83, -18.86];
const TAU_STAR: [f64; 2] = [-1.61, -2.62];
const TAU_SMALL_P: [[f64; 3]; 2] = [[2.1659, 1.4412, 0.038269], [2.92, 1.5012, 0.039796]];
const TAU_LARGE_P: [[f64; 4]; 2] = [
    [1.7339, 0.93202, -0.12745, -0.010368],
    [2.1945, 0.64695, -0.29198, -0.042377],
];

// MacKinnon (2010) critical values: c0 + c1/T + c2/T^2 + c3/T^3 at 1%, 5%, 10%.
const TAU_CRIT: [[[f64; 4]; 3]; 2] = [
    [
        [-3.43035, -6.5393, -16.786, -79.433],
        [-2.86154, -2.8903, -4.234, -40.040],
        [-2.56677, -1.5384, -2.809, 0.0],
    ],
    [
        [-3.89644, -10.9519, -33.527, 0.0],
        [-3.33613, -6.1101, -6.823, 0.0],
        [-3.04445, -4.2412, -2.720, 0.0],
    ],
];

fn check_vars(n_vars: usize) -> Result<usize, AnalyticsError> {
    match n_vars {
        1 | 2 => Ok(n_vars - 1),
        _ => Err(AnalyticsError::InvalidParameter(format!(
            "no MacKinnon surface for {} variables",
            n_vars
        ))),
    }
}

fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Approximate p-value of a Dickey-Fuller statistic for `n_vars` series.
pub fn mackinnon_p(statistic: f64, n_vars: usize) -> Result<f64, AnalyticsError> {
    let i = check_vars(n_vars)?;
    if statistic > TAU_MAX[i] {
        return Ok(1.0);
    }
    if statistic < TAU_MIN[i] {
        return Ok(0.0);
    }
    let value = if statistic <= TAU_STAR[i] {
        polyval(&TAU_SMALL_P[i], statistic)
    } else {
        polyval(&TAU_LARGE_P[i], statistic)
    };
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| AnalyticsError::InternalError(e.to_string()))?;
    Ok(normal.cdf(value))
}

/// Finite-sample critical values for a regression with `nobs` observations.
pub fn mackinnon_crit(n_vars: usize, nobs: usize) -> Result<CriticalValues, AnalyticsError> {
    let i = check_vars(n_vars)?;
    if nobs == 0 {
        return Err(AnalyticsError::NotEnoughData("zero observations".into()));
    }
    let inv = 1.0 / nobs as f64;
    let level = |row: &[f64; 4]| polyval(row, inv);
    Ok(CriticalValues {
        one_pct: level(&TAU_CRIT[i][0]),
        five_pct: level(&TAU_CRIT[i][1]),
        ten_pct: level(&TAU_CRIT[i][2]),
    })
}
