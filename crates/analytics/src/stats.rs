//! Descriptive statistics over plain `f64` slices.

use crate::error::AnalyticsError;

pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return f64::NAN;
    }
    let m = mean(data);
    let ss: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (data.len() - 1) as f64).sqrt()
}

/// True when every value is identical, so no spread statistic is defined.
pub fn is_constant(data: &[f64]) -> bool {
    data.windows(2).all(|w| w[0] == w[1])
}

/// Pearson correlation. `NaN` when either input has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, AnalyticsError> {
    if x.len() != y.len() {
        return Err(AnalyticsError::LengthMismatch(x.len(), y.len()));
    }
    if x.len() < 2 {
        return Err(AnalyticsError::NotEnoughData(
            "correlation needs at least two observations".to_string(),
        ));
    }

    let mx = mean(x);
    let my = mean(y);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Ok(f64::NAN);
    }
    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Full Pearson matrix over `columns`.
///
/// The diagonal is exactly 1.0 and the lower triangle mirrors the upper one,
/// so the result is symmetric bit for bit.
pub fn correlation_matrix(columns: &[&[f64]]) -> Result<Vec<Vec<f64>>, AnalyticsError> {
    let k = columns.len();
    let mut matrix = vec![vec![1.0; k]; k];
    for i in 0..k {
        for j in (i + 1)..k {
            let r = pearson(columns[i], columns[j])?;
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    Ok(matrix)
}

/// Standardises the whole series against its own mean and sample standard deviation.
pub fn z_scores(data: &[f64]) -> Result<Vec<f64>, AnalyticsError> {
    if data.len() < 2 {
        return Err(AnalyticsError::NotEnoughData(
            "z-scores need at least two observations".to_string(),
        ));
    }
    if is_constant(data) {
        return Err(AnalyticsError::DegenerateSeries("spread".to_string()));
    }
    let m = mean(data);
    let s = std_dev(data);
    Ok(data.iter().map(|x| (x - m) / s).collect())
}
