use crate::cointegration::CointegrationResult;
use crate::stationarity::AdfResult;
use serde::Serialize;

/// Correlation and spread-stationarity grids over a set of instruments.
///
/// Both matrices are indexed in the order of `instruments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossPairReport {
    pub instruments: Vec<String>,
    pub correlation: Vec<Vec<f64>>,
    /// ADF p-value of `x - y` at `[x][y]`; the diagonal is fixed at 0.
    pub spread_p_values: Vec<Vec<f64>>,
    /// Daily return moments, one entry per instrument.
    pub returns: Vec<ReturnStats>,
}

/// Mean and sample standard deviation of an instrument's simple daily returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStats {
    pub instrument: String,
    pub mean: f64,
    pub std: f64,
}

impl CrossPairReport {
    fn position(&self, instrument: &str) -> Option<usize> {
        self.instruments.iter().position(|i| i == instrument)
    }

    pub fn correlation(&self, x: &str, y: &str) -> Option<f64> {
        Some(self.correlation[self.position(x)?][self.position(y)?])
    }

    pub fn spread_p_value(&self, x: &str, y: &str) -> Option<f64> {
        Some(self.spread_p_values[self.position(x)?][self.position(y)?])
    }

    /// Every ordered `(x, y, p)` triple, row by row.
    pub fn ordered_pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.instruments.iter().enumerate().flat_map(move |(i, x)| {
            self.instruments
                .iter()
                .enumerate()
                .map(move |(j, y)| (x.as_str(), y.as_str(), self.spread_p_values[i][j]))
        })
    }
}

/// Deep-dive statistics for a single pair. The spread is `B - A`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairReport {
    pub instrument_a: String,
    pub instrument_b: String,
    pub engle_granger: CointegrationResult,
    pub spread_adf: AdfResult,
    /// ADF on `B / A`, when requested.
    pub ratio_adf: Option<AdfResult>,
    pub spread: Vec<f64>,
    pub spread_mean: f64,
    pub spread_std: f64,
    /// Spread standardised over its entire history.
    pub z_scores: Vec<f64>,
    pub half_life: Option<f64>,
}
