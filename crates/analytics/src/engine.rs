use crate::cointegration::{engle_granger, half_life};
use crate::error::AnalyticsError;
use crate::report::{CrossPairReport, PairReport, ReturnStats};
use crate::stationarity::adf_test;
use crate::stats::{correlation_matrix, mean, std_dev, z_scores};
use core_types::PriceTable;
use itertools::iproduct;

/// A stateless calculator producing the cross-pair and single-pair reports.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    max_lag: Option<usize>,
    ratio_test: bool,
}

impl AnalyticsEngine {
    /// `max_lag` overrides the automatic ADF lag bound.
    pub fn new(max_lag: Option<usize>) -> Self {
        Self {
            max_lag,
            ratio_test: false,
        }
    }

    /// Also run the ADF test on the price ratio in `pair_report`.
    pub fn with_ratio_test(mut self, enabled: bool) -> Self {
        self.ratio_test = enabled;
        self
    }

    /// Correlation matrix plus the ADF p-value of every ordered spread `x - y`.
    pub fn cross_pair_statistics(
        &self,
        table: &PriceTable,
    ) -> Result<CrossPairReport, AnalyticsError> {
        let instruments = table.instruments().to_vec();
        let columns = instruments
            .iter()
            .map(|name| table.column(name))
            .collect::<Result<Vec<_>, _>>()?;

        let correlation = correlation_matrix(&columns)?;

        let k = instruments.len();
        let mut spread_p_values = vec![vec![0.0; k]; k];
        for (i, j) in iproduct!(0..k, 0..k) {
            if i == j {
                continue;
            }
            let spread: Vec<f64> = columns[i]
                .iter()
                .zip(columns[j])
                .map(|(x, y)| x - y)
                .collect();
            spread_p_values[i][j] = adf_test(&spread, self.max_lag)?.p_value;
        }

        let returns = instruments
            .iter()
            .map(|name| {
                let daily = table.returns(name)?;
                // The trailing entry is padding, not an observed return.
                let observed = &daily[..daily.len().saturating_sub(1)];
                Ok(ReturnStats {
                    instrument: name.clone(),
                    mean: mean(observed),
                    std: std_dev(observed),
                })
            })
            .collect::<Result<Vec<_>, AnalyticsError>>()?;

        tracing::info!(instruments = k, rows = table.len(), "Cross-pair statistics computed");
        Ok(CrossPairReport {
            instruments,
            correlation,
            spread_p_values,
            returns,
        })
    }

    /// Cointegration and spread statistics for `a` and `b`.
    pub fn pair_report(
        &self,
        table: &PriceTable,
        a: &str,
        b: &str,
    ) -> Result<PairReport, AnalyticsError> {
        let prices_a = table.column(a)?;
        let prices_b = table.column(b)?;

        let engle_granger = engle_granger(prices_a, prices_b, self.max_lag)?;

        let spread = table.spread(b, a)?;
        let spread_adf = adf_test(&spread, self.max_lag)?;
        let ratio_adf = if self.ratio_test {
            Some(adf_test(&table.ratio(b, a)?, self.max_lag)?)
        } else {
            None
        };

        let z_scores = z_scores(&spread)?;
        let half_life = half_life(&spread)?;

        tracing::info!(
            a,
            b,
            engle_granger_p = engle_granger.p_value,
            spread_adf_p = spread_adf.p_value,
            "Pair report computed"
        );

        Ok(PairReport {
            instrument_a: a.to_string(),
            instrument_b: b.to_string(),
            engle_granger,
            spread_adf,
            ratio_adf,
            spread_mean: mean(&spread),
            spread_std: std_dev(&spread),
            spread,
            z_scores,
            half_life,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stationarity::tests::{noise, random_walk};
    use chrono::{Duration, NaiveDate};
    use core_types::{AlignmentPolicy, CoreError, PriceSeries};

    fn series(name: &str, values: Vec<f64>) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let points = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (start + Duration::days(i as i64), v))
            .collect();
        PriceSeries::new(name, points)
    }

    fn table() -> PriceTable {
        let base = random_walk(101, 400);
        let linked: Vec<f64> = base
            .iter()
            .zip(noise(103, 400))
            .map(|(b, e)| b + 3.0 + 0.2 * e)
            .collect();
        let other = random_walk(107, 400);
        PriceTable::align(
            vec![
                series("AUD=X", base),
                series("NZD=X", linked),
                series("CAD=X", other),
            ],
            AlignmentPolicy::Intersection,
        )
        .unwrap()
    }

    #[test]
    fn cross_pair_diagonal_and_symmetry() {
        let report = AnalyticsEngine::new(None).cross_pair_statistics(&table()).unwrap();
        assert_eq!(report.instruments.len(), 3);
        for i in 0..3 {
            assert_eq!(report.spread_p_values[i][i], 0.0);
            assert_eq!(report.correlation[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(
                    report.correlation[i][j].to_bits(),
                    report.correlation[j][i].to_bits()
                );
            }
        }
        assert_eq!(report.spread_p_value("AUD=X", "AUD=X"), Some(0.0));
        assert_eq!(report.ordered_pairs().count(), 9);
        assert!(report.spread_p_value("AUD=X", "NZD=X").unwrap() < 0.01);
        assert!(report.correlation("AUD=X", "GBP=X").is_none());
    }

    #[test]
    fn return_moments_skip_the_padding_row() {
        let table = table();
        let report = AnalyticsEngine::new(None).cross_pair_statistics(&table).unwrap();
        assert_eq!(report.returns.len(), 3);

        let prices = table.column("NZD=X").unwrap();
        let observed: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let nzd = &report.returns[1];
        assert_eq!(nzd.instrument, "NZD=X");
        assert!((nzd.mean - mean(&observed)).abs() < 1e-15);
        assert!((nzd.std - std_dev(&observed)).abs() < 1e-15);
    }

    #[test]
    fn cross_pair_is_idempotent() {
        let table = table();
        let engine = AnalyticsEngine::new(None);
        let first = engine.cross_pair_statistics(&table).unwrap();
        let second = engine.cross_pair_statistics(&table).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn pair_report_uses_b_minus_a() {
        let table = table();
        let report = AnalyticsEngine::new(None)
            .with_ratio_test(true)
            .pair_report(&table, "AUD=X", "NZD=X")
            .unwrap();

        let a = table.column("AUD=X").unwrap();
        let b = table.column("NZD=X").unwrap();
        assert_eq!(report.spread[0], b[0] - a[0]);
        assert_eq!(report.z_scores.len(), table.len());
        assert!(report.ratio_adf.is_some());
        assert!(mean(&report.z_scores).abs() < 1e-9);
        assert!(report.engle_granger.is_cointegrated(0.05));
    }

    #[test]
    fn unknown_instrument() {
        let err = AnalyticsEngine::new(None)
            .pair_report(&table(), "AUD=X", "JPY=X")
            .unwrap_err();
        assert_eq!(err, AnalyticsError::Table(CoreError::UnknownInstrument("JPY=X".into())));
    }
}
