use crate::error::BacktestError;
use configuration::StrategyParams;
use core_types::{PriceTable, TradeSignal};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use strategies::{SignalScan, SignalState};

pub mod error;

/// Summary of one spread backtest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub instrument_a: String,
    pub instrument_b: String,
    /// Every ENTER and EXIT, in order.
    pub signals: Vec<TradeSignal>,
    /// Window positions evaluated.
    pub steps: usize,
    /// Completed ENTER/EXIT pairs.
    pub round_trips: usize,
    /// Still `Holding` when the scan ended with an open position.
    pub final_state: SignalState,
}

impl BacktestReport {
    /// The entry of the position left open at the end of the scan, if any.
    pub fn open_entry(&self) -> Option<&TradeSignal> {
        match self.final_state {
            SignalState::Holding(_) => self.signals.iter().rev().find(|s| s.is_entry()),
            SignalState::Flat => None,
        }
    }
}

/// Runs the z-score strategy over a price table.
pub struct Backtester {
    instrument_a: String,
    instrument_b: String,
    params: StrategyParams,
    show_progress: bool,
}

impl Backtester {
    pub fn new(instrument_a: String, instrument_b: String, params: StrategyParams) -> Self {
        Self {
            instrument_a,
            instrument_b,
            params,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Lazy access to the signals, for callers that render as they go.
    pub fn scan<'a>(&self, table: &'a PriceTable) -> Result<SignalScan<'a>, BacktestError> {
        Ok(SignalScan::new(
            table,
            &self.instrument_a,
            &self.instrument_b,
            &self.params,
        )?)
    }

    /// Drives the scan to completion and collects the signals.
    pub fn run(&self, table: &PriceTable) -> Result<BacktestReport, BacktestError> {
        let mut scan = self.scan(table)?;
        let total = scan.total_steps();

        let progress_bar = if self.show_progress {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );

        tracing::info!(
            a = %self.instrument_a,
            b = %self.instrument_b,
            lookback = self.params.lookback,
            steps = total,
            "Starting spread backtest"
        );

        let mut signals = Vec::new();
        let mut round_trips = 0;
        while let Some(step) = scan.step() {
            progress_bar.set_position(scan.steps_completed() as u64);
            let signal = match step {
                Ok(Some(signal)) => signal,
                Ok(None) => continue,
                Err(e) => {
                    progress_bar.abandon();
                    return Err(e.into());
                }
            };
            if signal.is_exit() {
                round_trips += 1;
            }
            signals.push(signal);
        }
        progress_bar.finish_and_clear();

        let report = BacktestReport {
            instrument_a: self.instrument_a.clone(),
            instrument_b: self.instrument_b.clone(),
            signals,
            steps: scan.steps_completed(),
            round_trips,
            final_state: scan.state(),
        };

        tracing::info!(
            signals = report.signals.len(),
            round_trips = report.round_trips,
            "Backtest complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use core_types::{Direction, SignalKind};
    use strategies::StrategyError;

    fn table(spread: &[f64]) -> PriceTable {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = (0..spread.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        let a = vec![1.0; spread.len()];
        let b = spread.iter().map(|s| 1.0 + s).collect();
        PriceTable::new(dates, vec!["AUD=X".into(), "NZD=X".into()], vec![a, b]).unwrap()
    }

    fn backtester(scan_end: Option<usize>) -> Backtester {
        Backtester::new(
            "AUD=X".into(),
            "NZD=X".into(),
            StrategyParams {
                lookback: 4,
                scan_end,
                entry_threshold: 2.0,
            },
        )
        .with_progress(false)
    }

    #[test]
    fn round_trip_then_open_position() {
        // ENTER high at 5, EXIT at 6, ENTER low at 9 and still open at the end.
        let spread = [0.0, 1.0, 0.0, 1.0, 0.5, 3.0, 0.4, 0.5, 0.45, -3.0];
        let report = backtester(None).run(&table(&spread)).unwrap();

        let kinds: Vec<SignalKind> = report.signals.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SignalKind::Enter(Direction::LongBShortA),
                SignalKind::Exit,
                SignalKind::Enter(Direction::LongAShortB),
            ]
        );
        assert_eq!(report.steps, 5);
        assert_eq!(report.round_trips, 1);
        assert!(matches!(report.final_state, SignalState::Holding(z) if z < 0.0));
        assert_eq!(report.open_entry().map(|s| s.index), Some(9));
    }

    #[test]
    fn quiet_spread_produces_no_signals() {
        let spread = [0.0, 1.0, 0.0, 1.0, 0.5, 0.6, 0.4];
        let report = backtester(Some(6)).run(&table(&spread)).unwrap();
        assert!(report.signals.is_empty());
        assert_eq!(report.steps, 2);
        assert_eq!(report.final_state, SignalState::Flat);
        assert!(report.open_entry().is_none());
    }

    #[test]
    fn strategy_errors_are_propagated() {
        let err = backtester(None).run(&table(&[2.0; 8])).unwrap_err();
        assert!(matches!(
            err,
            BacktestError::Strategy(StrategyError::DegenerateWindow { index: 5, .. })
        ));
    }
}
