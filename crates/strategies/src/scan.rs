use crate::error::StrategyError;
use crate::zscore_reversion::{SignalState, WindowStats, ZScoreReversion};
use configuration::StrategyParams;
use core_types::{PriceTable, TradeSignal};
use std::iter::FusedIterator;

/// Lazily walks a rolling lookback window over the spread `B - A`.
///
/// At each step the window covers rows `[y - lookback, y)` and the
/// observation evaluated against it is row `y + 1`, for `y` from `lookback`
/// up to (excluding) `scan_end`. Only steps that produce an ENTER or EXIT are
/// yielded. After an error the scan is exhausted.
#[derive(Debug)]
pub struct SignalScan<'a> {
    table: &'a PriceTable,
    prices_a: &'a [f64],
    prices_b: &'a [f64],
    spread: Vec<f64>,
    lookback: usize,
    scan_end: usize,
    y: usize,
    machine: ZScoreReversion,
    failed: bool,
}

impl<'a> SignalScan<'a> {
    pub fn new(
        table: &'a PriceTable,
        instrument_a: &str,
        instrument_b: &str,
        params: &StrategyParams,
    ) -> Result<Self, StrategyError> {
        params
            .validate()
            .map_err(|e| StrategyError::InvalidParameters(e.to_string()))?;

        let prices_a = table
            .column(instrument_a)
            .map_err(|_| StrategyError::UnknownInstrument(instrument_a.to_string()))?;
        let prices_b = table
            .column(instrument_b)
            .map_err(|_| StrategyError::UnknownInstrument(instrument_b.to_string()))?;

        let available = table.len();
        let scan_end = match params.scan_end {
            Some(end) => end,
            None => available.saturating_sub(1),
        };
        // The last step evaluates row `scan_end`.
        let required = scan_end.max(params.lookback + 1) + 1;
        if available < required {
            return Err(StrategyError::InsufficientHistory {
                required,
                available,
            });
        }

        let spread = prices_b.iter().zip(prices_a).map(|(b, a)| b - a).collect();

        Ok(Self {
            table,
            prices_a,
            prices_b,
            spread,
            lookback: params.lookback,
            scan_end,
            y: params.lookback,
            machine: ZScoreReversion::new(params.entry_threshold),
            failed: false,
        })
    }

    /// Number of window positions the full scan evaluates.
    pub fn total_steps(&self) -> usize {
        self.scan_end - self.lookback
    }

    pub fn steps_completed(&self) -> usize {
        self.y - self.lookback
    }

    pub fn state(&self) -> SignalState {
        self.machine.state()
    }

    /// Evaluates the next window position.
    ///
    /// Returns `None` once the scan is finished or has failed, and
    /// `Some(Ok(None))` for a step that produced no signal.
    pub fn step(&mut self) -> Option<Result<Option<TradeSignal>, StrategyError>> {
        if self.failed || self.y >= self.scan_end {
            return None;
        }
        let y = self.y;
        let current = y + 1;
        let date = self.table.dates()[current];

        let Some(stats) = WindowStats::from_window(&self.spread[y - self.lookback..y]) else {
            self.failed = true;
            tracing::warn!(index = current, %date, "Degenerate lookback window");
            return Some(Err(StrategyError::DegenerateWindow {
                index: current,
                date,
            }));
        };
        self.y += 1;

        let z_score = stats.z_score(self.spread[current]);
        let signal = self.machine.evaluate(z_score).map(|kind| {
            tracing::debug!(index = current, %date, z_score, ?kind, "Spread signal");
            TradeSignal {
                kind,
                date,
                index: current,
                price_a: self.prices_a[current],
                price_b: self.prices_b[current],
                z_score,
            }
        });
        Some(Ok(signal))
    }
}

impl Iterator for SignalScan<'_> {
    type Item = Result<TradeSignal, StrategyError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step()? {
                Ok(Some(signal)) => return Some(Ok(signal)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl FusedIterator for SignalScan<'_> {}
