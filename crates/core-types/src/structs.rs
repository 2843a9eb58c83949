use crate::enums::{AlignmentPolicy, Direction};
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Daily closing prices for one instrument, as returned by a provider.
///
/// Points need not be sorted or unique; alignment takes care of both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub instrument: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
    pub fn new(instrument: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            instrument: instrument.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Short display name of a ticker: `"AUD=X"` becomes `"AUD"`.
pub fn instrument_label(ticker: &str) -> &str {
    ticker.split('=').next().unwrap_or(ticker)
}

/// Closing prices for several instruments on one shared, ascending date index.
///
/// Every column has exactly one value per date; there are no gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    instruments: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl PriceTable {
    /// Builds a table from already-aligned columns.
    pub fn new(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, CoreError> {
        if instruments.len() != columns.len() {
            return Err(CoreError::InvalidShape(format!(
                "{} instruments but {} columns",
                instruments.len(),
                columns.len()
            )));
        }
        let mut seen = HashSet::new();
        for name in &instruments {
            if !seen.insert(name.as_str()) {
                return Err(CoreError::InvalidShape(format!(
                    "duplicate instrument '{}'",
                    name
                )));
            }
        }
        if let Some((name, col)) = instruments
            .iter()
            .zip(&columns)
            .find(|(_, col)| col.len() != dates.len())
        {
            return Err(CoreError::InvalidShape(format!(
                "column '{}' has {} rows, index has {}",
                name,
                col.len(),
                dates.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CoreError::InvalidShape(
                "dates must be strictly ascending".to_string(),
            ));
        }

        Ok(Self {
            dates,
            instruments,
            columns,
        })
    }

    /// Joins independently fetched series onto one date index.
    ///
    /// Column order follows the order of `series`. When a series carries the
    /// same date twice, the later point wins.
    pub fn align(series: Vec<PriceSeries>, policy: AlignmentPolicy) -> Result<Self, CoreError> {
        if series.is_empty() {
            return Err(CoreError::InvalidShape("no instruments requested".to_string()));
        }

        let mut instruments = Vec::with_capacity(series.len());
        let mut maps: Vec<BTreeMap<NaiveDate, f64>> = Vec::with_capacity(series.len());
        for s in series {
            if s.is_empty() {
                return Err(CoreError::EmptySeries(s.instrument));
            }
            maps.push(s.points.into_iter().collect());
            instruments.push(s.instrument);
        }

        let (dates, columns) = match policy {
            AlignmentPolicy::Intersection => intersect(&maps),
            AlignmentPolicy::ForwardFill => forward_fill(&maps),
        };

        if dates.is_empty() {
            return Err(CoreError::NoOverlap);
        }
        tracing::debug!(
            rows = dates.len(),
            instruments = instruments.len(),
            ?policy,
            "Aligned price table"
        );

        Self::new(dates, instruments, columns)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Returns the closing prices of one instrument.
    pub fn column(&self, instrument: &str) -> Result<&[f64], CoreError> {
        self.instruments
            .iter()
            .position(|name| name == instrument)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| CoreError::UnknownInstrument(instrument.to_string()))
    }

    /// Pointwise `minuend - subtrahend` over the whole history.
    pub fn spread(&self, minuend: &str, subtrahend: &str) -> Result<Vec<f64>, CoreError> {
        let m = self.column(minuend)?;
        let s = self.column(subtrahend)?;
        Ok(m.iter().zip(s).map(|(a, b)| a - b).collect())
    }

    /// Pointwise `numerator / denominator` over the whole history.
    pub fn ratio(&self, numerator: &str, denominator: &str) -> Result<Vec<f64>, CoreError> {
        let n = self.column(numerator)?;
        let d = self.column(denominator)?;
        Ok(n.iter().zip(d).map(|(a, b)| a / b).collect())
    }

    /// One-day forward simple returns, `p[t+1] / p[t] - 1`, with the last row
    /// set to zero so the result lines up with the date index.
    pub fn returns(&self, instrument: &str) -> Result<Vec<f64>, CoreError> {
        let prices = self.column(instrument)?;
        let mut out: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        if !prices.is_empty() {
            out.push(0.0);
        }
        Ok(out)
    }
}

fn intersect(maps: &[BTreeMap<NaiveDate, f64>]) -> (Vec<NaiveDate>, Vec<Vec<f64>>) {
    let mut dates = Vec::new();
    let mut columns = vec![Vec::new(); maps.len()];

    for (date, _) in &maps[0] {
        if maps.iter().all(|m| m.contains_key(date)) {
            dates.push(*date);
            for (col, m) in columns.iter_mut().zip(maps) {
                col.push(m[date]);
            }
        }
    }

    (dates, columns)
}

fn forward_fill(maps: &[BTreeMap<NaiveDate, f64>]) -> (Vec<NaiveDate>, Vec<Vec<f64>>) {
    let union: BTreeSet<NaiveDate> = maps.iter().flat_map(|m| m.keys().copied()).collect();
    let mut last: Vec<Option<f64>> = vec![None; maps.len()];
    let mut dates = Vec::new();
    let mut columns = vec![Vec::new(); maps.len()];

    for date in union {
        for (slot, m) in last.iter_mut().zip(maps) {
            if let Some(v) = m.get(&date) {
                *slot = Some(*v);
            }
        }
        if last.iter().all(Option::is_some) {
            dates.push(date);
            for (col, v) in columns.iter_mut().zip(&last) {
                col.extend(*v);
            }
        }
    }

    (dates, columns)
}

/// What a trade signal asks for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SignalKind {
    Enter(Direction),
    Exit,
}

/// A structured ENTER/EXIT annotation produced by the spread backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub kind: SignalKind,
    pub date: NaiveDate,
    /// Row of the price table the signal was generated on.
    pub index: usize,
    pub price_a: f64,
    pub price_b: f64,
    pub z_score: f64,
}

impl TradeSignal {
    pub fn is_entry(&self) -> bool {
        matches!(self.kind, SignalKind::Enter(_))
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.kind, SignalKind::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_strip_the_quote_suffix() {
        assert_eq!(instrument_label("AUD=X"), "AUD");
        assert_eq!(instrument_label("GC=F"), "GC");
        assert_eq!(instrument_label("MSFT"), "MSFT");
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn intersection_keeps_common_dates_only() {
        let a = PriceSeries::new("A", vec![(d(1), 1.0), (d(2), 2.0), (d(3), 3.0)]);
        let b = PriceSeries::new("B", vec![(d(3), 30.0), (d(1), 10.0)]);

        let table = PriceTable::align(vec![a, b], AlignmentPolicy::Intersection).unwrap();

        assert_eq!(table.dates(), &[d(1), d(3)]);
        assert_eq!(table.column("A").unwrap(), &[1.0, 3.0]);
        assert_eq!(table.column("B").unwrap(), &[10.0, 30.0]);
    }

    #[test]
    fn forward_fill_carries_last_close_and_drops_leading_rows() {
        let a = PriceSeries::new("A", vec![(d(1), 1.0), (d(2), 2.0), (d(4), 4.0)]);
        let b = PriceSeries::new("B", vec![(d(2), 20.0), (d(3), 30.0)]);

        let table = PriceTable::align(vec![a, b], AlignmentPolicy::ForwardFill).unwrap();

        assert_eq!(table.dates(), &[d(2), d(3), d(4)]);
        assert_eq!(table.column("A").unwrap(), &[2.0, 2.0, 4.0]);
        assert_eq!(table.column("B").unwrap(), &[20.0, 30.0, 30.0]);
    }

    #[test]
    fn duplicate_dates_keep_the_later_point() {
        let a = PriceSeries::new("A", vec![(d(1), 1.0), (d(1), 1.5)]);
        let table = PriceTable::align(vec![a], AlignmentPolicy::Intersection).unwrap();
        assert_eq!(table.column("A").unwrap(), &[1.5]);
    }

    #[test]
    fn disjoint_series_have_no_overlap() {
        let a = PriceSeries::new("A", vec![(d(1), 1.0)]);
        let b = PriceSeries::new("B", vec![(d(2), 2.0)]);
        assert_eq!(
            PriceTable::align(vec![a, b], AlignmentPolicy::Intersection),
            Err(CoreError::NoOverlap)
        );
    }

    #[test]
    fn empty_series_is_rejected_by_name() {
        let a = PriceSeries::new("A", vec![(d(1), 1.0)]);
        let b = PriceSeries::new("B", vec![]);
        assert_eq!(
            PriceTable::align(vec![a, b], AlignmentPolicy::ForwardFill),
            Err(CoreError::EmptySeries("B".to_string()))
        );
    }

    #[test]
    fn new_rejects_ragged_and_unsorted_input() {
        let ragged = PriceTable::new(
            vec![d(1), d(2)],
            vec!["A".to_string()],
            vec![vec![1.0]],
        );
        assert!(matches!(ragged, Err(CoreError::InvalidShape(_))));

        let unsorted = PriceTable::new(
            vec![d(2), d(1)],
            vec!["A".to_string()],
            vec![vec![1.0, 2.0]],
        );
        assert!(matches!(unsorted, Err(CoreError::InvalidShape(_))));
    }

    #[test]
    fn spread_ratio_and_returns() {
        let table = PriceTable::new(
            vec![d(1), d(2), d(3)],
            vec!["A".to_string(), "B".to_string()],
            vec![vec![1.0, 2.0, 4.0], vec![3.0, 3.0, 6.0]],
        )
        .unwrap();

        assert_eq!(table.spread("B", "A").unwrap(), vec![2.0, 1.0, 2.0]);
        assert_eq!(table.ratio("B", "A").unwrap(), vec![3.0, 1.5, 1.5]);
        assert_eq!(table.returns("A").unwrap(), vec![1.0, 1.0, 0.0]);
        assert_eq!(
            table.spread("B", "C"),
            Err(CoreError::UnknownInstrument("C".to_string()))
        );
    }

    #[test]
    fn signal_accessors() {
        let enter = TradeSignal {
            kind: SignalKind::Enter(Direction::LongBShortA),
            date: d(5),
            index: 4,
            price_a: 0.65,
            price_b: 0.61,
            z_score: 2.1,
        };
        assert!(enter.is_entry());
        assert!(!enter.is_exit());
        assert_eq!(Direction::LongAShortB.to_string(), "LONG A, SHORT B");
    }
}
