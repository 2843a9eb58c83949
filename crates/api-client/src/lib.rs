//! # Market Data Client
//!
//! Retrieves daily closing prices and assembles them into a date-aligned
//! `PriceTable`. The `MarketDataProvider` trait is the seam between the
//! statistics/backtest code and the network; `YahooClient` is the live
//! implementation.

use crate::responses::parse_chart;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use configuration::ProviderConfig;
use core_types::{AlignmentPolicy, PriceSeries, PriceTable};
use futures::future::join_all;
use std::time::Duration;

pub mod error;
mod responses;

// --- Public API ---
pub use error::DataRetrievalError;

/// The abstract interface for a source of historical daily closes.
/// Allows the live client to be swapped for a fixture in tests.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches daily closes for one instrument over `[start, end)`.
    async fn fetch_closes(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataRetrievalError>;
}

/// A concrete implementation of `MarketDataProvider` backed by Yahoo Finance.
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, DataRetrievalError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, instrument: &str) -> String {
        format!("{}/{}", self.base_url, instrument)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_closes(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataRetrievalError> {
        let period1 = unix_seconds(start).to_string();
        let period2 = unix_seconds(end).to_string();
        tracing::debug!(instrument, %start, %end, "Requesting daily closes");

        let response = self
            .client
            .get(self.chart_url(instrument))
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        match parse_chart(instrument, &text) {
            Ok(series) => {
                tracing::info!(instrument, bars = series.points.len(), "Fetched daily closes");
                Ok(series)
            }
            // Yahoo explains most failures in the body; keep that when it parses.
            Err(e @ DataRetrievalError::Provider { .. }) => Err(e),
            Err(_) if !status.is_success() => Err(DataRetrievalError::Status {
                instrument: instrument.to_string(),
                status: status.as_u16(),
            }),
            Err(e) => Err(e),
        }
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Fetches every instrument concurrently and aligns them on one date index.
///
/// Any single failure fails the whole request; no partial table is returned.
pub async fn fetch_price_table(
    provider: &dyn MarketDataProvider,
    instruments: &[String],
    start: NaiveDate,
    end: NaiveDate,
    policy: AlignmentPolicy,
) -> Result<PriceTable, DataRetrievalError> {
    if start >= end {
        return Err(DataRetrievalError::InvalidData(format!(
            "empty date range {} .. {}",
            start, end
        )));
    }

    let tasks = instruments
        .iter()
        .map(|instrument| provider.fetch_closes(instrument, start, end));
    let series = join_all(tasks)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let table = PriceTable::align(series, policy)?;
    tracing::info!(
        rows = table.len(),
        instruments = table.instruments().len(),
        first = ?table.dates().first(),
        last = ?table.dates().last(),
        "Price table ready"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::CoreError;
    use std::collections::HashMap;

    /// Serves canned series keyed by instrument.
    struct FixtureProvider {
        series: HashMap<String, Vec<(NaiveDate, f64)>>,
    }

    #[async_trait]
    impl MarketDataProvider for FixtureProvider {
        async fn fetch_closes(
            &self,
            instrument: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<PriceSeries, DataRetrievalError> {
            let points = self
                .series
                .get(instrument)
                .ok_or_else(|| DataRetrievalError::NoData(instrument.to_string()))?
                .iter()
                .filter(|(d, _)| *d >= start && *d < end)
                .copied()
                .collect();
            Ok(PriceSeries::new(instrument, points))
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn fixture() -> FixtureProvider {
        let mut series = HashMap::new();
        series.insert(
            "AUD=X".to_string(),
            vec![(d(1), 1.50), (d(4), 1.52), (d(5), 1.53)],
        );
        series.insert(
            "NZD=X".to_string(),
            vec![(d(1), 1.62), (d(5), 1.64), (d(6), 1.65)],
        );
        FixtureProvider { series }
    }

    #[tokio::test]
    async fn aligns_fetched_series_in_request_order() {
        let provider = fixture();
        let instruments = vec!["NZD=X".to_string(), "AUD=X".to_string()];

        let table = fetch_price_table(&provider, &instruments, d(1), d(10), AlignmentPolicy::Intersection)
            .await
            .unwrap();

        assert_eq!(table.instruments(), instruments.as_slice());
        assert_eq!(table.dates(), &[d(1), d(5)]);
        assert_eq!(table.column("AUD=X").unwrap(), &[1.50, 1.53]);
    }

    #[tokio::test]
    async fn one_failing_instrument_fails_the_request() {
        let provider = fixture();
        let instruments = vec!["AUD=X".to_string(), "GBP=X".to_string()];

        let result =
            fetch_price_table(&provider, &instruments, d(1), d(10), AlignmentPolicy::Intersection).await;

        assert!(matches!(result, Err(DataRetrievalError::NoData(name)) if name == "GBP=X"));
    }

    #[tokio::test]
    async fn window_without_data_is_an_alignment_error() {
        let provider = fixture();
        let instruments = vec!["AUD=X".to_string()];

        let result =
            fetch_price_table(&provider, &instruments, d(2), d(3), AlignmentPolicy::ForwardFill).await;

        assert!(matches!(
            result,
            Err(DataRetrievalError::Alignment(CoreError::EmptySeries(_)))
        ));
    }

    #[tokio::test]
    async fn inverted_range_is_rejected_before_any_request() {
        let provider = fixture();
        let result = fetch_price_table(&provider, &[], d(5), d(1), AlignmentPolicy::Intersection).await;
        assert!(matches!(result, Err(DataRetrievalError::InvalidData(_))));
    }

    #[test]
    fn builds_chart_urls_from_config() {
        let config = ProviderConfig {
            base_url: "https://example.test/chart/".to_string(),
            ..ProviderConfig::default()
        };
        let client = YahooClient::new(&config).unwrap();
        assert_eq!(client.chart_url("EUR=X"), "https://example.test/chart/EUR=X");
        assert_eq!(unix_seconds(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 1704067200);
    }
}
