use crate::error::DataRetrievalError;
use chrono::{DateTime, NaiveDate};
use core_types::PriceSeries;
use serde::Deserialize;

// Yahoo's v8 chart payload. Only the fields needed for daily closes are mapped.

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    /// Seconds east of UTC of the exchange the bars are stamped in.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Converts a chart payload into a daily close series for `instrument`.
///
/// Bars with a `null` close are skipped.
pub(crate) fn parse_chart(instrument: &str, json: &str) -> Result<PriceSeries, DataRetrievalError> {
    let response: ChartResponse = serde_json::from_str(json)
        .map_err(|e| DataRetrievalError::Deserialization(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(DataRetrievalError::Provider {
            instrument: instrument.to_string(),
            code: error.code,
            description: error.description,
        });
    }

    let data = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| DataRetrievalError::NoData(instrument.to_string()))?;

    let closes = data
        .indicators
        .quote
        .first()
        .map(|q| q.close.as_slice())
        .unwrap_or_default();

    let mut points = Vec::with_capacity(data.timestamp.len());
    for (ts, close) in data.timestamp.iter().zip(closes) {
        let Some(close) = close else { continue };
        if !close.is_finite() {
            return Err(DataRetrievalError::InvalidData(format!(
                "non-finite close {} for '{}' at {}",
                close, instrument, ts
            )));
        }
        points.push((bar_date(*ts, data.meta.gmtoffset)?, *close));
    }

    if points.is_empty() {
        return Err(DataRetrievalError::NoData(instrument.to_string()));
    }

    Ok(PriceSeries::new(instrument, points))
}

/// Calendar date of a bar, in the exchange's local time.
fn bar_date(timestamp: i64, gmtoffset: i64) -> Result<NaiveDate, DataRetrievalError> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| DataRetrievalError::InvalidData(format!("invalid timestamp: {}", timestamp)))
}
