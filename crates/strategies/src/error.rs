use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Lookback window for row {index} ({date}) has zero variance")]
    DegenerateWindow { index: usize, date: NaiveDate },

    #[error("Scan needs {required} rows but only {available} are available")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Instrument '{0}' is not in the price table")]
    UnknownInstrument(String),
}
