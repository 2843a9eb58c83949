use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Instrument '{0}' is not present in the price table")]
    UnknownInstrument(String),

    #[error("No price observations for instrument '{0}'")]
    EmptySeries(String),

    #[error("Invalid price table: {0}")]
    InvalidShape(String),

    #[error("The requested instruments share no trading dates")]
    NoOverlap,
}
