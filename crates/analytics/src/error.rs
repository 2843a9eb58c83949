use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    #[error("Regression design matrix is singular: {0}")]
    SingularMatrix(String),

    #[error("Series lengths differ: {0} vs {1}")]
    LengthMismatch(usize, usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Price table error: {0}")]
    Table(#[from] CoreError),

    #[error("An unexpected error occurred during analytics calculation: {0}")]
    InternalError(String),
}
