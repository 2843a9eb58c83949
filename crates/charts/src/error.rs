use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Could not create chart directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to draw {path}: {message}")]
    Drawing { path: PathBuf, message: String },

    #[error("Nothing to plot: {0}")]
    EmptySeries(String),

    #[error("Dates and values differ in length: {0} vs {1}")]
    LengthMismatch(usize, usize),
}
