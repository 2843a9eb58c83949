use chrono::NaiveDate;

/// Command-line overrides for the configured history window.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RangeOverride {
    /// Override `data.start_date` (format: YYYY-MM-DD).
    #[arg(long, global = true)]
    pub start: Option<NaiveDate>,

    /// Override `data.end_date` (format: YYYY-MM-DD).
    #[arg(long, global = true)]
    pub end: Option<NaiveDate>,
}
