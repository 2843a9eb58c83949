use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::AlignmentPolicy;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults reproducing the classic AUD/NZD study, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub pair: PairConfig,
    #[serde(default)]
    pub strategy: StrategyParams,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which instruments to download and over which period.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Tickers included in the cross-pair report (e.g., "EUR=X").
    pub instruments: Vec<String>,
    /// First day of the requested history (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the requested history (exclusive).
    pub end_date: NaiveDate,
    #[serde(default)]
    pub alignment: AlignmentPolicy,
}

/// Connection settings for the market-data provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

/// The two legs studied by the single-pair report and the backtest.
///
/// The spread is always `instrument_b - instrument_a`.
#[derive(Debug, Clone, Deserialize)]
pub struct PairConfig {
    pub instrument_a: String,
    pub instrument_b: String,
}

/// Parameters for the rolling z-score spread backtest.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyParams {
    /// Number of observations in the lookback window.
    /// 252 trading days per year * 6 years = 1512.
    pub lookback: usize,
    /// Exclusive bound on the window's end index. `None` scans to the last row.
    #[serde(default)]
    pub scan_end: Option<usize>,
    /// Absolute z-score at which a position is opened.
    pub entry_threshold: f64,
}

/// Knobs for the stationarity and cointegration tests.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Upper bound on the ADF lag order. `None` uses the Schwert rule.
    #[serde(default)]
    pub max_lag: Option<usize>,
    /// Also test the price ratio `B / A` for stationarity.
    pub ratio_adf: bool,
}

/// Where and how large the spread charts are drawn.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. "info" or "analytics=debug".
    pub filter: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            instruments: ["EUR=X", "GBP=X", "AUD=X", "NZD=X", "JPY=X", "CHF=X", "CAD=X"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            start_date: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            alignment: AlignmentPolicy::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            instrument_a: "AUD=X".to_string(),
            instrument_b: "NZD=X".to_string(),
        }
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            lookback: 1512,
            scan_end: None,
            entry_threshold: 2.0,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_lag: None,
            ratio_adf: true,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
            width: 1600,
            height: 1200,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.instruments.is_empty() {
            return Err(ConfigError::ValidationError(
                "data.instruments must name at least one instrument".to_string(),
            ));
        }
        if self.data.start_date >= self.data.end_date {
            return Err(ConfigError::ValidationError(format!(
                "data.start_date ({}) must be before data.end_date ({})",
                self.data.start_date, self.data.end_date
            )));
        }
        if self.pair.instrument_a == self.pair.instrument_b {
            return Err(ConfigError::ValidationError(
                "pair.instrument_a and pair.instrument_b must differ".to_string(),
            ));
        }
        self.strategy.validate()?;
        if self.charts.width == 0 || self.charts.height == 0 {
            return Err(ConfigError::ValidationError(
                "charts.width and charts.height must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Replaces the configured date range with any values given on the command line.
    pub fn apply_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        if let Some(start) = start {
            self.data.start_date = start;
        }
        if let Some(end) = end {
            self.data.end_date = end;
        }
    }
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback < 2 {
            return Err(ConfigError::ValidationError(
                "strategy.lookback must be at least 2".to_string(),
            ));
        }
        if !self.entry_threshold.is_finite() || self.entry_threshold <= 0.0 {
            return Err(ConfigError::ValidationError(
                "strategy.entry_threshold must be a positive number".to_string(),
            ));
        }
        if let Some(end) = self.scan_end {
            if end <= self.lookback {
                return Err(ConfigError::ValidationError(format!(
                    "strategy.scan_end ({}) must exceed strategy.lookback ({})",
                    end, self.lookback
                )));
            }
        }
        Ok(())
    }
}
