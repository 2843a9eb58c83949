use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::RangeOverride;
pub use error::ConfigError;
pub use logging::init_logging;
pub use settings::{
    AnalysisConfig, ChartConfig, Config, DataConfig, LoggingConfig, PairConfig, ProviderConfig,
    StrategyParams,
};

/// Environment variables with this prefix override file values,
/// e.g. `FXPAIRS__STRATEGY__LOOKBACK=1260`.
const ENV_PREFIX: &str = "FXPAIRS";

/// Loads and validates the application configuration from a TOML file.
///
/// Values are layered: built-in defaults, then the file, then `FXPAIRS__*`
/// environment variables.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Parses configuration from an in-memory TOML document.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
