use analytics::{AnalyticsEngine, CrossPairReport, PairReport};
use api_client::{fetch_price_table, MarketDataProvider, YahooClient};
use backtester::{BacktestReport, Backtester};
use charts::ChartRenderer;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use configuration::{init_logging, load_config, Config, RangeOverride};
use core_types::{instrument_label, Direction, PriceTable, SignalKind, TradeSignal};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// The main entry point for the FX pairs study.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    config.apply_range(cli.range.start, cli.range.end);
    config.validate()?;

    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_logging(&config.logging)?;
    tracing::debug!(config = ?config, path = %cli.config.display(), "Configuration loaded");

    let provider = YahooClient::new(&config.provider)?;

    // Execute the appropriate command
    match cli.command.unwrap_or(Commands::RunAll) {
        Commands::PairsInfo => handle_pairs_info(&config, &provider).await?,
        Commands::PairInfo => handle_pair_info(&config, &provider).await?,
        Commands::Backtest => handle_backtest(&config, &provider).await?,
        Commands::RunAll => {
            handle_pairs_info(&config, &provider).await?;
            handle_pair_info(&config, &provider).await?;
            handle_backtest(&config, &provider).await?;
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Statistical-arbitrage study of major FX pairs.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML settings file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(flatten)]
    range: RangeOverride,

    /// Runs every report when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Correlation matrix and spread stationarity p-values for all instruments.
    PairsInfo,
    /// Cointegration tests and spread charts for the configured pair.
    PairInfo,
    /// Rolling z-score backtest of the configured pair.
    Backtest,
    /// All of the above, in order.
    RunAll,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_pairs_info(config: &Config, provider: &dyn MarketDataProvider) -> anyhow::Result<()> {
    let table = download(config, provider, &config.data.instruments).await?;
    let report = AnalyticsEngine::new(config.analysis.max_lag).cross_pair_statistics(&table)?;

    println!("{}", correlation_table(&report));
    println!("{}", p_value_table(&report));
    println!("{}", returns_table(&report));
    for line in p_value_lines(&report) {
        println!("{}", line);
    }
    Ok(())
}

async fn handle_pair_info(config: &Config, provider: &dyn MarketDataProvider) -> anyhow::Result<()> {
    let (a, b) = (&config.pair.instrument_a, &config.pair.instrument_b);
    let table = download(config, provider, &[a.clone(), b.clone()]).await?;

    let report = AnalyticsEngine::new(config.analysis.max_lag)
        .with_ratio_test(config.analysis.ratio_adf)
        .pair_report(&table, a, b)?;
    for line in pair_lines(&report) {
        println!("{}", line);
    }

    let charts = ChartRenderer::new(&config.charts).render_pair(
        &report,
        table.dates(),
        config.strategy.entry_threshold,
    )?;
    println!("Spread chart: {}", charts.spread.display());
    println!("Z-score chart: {}", charts.z_score.display());
    Ok(())
}

async fn handle_backtest(config: &Config, provider: &dyn MarketDataProvider) -> anyhow::Result<()> {
    let (a, b) = (&config.pair.instrument_a, &config.pair.instrument_b);
    let table = download(config, provider, &[a.clone(), b.clone()]).await?;

    let report = Backtester::new(a.clone(), b.clone(), config.strategy.clone()).run(&table)?;
    for signal in &report.signals {
        println!("{}", render_signal(signal, a, b));
    }
    println!("{}", summary_line(&report));
    Ok(())
}

/// Fetches and aligns closes behind a spinner.
async fn download(
    config: &Config,
    provider: &dyn MarketDataProvider,
    instruments: &[String],
) -> anyhow::Result<PriceTable> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Fetching {}...", instruments.join(", ")));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = fetch_price_table(
        provider,
        instruments,
        config.data.start_date,
        config.data.end_date,
        config.data.alignment,
    )
    .await;
    spinner.finish_and_clear();

    Ok(result?)
}

// ==============================================================================
// Console Rendering
// ==============================================================================

/// Rounds to four decimals for display.
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn correlation_table(report: &CrossPairReport) -> Table {
    square_table(report, |i, j| format!("{:.6}", report.correlation[i][j]))
}

fn p_value_table(report: &CrossPairReport) -> Table {
    square_table(report, |i, j| {
        if i == j {
            "0".to_string()
        } else {
            format!("{:.6}", report.spread_p_values[i][j])
        }
    })
}

fn square_table(report: &CrossPairReport, cell: impl Fn(usize, usize) -> String) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut header = vec![String::new()];
    header.extend(report.instruments.iter().cloned());
    table.set_header(header);

    for (i, name) in report.instruments.iter().enumerate() {
        let mut row = vec![name.clone()];
        row.extend((0..report.instruments.len()).map(|j| cell(i, j)));
        table.add_row(row);
    }
    table
}

fn returns_table(report: &CrossPairReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Instrument", "Mean daily return", "Std daily return"]);
    for stats in &report.returns {
        table.add_row(vec![
            stats.instrument.clone(),
            format!("{:.6}", stats.mean),
            format!("{:.6}", stats.std),
        ]);
    }
    table
}

/// One `(x, y) p` line per ordered pair, diagonal printed as 0, with a blank
/// line closing each row instrument.
fn p_value_lines(report: &CrossPairReport) -> Vec<String> {
    let k = report.instruments.len();
    let mut lines = Vec::with_capacity(k * (k + 1));
    for (i, x) in report.instruments.iter().enumerate() {
        for (j, y) in report.instruments.iter().enumerate() {
            if i == j {
                lines.push(format!("({}, {}) 0", x, y));
            } else {
                lines.push(format!("({}, {}) {}", x, y, report.spread_p_values[i][j]));
            }
        }
        lines.push(String::new());
    }
    lines
}

fn pair_lines(report: &PairReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Engle-Granger co-integration test:  {}",
            report.engle_granger.p_value
        ),
        format!("ADF co-integration test (Spread):  {}", report.spread_adf.p_value),
    ];
    if let Some(ratio) = &report.ratio_adf {
        lines.push(format!("ADF co-integration test (Ratio):  {}", ratio.p_value));
    }
    lines.push(format!(
        "Hedge ratio: {}, intercept: {}",
        round4(report.engle_granger.hedge_ratio),
        round4(report.engle_granger.intercept)
    ));
    lines.push(match report.half_life {
        Some(days) => format!("Spread half-life: {} days", round4(days)),
        None => "Spread half-life: undefined (spread is not mean reverting)".to_string(),
    });
    lines
}

fn render_signal(signal: &TradeSignal, a: &str, b: &str) -> String {
    let (label_a, label_b) = (instrument_label(a), instrument_label(b));
    let body = format!(
        "Trade at: {}={}, {}={}, Date={} because z-score is: {}",
        label_a,
        round4(signal.price_a),
        label_b,
        round4(signal.price_b),
        signal.date,
        round4(signal.z_score)
    );
    match signal.kind {
        SignalKind::Enter(direction) => {
            let (long, short) = match direction {
                Direction::LongAShortB => (label_a, label_b),
                Direction::LongBShortA => (label_b, label_a),
            };
            format!("ENTER {}\n(LONG {}, SHORT {})", body, long, short)
        }
        SignalKind::Exit => format!("EXIT {}\n", body),
    }
}

fn summary_line(report: &BacktestReport) -> String {
    let open = match report.open_entry() {
        Some(entry) => format!("open since {}", entry.date),
        None => "flat".to_string(),
    };
    format!(
        "{} windows evaluated, {} round trips, position {}",
        report.steps, report.round_trips, open
    )
}
