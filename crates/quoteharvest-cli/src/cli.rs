//! CLI argument definitions for quoteharvest.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `collect` | Scrape quote pages and write a raw CSV |
//! | `process` | Clean, impute and derive features from a raw CSV |
//! | `run` | `collect` followed by `process` |
//! | `summary` | Per-symbol moves and aggregate stats of a processed CSV |
//! | `quality` | Completeness report for any dataset CSV |
//! | `preview` | First rows of a dataset CSV |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--config` | none | JSON config file |
//! | `--output-dir` | `data` | Directory for written CSV files |
//! | `--timeout-ms` | `10000` | Per-request timeout |
//! | `--log-level` | `info` | Log filter when `RUST_LOG` is unset |
//!
//! # Examples
//!
//! ```bash
//! quoteharvest collect AAPL MSFT
//! quoteharvest process data/raw_stock_data_20240301_143005.csv --pretty
//! quoteharvest run --min-delay-ms 500 --max-delay-ms 1500
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Market-quote page harvester.
///
/// Collects quote pages for a list of tickers, extracts their fields and
/// produces analysis-ready CSV datasets.
#[derive(Debug, Parser)]
#[command(
    name = "quoteharvest",
    author,
    version,
    about = "Market-quote page harvester",
    long_about = "quoteharvest scrapes per-symbol quote pages, normalizes the extracted \
fields and writes raw and processed CSV datasets.\n\
\n\
Results are printed as JSON on stdout; logs go to stderr.\n\
\n\
Use 'quoteharvest <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// JSON config file. Flags below override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for written CSV files.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Quote site base URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Attempts per symbol, including the first.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Lower bound of the random delay between symbols.
    #[arg(long, global = true)]
    pub min_delay_ms: Option<u64>,

    /// Upper bound of the random delay between symbols.
    #[arg(long, global = true)]
    pub max_delay_ms: Option<u64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape quote pages and write a raw dataset.
    ///
    /// # Examples
    ///
    ///   quoteharvest collect
    ///   quoteharvest collect AAPL MSFT NVDA
    Collect(SymbolsArgs),

    /// Process a raw dataset file into a processed one.
    ///
    /// # Examples
    ///
    ///   quoteharvest process data/raw_stock_data_20240301_143005.csv
    Process(FileArgs),

    /// Collect, then process the freshly written raw file.
    Run(SymbolsArgs),

    /// Summarize moves in a processed dataset.
    Summary(FileArgs),

    /// Report missing values and duplicates in a dataset file.
    Quality(FileArgs),

    /// Show the first rows of a dataset file.
    Preview(PreviewArgs),
}

/// Arguments for `collect` and `run`.
#[derive(Debug, Args)]
pub struct SymbolsArgs {
    /// Ticker symbols. Defaults to the configured symbol list.
    pub symbols: Vec<String>,
}

/// Arguments for commands reading one dataset file.
#[derive(Debug, Args)]
pub struct FileArgs {
    /// Path to a dataset CSV.
    pub path: PathBuf,
}

/// Arguments for the `preview` command.
#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Path to a dataset CSV.
    pub path: PathBuf,

    /// Number of rows to show.
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
}
