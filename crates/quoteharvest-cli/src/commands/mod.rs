mod collect;
mod harvest;
mod preview;
mod process;
mod quality;
mod summary;

use std::sync::Arc;
use std::time::Instant;

use quoteharvest_core::{
    BatchCollector, CancelToken, HarvestConfig, Pipeline, ReqwestHttpClient, Symbol, TokioSleeper,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::{Metadata, RequestId};
use crate::output::Envelope;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let request_id = RequestId::new_v4();
    let started = Instant::now();
    info!(%request_id, command = command_name(&cli.command), "command started");

    let config = resolve_config(cli)?;
    let result = match &cli.command {
        Command::Collect(args) => collect::run(args, &config).await?,
        Command::Process(args) => process::run(args, &config)?,
        Command::Run(args) => harvest::run(args, &config).await?,
        Command::Summary(args) => summary::run(args)?,
        Command::Quality(args) => quality::run(args)?,
        Command::Preview(args) => preview::run(args)?,
    };

    let latency_ms = started.elapsed().as_millis() as u64;
    let mut meta = Metadata::new(request_id, command_name(&cli.command), latency_ms);
    for warning in result.warnings {
        meta.push_warning(warning);
    }

    Ok(Envelope {
        meta,
        data: result.data,
    })
}

const fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Collect(_) => "collect",
        Command::Process(_) => "process",
        Command::Run(_) => "run",
        Command::Summary(_) => "summary",
        Command::Quality(_) => "quality",
        Command::Preview(_) => "preview",
    }
}

/// Defaults, then the config file, then environment, then flags.
pub fn resolve_config(cli: &Cli) -> Result<HarvestConfig, CliError> {
    let config = match &cli.config {
        Some(path) => HarvestConfig::from_json_file(path)?,
        None => HarvestConfig::default(),
    };
    let mut config = config.with_env_overrides();

    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(min_delay_ms) = cli.min_delay_ms {
        config.min_delay_ms = min_delay_ms;
    }
    if let Some(max_delay_ms) = cli.max_delay_ms {
        config.max_delay_ms = max_delay_ms;
    }
    Ok(config)
}

/// Symbols from the command line, or the configured list when none are given.
fn resolve_symbols(raw: &[String], config: &HarvestConfig) -> Result<Vec<Symbol>, CliError> {
    let symbols = if raw.is_empty() {
        config.default_symbols()?
    } else {
        Symbol::parse_batch(raw)?
    };
    Ok(symbols)
}

fn build_pipeline(config: &HarvestConfig) -> Result<Pipeline, CliError> {
    let client = ReqwestHttpClient::new().map_err(quoteharvest_core::PipelineError::from)?;
    let collector: BatchCollector = config.collector(Arc::new(client), Arc::new(TokioSleeper))?;
    Ok(Pipeline::new(collector, config.output_dir.clone()))
}

/// Cancel the batch on Ctrl-C; symbols not yet fetched are recorded as cancelled.
fn cancel_on_interrupt() -> CancelToken {
    let token = CancelToken::new();
    let handle = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; finishing current symbol and cancelling the rest");
            handle.cancel();
        }
    });
    token
}

fn failure_warnings(dataset: &quoteharvest_core::Dataset) -> Vec<String> {
    dataset
        .failures()
        .map(|record| {
            format!(
                "{}: {}",
                record.symbol,
                record.error.as_deref().unwrap_or("unknown error")
            )
        })
        .collect()
}
