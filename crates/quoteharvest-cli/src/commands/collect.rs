use std::path::PathBuf;

use quoteharvest_core::{HarvestConfig, RawRecord};
use serde::Serialize;
use uuid::Uuid;

use crate::cli::SymbolsArgs;
use crate::error::CliError;

use super::{
    build_pipeline, cancel_on_interrupt, failure_warnings, resolve_symbols, CommandResult,
};

#[derive(Debug, Serialize)]
struct CollectResponseData<'a> {
    batch_id: Uuid,
    raw_path: PathBuf,
    attempted: usize,
    succeeded: usize,
    records: &'a [RawRecord],
}

pub async fn run(args: &SymbolsArgs, config: &HarvestConfig) -> Result<CommandResult, CliError> {
    let symbols = resolve_symbols(&args.symbols, config)?;
    let pipeline = build_pipeline(config)?;

    let (dataset, raw_path) = pipeline
        .collect_to_file(&symbols, &cancel_on_interrupt())
        .await?;

    let data = serde_json::to_value(CollectResponseData {
        batch_id: dataset.batch_id(),
        raw_path,
        attempted: dataset.len(),
        succeeded: dataset.success_count(),
        records: dataset.records(),
    })?;
    Ok(CommandResult::ok(data).with_warnings(failure_warnings(&dataset)))
}
