use std::path::PathBuf;

use quoteharvest_core::dataset::write_processed;
use quoteharvest_core::{HarvestConfig, ProcessedRecord, Processor, UtcDateTime};
use serde::Serialize;

use crate::cli::FileArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ProcessResponseData<'a> {
    input_path: &'a PathBuf,
    processed_path: PathBuf,
    records: &'a [ProcessedRecord],
}

pub fn run(args: &FileArgs, config: &HarvestConfig) -> Result<CommandResult, CliError> {
    let processed = Processor::default().process(&args.path)?;
    let processed_path = write_processed(&config.output_dir, &processed, UtcDateTime::now())?;

    let data = serde_json::to_value(ProcessResponseData {
        input_path: &args.path,
        processed_path,
        records: processed.records(),
    })?;
    Ok(CommandResult::ok(data))
}
