use quoteharvest_core::{BatchSummary, HarvestConfig, RunOutput};
use serde::Serialize;

use crate::cli::SymbolsArgs;
use crate::error::CliError;

use super::{build_pipeline, cancel_on_interrupt, resolve_symbols, CommandResult};

#[derive(Debug, Serialize)]
struct RunResponseData {
    #[serde(flatten)]
    output: RunOutput,
    summary: BatchSummary,
}

pub async fn run(args: &SymbolsArgs, config: &HarvestConfig) -> Result<CommandResult, CliError> {
    let symbols = resolve_symbols(&args.symbols, config)?;
    let pipeline = build_pipeline(config)?;

    let (processed, output) = pipeline.run(&symbols, &cancel_on_interrupt()).await?;

    let mut warnings = Vec::new();
    if output.succeeded < output.collected {
        warnings.push(format!(
            "{} of {} symbol(s) failed and were dropped",
            output.collected - output.succeeded,
            output.collected
        ));
    }

    let data = serde_json::to_value(RunResponseData {
        summary: BatchSummary::from_processed(&processed),
        output,
    })?;
    Ok(CommandResult::ok(data).with_warnings(warnings))
}
