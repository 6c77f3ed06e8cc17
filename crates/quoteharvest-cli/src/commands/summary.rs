use quoteharvest_core::dataset::read_processed;
use quoteharvest_core::BatchSummary;

use crate::cli::FileArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &FileArgs) -> Result<CommandResult, CliError> {
    let processed = read_processed(&args.path)?;
    let data = serde_json::to_value(BatchSummary::from_processed(&processed))?;
    Ok(CommandResult::ok(data))
}
