use quoteharvest_core::Table;
use serde::Serialize;

use crate::cli::PreviewArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct PreviewResponseData {
    total_rows: usize,
    #[serde(flatten)]
    head: Table,
}

pub fn run(args: &PreviewArgs) -> Result<CommandResult, CliError> {
    let table = Table::read(&args.path)?;
    let data = serde_json::to_value(PreviewResponseData {
        total_rows: table.rows.len(),
        head: table.head(args.rows),
    })?;
    Ok(CommandResult::ok(data))
}
