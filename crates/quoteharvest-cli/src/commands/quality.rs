use quoteharvest_core::{DataQualityReport, Table};

use crate::cli::FileArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &FileArgs) -> Result<CommandResult, CliError> {
    let table = Table::read(&args.path)?;
    let report = DataQualityReport::from_table(&table);

    let mut warnings = Vec::new();
    if report.duplicate_records > 0 {
        warnings.push(format!("{} duplicate record(s)", report.duplicate_records));
    }
    Ok(CommandResult::ok(serde_json::to_value(report)?).with_warnings(warnings))
}
