//! JSON rendering of command results on stdout.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;
use crate::metadata::Metadata;

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub meta: Metadata,
    pub data: Value,
}

pub fn render(envelope: &Envelope, pretty: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, envelope, pretty)
}

pub fn write_json<W: Write>(
    writer: &mut W,
    envelope: &Envelope,
    pretty: bool,
) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, envelope)?;
    } else {
        serde_json::to_writer(&mut *writer, envelope)?;
    }
    writeln!(writer)?;
    Ok(())
}
