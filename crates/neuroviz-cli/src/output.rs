//! Command output on stdout.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::CliError;

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write `value` as one compact JSON line and flush.
pub fn write_json_line<T: Serialize>(value: &T) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
