//! Check command implementation.

use anyhow::Result;
use simpleenvs::export::{missing_keys, summarize};

use crate::args::Cli;
use crate::error::CliError;
use crate::formatters::{CheckReport, OutputFormat, get_formatter};

pub async fn run(cli: &Cli, required: &[String], format: OutputFormat) -> Result<()> {
    let store = super::load_store(cli).await?;
    let map = store.get_all();
    let missing = missing_keys(&map, required.iter().map(String::as_str));

    let report = CheckReport {
        path: store.source(),
        strict: cli.strict,
        file_hash: store.get_security_info().file_hash,
        summary: summarize(&map),
        missing,
    };
    print!("{}", get_formatter(format).format_check(&report)?);

    if !report.missing.is_empty() {
        return Err(CliError::MissingKeys(report.missing).into());
    }
    Ok(())
}
