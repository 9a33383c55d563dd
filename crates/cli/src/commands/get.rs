//! Get command implementation.

use anyhow::Result;
use simpleenvs::TypedValue;

use crate::args::Cli;
use crate::error::CliError;
use crate::formatters::{OutputFormat, ValueReport, get_formatter};

pub async fn run(
    cli: &Cli,
    key: &str,
    default: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let store = super::load_store(cli).await?;

    let value = match (store.get_secure(key), default) {
        (Some(value), _) => value,
        (None, Some(default)) => TypedValue::String(default.to_string()),
        (None, None) => return Err(CliError::KeyNotFound(key.to_string()).into()),
    };

    let report = ValueReport {
        key: key.to_string(),
        type_name: value.type_name(),
        value,
    };
    print!("{}", get_formatter(format).format_value(&report)?);
    Ok(())
}
