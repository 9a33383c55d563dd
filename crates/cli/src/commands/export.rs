//! Export command implementation.

use anyhow::Result;
use simpleenvs::export::{to_env_format, to_shell_format};

use crate::args::{Cli, ExportFormat};
use crate::formatters::OutputFormat;

pub async fn run(cli: &Cli, export_format: ExportFormat, format: OutputFormat) -> Result<()> {
    let store = super::load_store(cli).await?;
    let map = store.get_all();

    let output = match (format, export_format) {
        (OutputFormat::Json, _) => serde_json::to_string_pretty(&map)? + "\n",
        (OutputFormat::Text, ExportFormat::Env) => to_env_format(&map),
        (OutputFormat::Text, ExportFormat::Shell) => to_shell_format(&map),
    };
    print!("{}", output);
    Ok(())
}
