//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to the matching command handler.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Exit code selection (see `error` module).

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;
use crate::formatters::OutputFormat;

/// Dispatch CLI commands to their respective handlers.
pub(crate) async fn run_command(cli: Cli) -> Result<()> {
    let format = OutputFormat::from_str(&cli.output)?;

    match &cli.command {
        Commands::Check { required } => commands::check::run(&cli, required, format).await?,
        Commands::Get { key, default } => {
            commands::get::run(&cli, key, default.as_deref(), format).await?
        }
        Commands::Keys => commands::keys::run(&cli, format).await?,
        Commands::Info => commands::info::run(&cli, format).await?,
        Commands::Export {
            format: export_format,
        } => commands::export::run(&cli, *export_format, format).await?,
    }

    Ok(())
}
