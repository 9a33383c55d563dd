//! Info command implementation.

use anyhow::{Context, Result};
use simpleenvs::Profile;
use simpleenvs::constants::VERSION;

use crate::args::Cli;
use crate::formatters::{InfoReport, OutputFormat, get_formatter};

pub async fn run(cli: &Cli, format: OutputFormat) -> Result<()> {
    let store = super::load_store(cli).await?;

    let integrity_verified = match store.source() {
        Some(source) => store
            .verify_file_integrity(&source)
            .with_context(|| format!("Failed to verify {}", source.display()))?,
        None => false,
    };

    let report = InfoReport {
        version: VERSION,
        profile: Profile::detect(),
        integrity_verified,
        security: store.get_security_info(),
    };
    print!("{}", get_formatter(format).format_info(&report)?);
    Ok(())
}
