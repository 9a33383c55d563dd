//! Keys command implementation.

use anyhow::Result;

use crate::args::Cli;
use crate::formatters::{OutputFormat, get_formatter};

pub async fn run(cli: &Cli, format: OutputFormat) -> Result<()> {
    let store = super::load_store(cli).await?;
    let keys = store.get_all_keys();
    print!("{}", get_formatter(format).format_keys(&keys)?);
    Ok(())
}
