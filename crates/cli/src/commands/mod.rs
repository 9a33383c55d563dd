//! CLI command implementations.

pub mod check;
pub mod export;
pub mod get;
pub mod info;
pub mod keys;

use anyhow::{Context, Result};
use simpleenvs::SecureStore;
use std::sync::Arc;
use tracing::info;

use crate::args::Cli;

/// Load the file selected by the global flags into a fresh secure store.
pub async fn load_store(cli: &Cli) -> Result<Arc<SecureStore>> {
    let store = SecureStore::with_policy(cli.path_policy()?);
    let options = cli.load_options();

    store
        .load_secure_async(&options)
        .await
        .with_context(|| match &options.path {
            Some(path) => format!("Failed to load {}", path.display()),
            None => "Failed to load .env file".to_string(),
        })?;

    if let Some(source) = store.source() {
        info!("Loaded {} variables from {}", store.len(), source.display());
    }
    Ok(store)
}
