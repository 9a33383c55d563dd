//! simpleenvs CLI - validate and inspect `.env` files.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Load the selected file into an isolated secure store and run one command.
//! - Map failures to structured exit codes.
//!
//! Does NOT handle:
//! - Exporting values into this process's environment; nothing is ever set.
//!
//! Invariants:
//! - Logs go to stderr so stdout carries only command output.

mod args;
mod commands;
mod dispatch;
mod error;
mod formatters;

use args::Cli;
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt, render_error};
use simpleenvs::Profile;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run_command(cli).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {}", render_error(&e, Profile::detect()));
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}
