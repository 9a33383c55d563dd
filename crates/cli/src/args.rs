//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//! - Turn the load-related flags into `LoadOptions` and a `PathPolicy`.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use simpleenvs::constants::DEFAULT_MAX_DEPTH;
use simpleenvs::{LoadOptions, PathPolicy};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "simpleenvs")]
#[command(about = "Validate and inspect .env files without exporting them", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  simpleenvs check --require DATABASE_URL --require PORT\n  simpleenvs --path config/.env get PORT\n  simpleenvs -o json info\n  simpleenvs export --format shell > env.sh\n"
)]
pub struct Cli {
    /// The .env file to load; discovered under --root when omitted
    #[arg(long, global = true, env = "SIMPLEENVS_PATH", value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Directory files must live under (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// How many directory levels discovery may descend
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Apply strict key grammar and dangerous-pattern screening
    #[arg(
        long,
        global = true,
        env = "SIMPLEENVS_STRICT",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub strict: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a .env file and summarize its contents
    Check {
        /// Keys that must be present (repeatable)
        #[arg(long = "require", value_name = "KEY")]
        required: Vec<String>,
    },

    /// Print one value
    Get {
        /// Key to read
        key: String,

        /// Value printed when the key is absent instead of failing
        #[arg(long)]
        default: Option<String>,
    },

    /// List the keys defined in the file
    Keys,

    /// Show session and integrity details for the loaded file
    Info,

    /// Re-emit the file as .env text or shell exports
    Export {
        /// Export syntax
        #[arg(long, value_enum, default_value_t = ExportFormat::Env)]
        format: ExportFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Env,
    Shell,
}

/// Returns true if the path is empty or contains only whitespace.
pub(crate) fn path_is_blank(path: &Path) -> bool {
    path.to_string_lossy().trim().is_empty()
}

impl Cli {
    /// Load options from the global flags. Blank paths fall back to discovery.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            path: self.path.clone().filter(|p| !path_is_blank(p)),
            max_depth: self.max_depth,
            strict_validation: self.strict,
        }
    }

    /// Policy rooted at `--root`, or the current directory.
    pub fn path_policy(&self) -> Result<PathPolicy> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        Ok(PathPolicy::rooted(root))
    }
}
