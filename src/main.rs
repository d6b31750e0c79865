//! # sync-contributions
//!
//! Replays the commit activity of external repositories into a destination
//! repository, one dated empty commit per source commit date.
//!
//! - `--source` repositories are scanned (optionally nested `--folder-depth`
//!   levels deep) for commits from the last `--days` days by `--author`
//! - dates already listed in the destination's `COMMITS` file are skipped
//! - `--reset` rolls the destination back to its first commit beforehand
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use sync_contributions::{Cli, SyncOptions, cmd_sync, load_config};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit status when required options are missing.
const USAGE_EXIT: u8 = 2;

/// Route diagnostics to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// CLI entry point.
///
/// Parses arguments with `clap`, merges them over the config file and runs
/// the sync. Missing required options print the usage text.
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = load_config(cli.config.as_deref())?;
    let Some(opts) = SyncOptions::resolve(cli, file)? else {
        Cli::command().print_help()?;
        return Ok(ExitCode::from(USAGE_EXIT));
    };
    debug!(?opts, "resolved options");

    // "no commits" and a declined prompt end the run cleanly, like a finished sync
    let outcome = cmd_sync(&opts)?;
    debug!(?outcome, "done");
    Ok(ExitCode::SUCCESS)
}
