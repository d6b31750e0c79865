//! Crate entry point for **sync-contributions**.
//!
//! This library provides the implementation behind the `sync-contributions`
//! CLI, which replays the commit dates of external repositories into a
//! destination repository as empty commits.
//! Each submodule encapsulates one responsibility (option merging, log parsing,
//! git access, the marker file, the sync pipeline).
//! The `pub use` re-exports make the pieces the binary needs accessible from
//! the crate root.

pub mod cli;
pub mod config;
pub mod git;
pub mod log;
pub mod marker;
pub mod paths;
pub mod progress;
pub mod prompt;
pub mod record;
pub mod sync;

pub use cli::Cli;
pub use config::{FileConfig, SyncOptions, load_config};
pub use log::{parse_log, sort_by_date};
pub use marker::{MarkerFile, MatchMode};
pub use record::CommitRecord;
pub use sync::{SyncOutcome, cmd_sync, run_sync};
