use clap::Parser;
use std::path::PathBuf;

/// Command-line interface definition.
///
/// Every option is optional at parse time: `--source` and `--destination`
/// may also come from the config file, and the merged result is validated in
/// [`SyncOptions::resolve`](crate::config::SyncOptions::resolve).
#[derive(Parser, Debug, Default)]
#[command(
    name = "sync-contributions",
    version,
    about = "Synchronize your external contributions into your GitHub account",
    long_about = "Reads the commit history of one or more source repositories and replays \
                  it into a destination repository as empty commits carrying the same dates."
)]
pub struct Cli {
    /// Source repositories to fetch commits from
    #[arg(long = "source", value_name = "PATH", num_args = 1..)]
    pub sources: Vec<PathBuf>,

    /// Destination repository to sync contributions into
    #[arg(long, value_name = "PATH")]
    pub destination: Option<PathBuf>,

    /// Number of days back to include [default: 5000]
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Level of subfolders to look for repositories in [default: 1]
    #[arg(long = "folder-depth", value_name = "DEPTH")]
    pub folder_depth: Option<u32>,

    /// Reset the destination repository to its first commit before syncing
    #[arg(long)]
    pub reset: bool,

    /// Do not prompt and do not print status messages
    #[arg(long)]
    pub silent: bool,

    /// Only include commits whose author matches this pattern
    #[arg(long, value_name = "PATTERN")]
    pub author: Option<String>,

    /// Project name, the marker file becomes COMMITS_<project>
    #[arg(long, value_name = "NAME")]
    pub project: Option<String>,

    /// Count the commits that would be created without touching the destination
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Treat a date as synced when it appears anywhere in the marker file
    #[arg(long = "loose-match")]
    pub loose_match: bool,

    /// Read a saved `git standup` report instead of scanning sources ("-" for stdin)
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
