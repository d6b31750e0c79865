use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::Cli;
use crate::git::LogQuery;
use crate::marker::MatchMode;
use crate::paths::{default_config_path, marker_path};

pub const DEFAULT_DAYS: u32 = 5000;
pub const DEFAULT_FOLDER_DEPTH: u32 = 1;

/// Optional defaults loaded from `config.toml`.
///
/// Every key may be omitted. Values given on the command line win.
///
/// Example TOML:
/// ```toml
/// sources     = ["~/work/client-a", "~/work/client-b"]
/// destination = "~/code/contributions"
/// days        = 365
/// folder_depth = 2
/// author      = "Jane Doe"
/// project     = "work"
/// loose_match = false
/// ```
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub folder_depth: Option<u32>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub silent: bool,
    #[serde(default)]
    pub loose_match: bool,
}

/// Load the config file.
///
/// - With `explicit = Some(path)` the file must exist.
/// - Otherwise the default location is tried and a missing file yields
///   [`FileConfig::default`].
///
/// # Errors
/// - Returns an error if an explicit config file cannot be read.
/// - Returns an error if parsing the TOML fails.
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => (default_config_path(), false),
    };
    let txt = match fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "no config file");
            return Ok(FileConfig::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("config not found: {}", path.display()));
        }
    };
    let cfg: FileConfig = toml::from_str(&txt)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

/// Everything one run needs, fixed once before any work starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
    pub days: u32,
    pub folder_depth: u32,
    pub reset: bool,
    pub silent: bool,
    pub author: Option<String>,
    pub project: Option<String>,
    pub dry_run: bool,
    pub match_mode: MatchMode,
    pub log_file: Option<PathBuf>,
}

impl SyncOptions {
    /// Merge command-line arguments over the config file and apply defaults.
    ///
    /// Returns `Ok(None)` when a required option is missing: no destination,
    /// or neither sources nor a log file. The caller prints usage in that case.
    ///
    /// # Errors
    /// - Returns an error if the project label cannot name a marker file.
    /// - Returns an error if the log is read from stdin without `--silent`:
    ///   stdin cannot carry both the report and the prompt answers.
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Option<Self>> {
        let sources = if cli.sources.is_empty() {
            file.sources
        } else {
            cli.sources
        };
        let Some(destination) = cli.destination.or(file.destination) else {
            return Ok(None);
        };
        if sources.is_empty() && cli.log_file.is_none() {
            return Ok(None);
        }
        let silent = cli.silent || file.silent;
        if !silent && cli.log_file.as_deref() == Some(Path::new("-")) {
            bail!("--log-file - reads the report from stdin and needs --silent");
        }

        let opts = Self {
            sources,
            destination,
            days: cli.days.or(file.days).unwrap_or(DEFAULT_DAYS),
            folder_depth: cli
                .folder_depth
                .or(file.folder_depth)
                .unwrap_or(DEFAULT_FOLDER_DEPTH),
            reset: cli.reset,
            silent,
            author: cli.author.or(file.author),
            project: cli.project.or(file.project),
            dry_run: cli.dry_run,
            match_mode: if cli.loose_match || file.loose_match {
                MatchMode::Substring
            } else {
                MatchMode::Exact
            },
            log_file: cli.log_file,
        };
        opts.marker_path()?;
        Ok(Some(opts))
    }

    pub fn log_query(&self) -> LogQuery {
        LogQuery {
            days: self.days,
            folder_depth: self.folder_depth,
            author: self.author.clone(),
        }
    }

    pub fn marker_path(&self) -> Result<PathBuf> {
        marker_path(&self.destination, self.project.as_deref())
    }

    /// Sources joined for display in prompts.
    pub fn sources_display(&self) -> String {
        match &self.log_file {
            Some(p) if self.sources.is_empty() => p.display().to_string(),
            _ => self
                .sources
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
