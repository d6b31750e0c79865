//! Reading `git standup`-style commit logs.
//!
//! [`parse_log`] turns raw report text into [`CommitRecord`]s and
//! [`sort_by_date`] orders them for replay.

mod parse;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::git::{CommitLogSource, LogQuery};
use crate::record::CommitRecord;

pub use parse::parse_log;

/// Sort records by date, oldest first.
///
/// Dates are compared as plain strings. ISO-8601 with zero-padded fields sorts
/// lexically in chronological order as long as the offsets agree; equal
/// strings from different offsets are treated as equal. The sort is stable.
pub fn sort_by_date(commits: &mut [CommitRecord]) {
    commits.sort_by(|a, b| a.date.cmp(&b.date));
}

/// A [`CommitLogSource`] backed by a saved report instead of live repositories.
///
/// The report is read once per [`list_commits`](CommitLogSource::list_commits)
/// call. A path of `-` reads stdin. The query is ignored: the report was
/// already produced with its own window, depth and author.
pub struct LogFileSource {
    path: PathBuf,
}

impl LogFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_text(&self) -> Result<String> {
        if self.path == Path::new("-") {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read commit log from stdin")?;
            return Ok(buf);
        }
        fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read commit log: {}", self.path.display()))
    }
}

impl CommitLogSource for LogFileSource {
    fn list_commits(&self, _query: &LogQuery) -> Result<Vec<CommitRecord>> {
        let text = self.read_text()?;
        let commits = parse_log(&text);
        debug!(
            path = %self.path.display(),
            count = commits.len(),
            "parsed commit log"
        );
        Ok(commits)
    }
}
