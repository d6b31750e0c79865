//! Git integration layer.
//!
//! The rest of the crate talks to repositories only through the two traits
//! defined here: [`CommitLogSource`] reads commit history, [`Destination`]
//! mutates the repository receiving the synthetic commits.
//!
//! The implementations live in `git2_backend` (based on the `git2` crate) and
//! are re-exported below, so another backend could be swapped in without
//! touching the sync logic.

mod discover;
mod git2_backend;

use anyhow::Result;
use std::path::Path;

use crate::config::{DEFAULT_DAYS, DEFAULT_FOLDER_DEPTH};
use crate::record::CommitRecord;

pub use discover::find_repositories;
pub use git2_backend::{Git2Destination, Git2Source, ensure_distinct};

/// Which commits to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Only commits committed within this many days before now.
    pub days: u32,
    /// Directory levels scanned for repositories; 1 means the source path itself.
    pub folder_depth: u32,
    /// Pattern matched against `Name <email>`; `None` defers to the backend default.
    pub author: Option<String>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            folder_depth: DEFAULT_FOLDER_DEPTH,
            author: None,
        }
    }
}

/// Anything that can produce commit records.
pub trait CommitLogSource {
    /// List the commits matching `query`, in no particular order.
    fn list_commits(&self, query: &LogQuery) -> Result<Vec<CommitRecord>>;
}

/// The repository receiving synthetic commits.
pub trait Destination {
    /// Working tree root; the marker file lives here.
    fn root(&self) -> &Path;

    /// Hard-reset the repository to its very first commit, dropping all later history.
    fn reset_to_first_commit(&self) -> Result<()>;

    /// Stage the whole working tree and commit it with `date` as message,
    /// author date and committer date.
    fn commit_with_date(&self, date: &str) -> Result<()>;
}
