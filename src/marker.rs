use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// How a date is looked up in the marker file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// A date is present only if some line equals it exactly.
    #[default]
    Exact,
    /// A date is present if it occurs anywhere in the file, as `grep` would find it.
    Substring,
}

/// The append-only record of dates already synced into a destination.
///
/// The file holds one date per line. Lines are never rewritten;
/// [`append`](Self::append) adds to the end and [`contains`](Self::contains)
/// is the only lookup. The only removal is [`roll_back`](Self::roll_back) of
/// a line whose commit was never created.
///
/// Contents are read once in [`load`](Self::load) and kept in memory, so the
/// dates recorded during a run are visible to later lookups whether or not
/// they were written to disk (see [`remember`](Self::remember)).
#[derive(Debug)]
pub struct MarkerFile {
    path: PathBuf,
    mode: MatchMode,
    content: String,
}

impl MarkerFile {
    /// Read the marker file at `path`. A missing file is treated as empty.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn load(path: &Path, mode: MatchMode) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read marker file: {}", path.display()));
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            mode,
            content,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `date` has already been recorded.
    pub fn contains(&self, date: &str) -> bool {
        match self.mode {
            MatchMode::Exact => self.content.lines().any(|l| l.trim_end() == date),
            MatchMode::Substring => self.content.contains(date),
        }
    }

    /// Record `date` in memory only. Used by dry runs.
    pub fn remember(&mut self, date: &str) {
        if !self.content.is_empty() && !self.content.ends_with('\n') {
            self.content.push('\n');
        }
        self.content.push_str(date);
        self.content.push('\n');
    }

    /// Append `date` as a new line on disk and record it in memory.
    ///
    /// The file is created if missing. If the existing file does not end
    /// with a newline, one is written first so the date lands on its own line.
    ///
    /// Returns where the file ended before the write, for [`roll_back`](Self::roll_back).
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or written.
    pub fn append(&mut self, date: &str) -> Result<Appended> {
        let file_len = match fs::metadata(&self.path) {
            Ok(m) => Some(m.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to stat marker file: {}", self.path.display()));
            }
        };
        let content_len = self.content.len();
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open marker file: {}", self.path.display()))?;
        let line = if !self.content.is_empty() && !self.content.ends_with('\n') {
            format!("\n{}\n", date)
        } else {
            format!("{}\n", date)
        };
        f.write_all(line.as_bytes())
            .with_context(|| format!("failed to write marker file: {}", self.path.display()))?;
        self.remember(date);
        Ok(Appended {
            file_len,
            content_len,
        })
    }

    /// Undo an [`append`](Self::append), on disk and in memory.
    ///
    /// A file created by that append is removed again.
    ///
    /// # Errors
    /// Returns an error if the file cannot be truncated or removed.
    pub fn roll_back(&mut self, appended: Appended) -> Result<()> {
        match appended.file_len {
            Some(len) => OpenOptions::new()
                .write(true)
                .open(&self.path)
                .and_then(|f| f.set_len(len))
                .with_context(|| format!("failed to truncate marker file: {}", self.path.display()))?,
            None => fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove marker file: {}", self.path.display()))?,
        }
        self.content.truncate(appended.content_len);
        Ok(())
    }
}

/// State of a marker file just before an [`append`](MarkerFile::append).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    file_len: Option<u64>,
    content_len: usize,
}
