mod replicate;
mod reset;

use anyhow::Result;
use tracing::info;

use crate::config::SyncOptions;
use crate::git::{CommitLogSource, Destination, Git2Destination, Git2Source, ensure_distinct};
use crate::log::{LogFileSource, sort_by_date};
use crate::marker::MarkerFile;
use crate::paths::marker_path;
use crate::progress::{Reporter, found_message, summary_style};
use crate::prompt::{AutoConfirm, LinePrompter, Prompter};

pub use replicate::replicate;
pub use reset::{ResetOutcome, reset_destination};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The sources had no matching commits; nothing was asked or written.
    NoCommits,
    /// A confirmation prompt was declined.
    Declined,
    /// Commits were replayed (`created` may be 0 if everything was synced already).
    Synced { found: usize, created: usize },
}

/// Synchronize source commits into the destination repository.
///
/// High-level flow:
/// 1. Open the destination and, with `--reset` (and without `--dry-run`),
///    offer to roll it back to its first commit.
/// 2. List commits from the sources, or from `--log-file`.
/// 3. Report how many were found and ask for confirmation.
/// 4. Sort them by date and replay the ones missing from the marker file
///    (see [`replicate`]).
///
/// `--silent` answers every prompt with yes and hides status output.
///
/// # Errors
/// Returns an error if the destination cannot be opened, a source cannot be
/// scanned, or writing the marker file or a commit fails.
pub fn cmd_sync(opts: &SyncOptions) -> Result<SyncOutcome> {
    ensure_distinct(&opts.destination, &opts.sources)?;
    let dest = Git2Destination::open(&opts.destination)?;

    let source: Box<dyn CommitLogSource> = match &opts.log_file {
        Some(path) => Box::new(LogFileSource::new(path)),
        None => Box::new(Git2Source::new(opts.sources.clone())),
    };
    let mut prompter: Box<dyn Prompter> = if opts.silent {
        Box::new(AutoConfirm)
    } else {
        Box::new(LinePrompter::stdio())
    };
    let reporter = Reporter::new(opts.silent);

    run_sync(opts, source.as_ref(), &dest, prompter.as_mut(), &reporter)
}

/// The sync pipeline over explicit collaborators.
pub fn run_sync(
    opts: &SyncOptions,
    source: &dyn CommitLogSource,
    dest: &dyn Destination,
    prompter: &mut dyn Prompter,
    reporter: &Reporter,
) -> Result<SyncOutcome> {
    if opts.reset && !opts.dry_run {
        let outcome = reset_destination(dest, &opts.destination, prompter, reporter)?;
        info!(?outcome, "reset step");
        if outcome == ResetOutcome::Declined {
            return Ok(SyncOutcome::Declined);
        }
    }

    let mut commits = source.list_commits(&opts.log_query())?;
    if commits.is_empty() {
        reporter.notice("Couldn't find any commits");
        return Ok(SyncOutcome::NoCommits);
    }
    let found = commits.len();
    reporter.status(&found_message(found));

    let question = format!(
        "Are you sure you want to sync your contributions of {} into {}? (Y/n) ",
        opts.sources_display(),
        opts.destination.display()
    );
    if !prompter.confirm(&question, true)? {
        return Ok(SyncOutcome::Declined);
    }

    sort_by_date(&mut commits);

    let path = marker_path(dest.root(), opts.project.as_deref())?;
    let mut marker = MarkerFile::load(&path, opts.match_mode)?;
    info!(marker = %marker.path().display(), found, dry_run = opts.dry_run, "replaying commits");

    let pb = reporter.replay_bar(found as u64);
    let created = replicate(&commits, dest, &mut marker, opts.dry_run, &pb)?;

    let summary = if opts.dry_run {
        format!("{} commits would be created", created)
    } else {
        format!("{} commits have been created", created)
    };
    pb.set_style(summary_style());
    pb.finish_with_message(summary.clone());
    if pb.is_hidden() {
        reporter.status(&summary);
    }
    Ok(SyncOutcome::Synced { found, created })
}
