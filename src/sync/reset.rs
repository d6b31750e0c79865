use anyhow::Result;
use std::path::Path;
use tracing::warn;

use crate::git::Destination;
use crate::progress::Reporter;
use crate::prompt::Prompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset,
    Failed,
    Declined,
}

/// Ask for confirmation, then roll the destination back to its first commit.
///
/// `shown` is the destination as the user gave it. The question defaults to
/// "no". A failed reset is reported and does not stop the caller; a declined
/// one leaves the repository untouched.
pub fn reset_destination(
    dest: &dyn Destination,
    shown: &Path,
    prompter: &mut dyn Prompter,
    reporter: &Reporter,
) -> Result<ResetOutcome> {
    let shown = shown.display();
    let question = format!("Are you sure you want to reset {}? (N/y) ", shown);
    if !prompter.confirm(&question, false)? {
        return Ok(ResetOutcome::Declined);
    }

    match dest.reset_to_first_commit() {
        Ok(()) => {
            reporter.status(&format!("{} were successfully reset.", shown));
            Ok(ResetOutcome::Reset)
        }
        Err(e) => {
            warn!(error = %e, "reset failed");
            reporter.failure("An error occurred while resetting the destination repository");
            Ok(ResetOutcome::Failed)
        }
    }
}
