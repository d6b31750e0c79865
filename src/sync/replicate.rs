use anyhow::Result;
use indicatif::ProgressBar;
use tracing::{debug, warn};

use crate::git::Destination;
use crate::marker::MarkerFile;
use crate::record::CommitRecord;

/// Replay `commits` into `dest`, skipping dates already in `marker`.
///
/// `commits` must already be sorted; they are applied one at a time in the
/// given order so the destination history follows the source chronology.
/// For each date not yet recorded:
/// - real run: append it to the marker file, then stage everything and
///   commit with that date. If the commit fails the marker line is rolled
///   back, so the date is retried on the next run;
/// - dry run: only remember it in memory, so repeated dates are still
///   counted once.
///
/// Returns the number of dates that were (or would be) synced.
///
/// # Errors
/// Stops at the first marker write or commit failure.
pub fn replicate(
    commits: &[CommitRecord],
    dest: &dyn Destination,
    marker: &mut MarkerFile,
    dry_run: bool,
    pb: &ProgressBar,
) -> Result<usize> {
    let mut created = 0;
    for c in commits {
        pb.set_message(format!("{} {}", c.id, c.date));
        if marker.contains(&c.date) {
            debug!(id = %c.id, date = %c.date, "already synced");
            pb.inc(1);
            continue;
        }
        if dry_run {
            marker.remember(&c.date);
        } else {
            let appended = marker.append(&c.date)?;
            if let Err(e) = dest.commit_with_date(&c.date) {
                if let Err(undo) = marker.roll_back(appended) {
                    warn!(date = %c.date, error = %undo, "marker line left without a commit");
                }
                return Err(e);
            }
        }
        debug!(id = %c.id, date = %c.date, dry_run, "synced");
        created += 1;
        pb.inc(1);
    }
    Ok(created)
}
