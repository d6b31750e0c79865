use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Bar style used while commits are replayed into the destination.
/// - Yellow spinner, position counter and the current message.
pub fn replay_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m [{pos}/{len}] {wide_msg}")
        .unwrap()
        .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"])
}

/// Replaces [`replay_style`] once replay ends, leaving the created-commits
/// summary behind a green tick.
pub fn summary_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[32m✔\x1b[0m {msg}").unwrap()
}

/// Console output for one run.
///
/// With `silent` set, status lines and progress bars are suppressed;
/// [`failure`](Self::failure) still prints.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    silent: bool,
}

impl Reporter {
    pub const fn new(silent: bool) -> Self {
        Self { silent }
    }

    /// A status line on stdout.
    pub fn status(&self, msg: &str) {
        if !self.silent {
            println!("{}", msg);
        }
    }

    /// A status line on stderr, for outcomes that are not errors but end the run.
    pub fn notice(&self, msg: &str) {
        if !self.silent {
            eprintln!("{}", msg.yellow());
        }
    }

    /// A failure message on stderr, printed even in silent mode.
    pub fn failure(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Progress bar over `len` commits; hidden when silent.
    pub fn replay_bar(&self, len: u64) -> ProgressBar {
        if self.silent {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(replay_style());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

/// `1 commit was found` / `N commits were found`.
pub fn found_message(n: usize) -> String {
    if n == 1 {
        "1 commit was found".to_string()
    } else {
        format!("{} commits were found", n)
    }
}
