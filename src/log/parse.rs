use regex::Regex;
use std::sync::LazyLock;

use crate::record::CommitRecord;

/// A report line starts with a 7-9 character hash, whitespace and optional dashes.
static ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w{7,9}\s-*").unwrap());

/// Parenthesized ISO-8601 timestamp; the offset part is whatever precedes `)`.
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[^)]*)").unwrap());

/// Terminal colour sequences (`ESC [ ... m` and friends).
static ANSI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

/// Parse raw `git standup` output into commit records.
///
/// Expected line shape:
/// ```text
/// abc1234 - Fix the thing (2023-01-05T10:00:00+00:00) <Jane Doe>
/// ```
///
/// - Lines that do not start with a hash token are dropped (repository
///   banners, blank lines, "No commits" notices).
/// - Lines with a hash token but no parenthesized timestamp are dropped too.
/// - The returned `id` is the first 7 characters of the line; `date` is the
///   timestamp without its parentheses.
///
/// Input order is preserved. No match at all yields an empty vector.
pub fn parse_log(text: &str) -> Vec<CommitRecord> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(raw: &str) -> Option<CommitRecord> {
    let line = ANSI.replace_all(raw, "");
    if !ENTRY.is_match(&line) {
        return None;
    }
    let date = DATE.captures(&line)?.get(1)?.as_str();
    Some(CommitRecord::new(&line, date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_entry_lines() {
        let text = "\n\
            /home/me/work/api\n\
            abc1234 - msg (2023-01-05T10:00:00+00:00) <Me>\n\
            No commits from Me during the last 7 days\n\
            \n";
        let got = parse_log(text);
        assert_eq!(
            got,
            vec![CommitRecord::new("abc1234", "2023-01-05T10:00:00+00:00")]
        );
    }

    #[test]
    fn nine_char_token_is_cut_to_seven() {
        let got = parse_log("abc123456 - msg (2023-01-05T10:00:00-05:00)");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "abc1234");
        assert_eq!(got[0].id.len(), 7);
        assert_eq!(got[0].date, "2023-01-05T10:00:00-05:00");
    }

    #[test]
    fn rejects_short_and_long_tokens() {
        assert!(parse_log("abc123 - msg (2023-01-05T10:00:00+00:00)").is_empty());
        assert!(parse_log("abc1234567 - msg (2023-01-05T10:00:00+00:00)").is_empty());
    }

    #[test]
    fn dashes_are_optional() {
        let got = parse_log("abc1234 msg (2023-01-05T10:00:00+00:00)");
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn line_without_timestamp_is_dropped() {
        assert!(parse_log("abc1234 - msg without a date").is_empty());
        assert!(parse_log("abc1234 - msg (yesterday)").is_empty());
    }

    #[test]
    fn strips_colour_codes() {
        let line = "\x1b[31mabc1234\x1b[m - \x1b[33mmsg\x1b[m \x1b[32m(2023-01-05T10:00:00+09:00)\x1b[m";
        let got = parse_log(line);
        assert_eq!(
            got,
            vec![CommitRecord::new("abc1234", "2023-01-05T10:00:00+09:00")]
        );
    }

    #[test]
    fn date_is_taken_from_first_timestamp() {
        let got = parse_log("abc1234 - revert (2020-01-01T00:00:00Z) (2023-01-05T10:00:00+00:00)");
        assert_eq!(got[0].date, "2020-01-01T00:00:00Z");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_log("").is_empty());
    }
}
