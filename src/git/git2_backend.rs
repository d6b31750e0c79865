use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use git2::{Commit, IndexAddOption, Repository, ResetType, Revwalk, Signature, Sort, Time};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::discover::find_repositories;
use super::{CommitLogSource, Destination, LogQuery};
use crate::record::CommitRecord;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Push every reference (branches, remotes, tags) and HEAD onto a revwalk,
/// the equivalent of `git rev-list --all`.
///
/// References that do not peel to a commit (e.g. tags on trees) are ignored.
fn push_all_refs<'r>(repo: &'r Repository) -> Result<Revwalk<'r>> {
    let mut walk = repo.revwalk()?;
    for reference in repo.references()?.flatten() {
        if let Ok(commit) = reference.peel_to_commit() {
            walk.push(commit.id())?;
        }
    }
    if let Ok(head) = repo.head()
        && let Ok(commit) = head.peel_to_commit()
    {
        walk.push(commit.id())?;
    }
    Ok(walk)
}

/// Render a git timestamp in its own offset, e.g. `2023-01-05T11:00:00+01:00`.
///
/// This is the `--date=iso-strict` rendering, minus git's `Z` shorthand.
pub(crate) fn format_git_time(t: Time) -> Result<String> {
    let offset = FixedOffset::east_opt(t.offset_minutes() * 60)
        .ok_or_else(|| anyhow!("invalid utc offset: {} minutes", t.offset_minutes()))?;
    let utc = DateTime::from_timestamp(t.seconds(), 0)
        .ok_or_else(|| anyhow!("timestamp out of range: {}", t.seconds()))?;
    Ok(utc
        .with_timezone(&offset)
        .to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Parse an ISO-8601 date with offset into a git timestamp.
pub(crate) fn parse_git_time(date: &str) -> Result<Time> {
    let dt = DateTime::parse_from_rfc3339(date)
        .with_context(|| format!("not an ISO-8601 date: {}", date))?;
    Ok(Time::new(dt.timestamp(), dt.offset().local_minus_utc() / 60))
}

/// Compile an author pattern the way `git log --author` treats it: as a
/// regular expression, falling back to a literal match when it does not
/// compile.
fn author_matcher(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .or_else(|_| Regex::new(&regex::escape(pattern)))
        .with_context(|| format!("invalid author pattern: {}", pattern))
}

/// `user.name` from the global git configuration, if any.
fn configured_user_name() -> Option<String> {
    git2::Config::open_default()
        .ok()?
        .get_string("user.name")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Reads commit history from repositories on disk.
///
/// Each configured root is scanned for repositories (see
/// [`find_repositories`]) and every reference of every repository is walked.
pub struct Git2Source {
    roots: Vec<PathBuf>,
}

impl Git2Source {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    fn commits_in(
        &self,
        repo: &Repository,
        since: i64,
        author: Option<&Regex>,
    ) -> Result<Vec<CommitRecord>> {
        let mut walk = push_all_refs(repo)?;
        walk.set_sorting(Sort::TIME)?;

        let mut out = Vec::new();
        for oid in walk {
            let commit = repo.find_commit(oid?)?;
            if let Some(rec) = record_for(&commit, since, author)? {
                out.push(rec);
            }
        }
        Ok(out)
    }
}

/// Apply the merge, window and author filters to one commit.
///
/// The window and the recorded date use the committer time, as
/// `git log --since` and `%cd` do; the pattern is matched against the author.
fn record_for(commit: &Commit, since: i64, author: Option<&Regex>) -> Result<Option<CommitRecord>> {
    if commit.parent_count() > 1 {
        return Ok(None);
    }
    let when = commit.committer().when();
    if when.seconds() < since {
        return Ok(None);
    }
    if let Some(re) = author {
        let sig = commit.author();
        let who = format!(
            "{} <{}>",
            String::from_utf8_lossy(sig.name_bytes()),
            String::from_utf8_lossy(sig.email_bytes())
        );
        if !re.is_match(&who) {
            return Ok(None);
        }
    }
    let date = format_git_time(when)?;
    Ok(Some(CommitRecord::new(&commit.id().to_string(), date)))
}

impl CommitLogSource for Git2Source {
    /// List commits from every repository under the configured roots.
    ///
    /// - Merge commits are skipped.
    /// - Only commits committed within `query.days` days before now are kept.
    /// - With `query.author = None` the global `user.name` is used as the
    ///   pattern; without one, all authors are kept.
    /// - Repositories that fail to open or walk are logged and skipped.
    ///
    /// # Errors
    /// Returns an error if a root cannot be scanned or the author pattern is unusable.
    fn list_commits(&self, query: &LogQuery) -> Result<Vec<CommitRecord>> {
        let since = Utc::now().timestamp() - i64::from(query.days) * SECONDS_PER_DAY;
        let pattern = query.author.clone().or_else(configured_user_name);
        let author = pattern.as_deref().map(author_matcher).transpose()?;
        debug!(since, author = ?pattern, "listing commits");

        let mut all = Vec::new();
        for root in &self.roots {
            let repos = find_repositories(root, query.folder_depth)?;
            if repos.is_empty() {
                warn!(root = %root.display(), depth = query.folder_depth, "no repositories found");
            }
            for path in repos {
                let found = Repository::open(&path)
                    .with_context(|| format!("failed to open {}", path.display()))
                    .and_then(|repo| self.commits_in(&repo, since, author.as_ref()));
                match found {
                    Ok(commits) => {
                        info!(repo = %path.display(), count = commits.len(), "read commits");
                        all.extend(commits);
                    }
                    Err(e) => warn!(repo = %path.display(), error = %e, "skipping repository"),
                }
            }
        }
        Ok(all)
    }
}

/// The destination repository, opened once for the whole run.
pub struct Git2Destination {
    repo: Repository,
    root: PathBuf,
}

impl Git2Destination {
    /// Open the repository at `path`.
    ///
    /// # Errors
    /// Returns an error if `path` is not a git repository or is bare.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)
            .with_context(|| format!("destination is not a git repository: {}", path.display()))?;
        let root = repo
            .workdir()
            .ok_or_else(|| anyhow!("destination has no working tree: {}", path.display()))?
            .to_path_buf();
        Ok(Self { repo, root })
    }

    fn first_commit(&self) -> Result<Commit<'_>> {
        let mut walk = push_all_refs(&self.repo)?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        let mut last = None;
        for oid in walk {
            last = Some(oid?);
        }
        let oid = last.ok_or_else(|| anyhow!("repository has no commits"))?;
        Ok(self.repo.find_commit(oid)?)
    }

    fn signature_at(&self, when: &Time) -> Result<Signature<'static>> {
        let me = self
            .repo
            .signature()
            .context("set user.name and user.email in the destination repository")?;
        let name = String::from_utf8_lossy(me.name_bytes()).into_owned();
        let email = String::from_utf8_lossy(me.email_bytes()).into_owned();
        Ok(Signature::new(&name, &email, when)?)
    }
}

impl Destination for Git2Destination {
    fn root(&self) -> &Path {
        &self.root
    }

    fn reset_to_first_commit(&self) -> Result<()> {
        let first = self.first_commit()?;
        info!(commit = %first.id(), "resetting destination");
        self.repo
            .reset(first.as_object(), ResetType::Hard, None)
            .with_context(|| format!("git reset --hard {}", first.id()))?;
        Ok(())
    }

    fn commit_with_date(&self, date: &str) -> Result<()> {
        let when = parse_git_time(date)?;
        let sig = self.signature_at(&when)?;

        let mut index = self.repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) if e.code() == git2::ErrorCode::NotFound => None,
            Err(e) => return Err(e).context("failed to resolve HEAD"),
        };
        let parents: Vec<&Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, date, &tree, &parents)
            .with_context(|| format!("git commit --date={}", date))?;
        debug!(commit = %oid, date, "created commit");
        Ok(())
    }
}

/// Refuse to treat a path as a destination if it is one of the sources.
pub fn ensure_distinct(destination: &Path, sources: &[PathBuf]) -> Result<()> {
    let dst = destination
        .canonicalize()
        .unwrap_or_else(|_| destination.to_path_buf());
    for src in sources {
        let s = src.canonicalize().unwrap_or_else(|_| src.clone());
        if s == dst {
            bail!("destination {} is also a source", destination.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const DAY: i64 = SECONDS_PER_DAY;

    fn init(path: &Path) -> Repository {
        fs::create_dir_all(path).unwrap();
        let repo = Repository::init(path).unwrap();
        {
            let mut cfg = repo.config().unwrap();
            cfg.set_str("user.name", "Tester").unwrap();
            cfg.set_str("user.email", "tester@example.com").unwrap();
        }
        repo
    }

    fn commit_as(repo: &Repository, who: &str, secs: i64, offset_min: i32) -> git2::Oid {
        let email = format!("{}@example.com", who.to_lowercase());
        let sig = Signature::new(who, &email, &Time::new(secs, offset_min)).unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "work", &tree, &parents)
            .unwrap()
    }

    fn query(days: u32, depth: u32, author: &str) -> LogQuery {
        LogQuery {
            days,
            folder_depth: depth,
            author: Some(author.to_string()),
        }
    }

    #[test]
    fn format_git_time_uses_commit_offset() {
        let t = Time::new(1_672_912_800, 60);
        assert_eq!(format_git_time(t).unwrap(), "2023-01-05T11:00:00+01:00");
        let utc = Time::new(1_672_912_800, 0);
        assert_eq!(format_git_time(utc).unwrap(), "2023-01-05T10:00:00+00:00");
    }

    #[test]
    fn parse_git_time_keeps_offset() {
        let t = parse_git_time("2023-01-05T11:00:00+01:00").unwrap();
        assert_eq!(t.seconds(), 1_672_912_800);
        assert_eq!(t.offset_minutes(), 60);
        assert!(parse_git_time("yesterday").is_err());
    }

    #[test]
    fn lists_commits_within_window_for_author() {
        let td = tempdir().unwrap();
        let repo = init(td.path());
        let now = Utc::now().timestamp();
        let recent = commit_as(&repo, "Alice", now - 2 * DAY, 0);
        commit_as(&repo, "Alice", now - 40 * DAY, 0);
        commit_as(&repo, "Bob", now - DAY, 0);

        let src = Git2Source::new(vec![td.path().to_path_buf()]);
        let got = src.list_commits(&query(10, 1, "Alice")).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, &recent.to_string()[..7]);
        assert_eq!(got[0].id.len(), 7);

        let everyone = src.list_commits(&query(10, 1, ".")).unwrap();
        assert_eq!(everyone.len(), 2);
    }

    #[test]
    fn window_and_date_follow_the_committer() {
        let td = tempdir().unwrap();
        let repo = init(td.path());
        let now = Utc::now().timestamp();
        let author = Signature::new("Alice", "alice@example.com", &Time::new(now - 30 * DAY, 0)).unwrap();
        let committer = Signature::new("Bob", "bob@example.com", &Time::new(now - DAY, 120)).unwrap();
        let tree = repo.find_tree(repo.index().unwrap().write_tree().unwrap()).unwrap();
        repo.commit(Some("HEAD"), &author, &committer, "rebased", &tree, &[])
            .unwrap();

        let src = Git2Source::new(vec![td.path().to_path_buf()]);
        let got = src.list_commits(&query(5, 1, "Alice")).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].date, format_git_time(Time::new(now - DAY, 120)).unwrap());
        assert!(got[0].date.ends_with("+02:00"));

        // the author filter still looks at the author, not the committer
        assert!(src.list_commits(&query(5, 1, "Bob")).unwrap().is_empty());
    }

    #[test]
    fn author_pattern_matches_email_and_literal_fallback() {
        let td = tempdir().unwrap();
        let repo = init(td.path());
        let now = Utc::now().timestamp();
        commit_as(&repo, "Alice", now, 0);

        let src = Git2Source::new(vec![td.path().to_path_buf()]);
        assert_eq!(src.list_commits(&query(1, 1, "alice@example")).unwrap().len(), 1);
        // unbalanced bracket is not a valid regex and is matched literally
        assert!(src.list_commits(&query(1, 1, "[Alice")).unwrap().is_empty());
    }

    #[test]
    fn skips_merge_commits() {
        let td = tempdir().unwrap();
        let repo = init(td.path());
        let now = Utc::now().timestamp();
        let base = commit_as(&repo, "Alice", now - 3 * DAY, 0);
        let left = commit_as(&repo, "Alice", now - 2 * DAY, 0);

        let sig = Signature::new("Alice", "alice@example.com", &Time::new(now - 2 * DAY, 0)).unwrap();
        let tree = repo.find_commit(base).unwrap().tree().unwrap();
        let base_c = repo.find_commit(base).unwrap();
        let right = repo
            .commit(None, &sig, &sig, "side", &tree, &[&base_c])
            .unwrap();
        let l = repo.find_commit(left).unwrap();
        let r = repo.find_commit(right).unwrap();
        let merge_sig = Signature::new("Alice", "alice@example.com", &Time::new(now - DAY, 0)).unwrap();
        repo.commit(Some("HEAD"), &merge_sig, &merge_sig, "merge", &tree, &[&l, &r])
            .unwrap();

        let src = Git2Source::new(vec![td.path().to_path_buf()]);
        let got = src.list_commits(&query(10, 1, "Alice")).unwrap();
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn scans_nested_repositories_by_depth() {
        let td = tempdir().unwrap();
        let now = Utc::now().timestamp();
        let a = init(&td.path().join("a"));
        commit_as(&a, "Alice", now, 0);
        let b = init(&td.path().join("b"));
        commit_as(&b, "Alice", now, 0);
        commit_as(&b, "Alice", now - DAY, 0);

        let src = Git2Source::new(vec![td.path().to_path_buf()]);
        assert!(src.list_commits(&query(5, 1, "Alice")).unwrap().is_empty());
        assert_eq!(src.list_commits(&query(5, 2, "Alice")).unwrap().len(), 3);
    }

    #[test]
    fn reads_every_branch() {
        let td = tempdir().unwrap();
        let repo = init(td.path());
        let now = Utc::now().timestamp();
        let first = commit_as(&repo, "Alice", now - 2 * DAY, 0);

        let sig = Signature::new("Alice", "alice@example.com", &Time::new(now, 0)).unwrap();
        let base = repo.find_commit(first).unwrap();
        let tree = base.tree().unwrap();
        repo.commit(Some("refs/heads/feature"), &sig, &sig, "side", &tree, &[&base])
            .unwrap();
        commit_as(&repo, "Alice", now - DAY, 0);

        let src = Git2Source::new(vec![td.path().to_path_buf()]);
        assert_eq!(src.list_commits(&query(5, 1, "Alice")).unwrap().len(), 3);
    }

    #[test]
    fn commit_with_date_sets_both_dates_and_message() {
        let td = tempdir().unwrap();
        let repo = init(td.path());
        let dst = Git2Destination::open(td.path()).unwrap();

        fs::write(td.path().join("COMMITS"), "2023-01-05T11:00:00+01:00\n").unwrap();
        dst.commit_with_date("2023-01-05T11:00:00+01:00").unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message(), Some("2023-01-05T11:00:00+01:00"));
        assert_eq!(head.author().when().seconds(), 1_672_912_800);
        assert_eq!(head.author().when().offset_minutes(), 60);
        assert_eq!(head.committer().when().seconds(), 1_672_912_800);
        assert_eq!(head.parent_count(), 0);
        assert!(head.tree().unwrap().get_name("COMMITS").is_some());

        dst.commit_with_date("2023-01-06T11:00:00+01:00").unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.parent_count(), 1);
    }

    #[test]
    fn reset_returns_to_first_commit() {
        let td = tempdir().unwrap();
        let repo = init(td.path());
        let dst = Git2Destination::open(td.path()).unwrap();
        dst.commit_with_date("2020-01-01T00:00:00+00:00").unwrap();
        let first = repo.head().unwrap().peel_to_commit().unwrap().id();

        fs::write(td.path().join("COMMITS"), "x\n").unwrap();
        dst.commit_with_date("2021-01-01T00:00:00+00:00").unwrap();
        dst.commit_with_date("2022-01-01T00:00:00+00:00").unwrap();

        dst.reset_to_first_commit().unwrap();
        assert_eq!(repo.head().unwrap().peel_to_commit().unwrap().id(), first);
        assert!(!td.path().join("COMMITS").exists());
    }

    #[test]
    fn reset_fails_on_empty_repository() {
        let td = tempdir().unwrap();
        init(td.path());
        let dst = Git2Destination::open(td.path()).unwrap();
        assert!(dst.reset_to_first_commit().is_err());
    }

    #[test]
    fn open_rejects_non_repository() {
        let td = tempdir().unwrap();
        assert!(Git2Destination::open(td.path()).is_err());
    }

    #[test]
    fn ensure_distinct_rejects_same_path() {
        let td = tempdir().unwrap();
        assert!(ensure_distinct(td.path(), &[td.path().to_path_buf()]).is_err());
        assert!(ensure_distinct(td.path(), &[td.path().join("other")]).is_ok());
    }
}
