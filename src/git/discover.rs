use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Find git repositories under `root`, looking at most `depth` levels deep.
///
/// Depth counts the `.git` entry itself, the way `find -maxdepth N -name .git`
/// does:
/// - `depth = 1`: only `root` is checked.
/// - `depth = 2`: `root` and its direct subdirectories.
/// - `depth = 0`: nothing is found.
///
/// Repositories nested inside other repositories are returned too. Symlinked
/// directories are not followed and `.git` directories are never descended
/// into. The result is sorted.
///
/// # Errors
/// Returns an error if `root` cannot be read for reasons other than
/// `NotFound`. A missing `root` yields an empty list; unreadable
/// subdirectories are skipped.
pub fn find_repositories(root: &Path, depth: u32) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if depth == 0 {
        return Ok(found);
    }
    match fs::metadata(root) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(found),
        Err(e) => {
            return Err(e).with_context(|| format!("cannot read source: {}", root.display()));
        }
    }
    walk(root, 0, depth, &mut found);
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, level: u32, depth: u32, found: &mut Vec<PathBuf>) {
    if dir.join(".git").exists() {
        found.push(dir.to_path_buf());
    }
    if level + 1 >= depth {
        return;
    }

    let rd = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };
    for ent in rd.flatten() {
        let is_dir = ent.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir || ent.file_name() == ".git" {
            continue;
        }
        walk(&ent.path(), level + 1, depth, found);
    }
}
