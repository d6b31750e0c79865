use anyhow::{Result, bail};
use std::{
    env,
    path::{Component, Path, PathBuf},
};

/// Base name of the marker file kept at the destination root.
pub const MARKER_BASENAME: &str = "COMMITS";

/// Directory holding the optional `config.toml`.
///
/// `$XDG_CONFIG_HOME/sync-contributions`, falling back to
/// `$HOME/.config/sync-contributions`.
pub fn config_home() -> PathBuf {
    let xdg = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty());
    let base = xdg
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env::var_os("HOME").unwrap_or_default()).join(".config"));
    base.join("sync-contributions")
}

pub fn default_config_path() -> PathBuf {
    config_home().join("config.toml")
}

/// Marker file name for an optional project label: `COMMITS` or `COMMITS_<project>`.
///
/// # Errors
/// Rejects labels that would escape the destination root (path separators, `..`).
pub fn marker_file_name(project: Option<&str>) -> Result<String> {
    match project {
        None => Ok(MARKER_BASENAME.to_string()),
        Some(p) => {
            let mut comps = Path::new(p).components();
            let single_normal =
                matches!(comps.next(), Some(Component::Normal(_))) && comps.next().is_none();
            if p.is_empty() || !single_normal || p.contains(['/', '\\']) {
                bail!("invalid project name: {:?}", p);
            }
            Ok(format!("{}_{}", MARKER_BASENAME, p))
        }
    }
}

/// Full path of the marker file inside `destination`.
pub fn marker_path(destination: &Path, project: Option<&str>) -> Result<PathBuf> {
    Ok(destination.join(marker_file_name(project)?))
}
