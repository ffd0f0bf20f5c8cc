//! # Mirror Maintenance
//!
//! Clone upstream repositories as bare mirrors into the
//! `<base_dir>/<host>/<namespace...>/<repo>.git` layout and keep them fresh.
//! Per-repository fetch failures are collected, not fatal: one unreachable
//! upstream must not stop the rest of the fleet from updating.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;

use crate::error::Result;
use crate::git;
use crate::repo_id::parse_repo_id;
use crate::scan::mirror_dirs;

/// Marker file recording when `update-all` last completed.
pub const SYNC_MARKER: &str = ".last_sync";

/// Ensure `url` is mirror-cloned under `base_dir`; update it if it already
/// exists. Returns the mirror directory.
pub fn ensure_mirror(url: &str, base_dir: &Path) -> Result<PathBuf> {
    let rid = parse_repo_id(url)?;
    let target = rid.mirror_dir(base_dir);

    if target.exists() {
        info!("updating existing mirror {}", target.display());
        git::remote_update(&target)?;
    } else {
        info!("mirror-cloning {} into {}", url, target.display());
        git::clone(url, &target, &["--mirror"])?;
    }
    Ok(target)
}

/// Fetch updates for a single mirror repository.
pub fn fetch_mirror(repo_dir: &Path) -> Result<()> {
    git::remote_update(repo_dir)
}

/// Fetch every mirror under `base_dir`, collecting per-repo errors.
///
/// Returns `(repo_dir, error_message)` pairs where the message is `None` on
/// success.
pub fn fetch_all(base_dir: &Path) -> Result<Vec<(PathBuf, Option<String>)>> {
    let mut results = Vec::new();
    for repo in mirror_dirs(base_dir)? {
        match fetch_mirror(&repo) {
            Ok(()) => results.push((repo, None)),
            Err(err) => results.push((repo, Some(err.to_string()))),
        }
    }
    Ok(results)
}

/// Submodule URLs declared in `HEAD:.gitmodules` of a bare mirror.
///
/// Repositories without submodules (or without a readable `.gitmodules`
/// blob) yield an empty list rather than an error.
pub fn submodule_urls(repo_dir: &Path) -> Vec<String> {
    let git_dir = repo_dir.to_string_lossy();
    let output = git::run_git(
        &[
            "--git-dir",
            &git_dir,
            "config",
            "--blob",
            "HEAD:.gitmodules",
            "--get-regexp",
            r"submodule\..*\.url",
        ],
        None,
    );

    match output {
        Ok(stdout) => stdout
            .lines()
            .filter_map(|line| line.split_once(char::is_whitespace))
            .map(|(_, url)| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Mirror all submodules of `repo_dir` under `base_dir`, recursively.
pub fn mirror_submodules(repo_dir: &Path, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut mirrored = Vec::new();
    for url in submodule_urls(repo_dir) {
        let sub_repo = ensure_mirror(&url, base_dir)?;
        mirrored.push(sub_repo.clone());
        mirrored.extend(mirror_submodules(&sub_repo, base_dir)?);
    }
    Ok(mirrored)
}

/// Record the current time in the sync marker under `base_dir`.
pub fn record_sync_time(base_dir: &Path) -> Result<()> {
    fs::create_dir_all(base_dir)?;
    let stamp = Utc::now().to_rfc3339();
    fs::write(base_dir.join(SYNC_MARKER), format!("{stamp}\n"))?;
    Ok(())
}

/// Read the last recorded sync time, if any.
pub fn read_sync_time(base_dir: &Path) -> Result<Option<String>> {
    let marker = base_dir.join(SYNC_MARKER);
    if !marker.exists() {
        return Ok(None);
    }
    Ok(Some(fs::read_to_string(marker)?.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_marker_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(read_sync_time(temp.path()).unwrap(), None);

        record_sync_time(temp.path()).unwrap();
        let stamp = read_sync_time(temp.path()).unwrap().unwrap();
        // RFC 3339 with a date and a time separator
        assert!(stamp.contains('T'), "unexpected stamp format: {stamp}");
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_record_sync_time_creates_base_dir() {
        let temp = tempfile::tempdir().unwrap();
        let base = temp.path().join("deep/mirror/root");
        record_sync_time(&base).unwrap();
        assert!(base.join(SYNC_MARKER).exists());
    }

    #[test]
    fn test_submodule_urls_empty_for_non_repo() {
        let temp = tempfile::tempdir().unwrap();
        assert!(submodule_urls(temp.path()).is_empty());
    }
}
