//! # Desired-State Scanner
//!
//! Walks a mirror root and derives, for every mirror found on disk, the
//! conf path that should carry its permission stanza. The output set is the
//! desired state one reconciliation run is driven by; it is rebuilt fresh
//! every run and never cached.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Detect a bare mirror directory: named `*.git` with the files a bare
/// repository always carries.
pub fn is_mirror_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(".git"))
            .unwrap_or(false)
        && path.join("config").exists()
        && path.join("HEAD").exists()
}

/// All mirror directories under `base_dir`, in walk order. The walk does not
/// descend into a mirror once detected.
pub fn mirror_dirs(base_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    if !base_dir.exists() {
        return Ok(dirs);
    }

    let mut walker = WalkDir::new(base_dir).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        if entry.file_type().is_dir() && is_mirror_dir(entry.path()) {
            dirs.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }
    Ok(dirs)
}

/// Result of scanning a mirror root.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Conf paths for every valid mirror found on disk.
    pub mirrors: BTreeSet<String>,
    /// Directories that look like mirrors but cannot be mapped to a conf
    /// path (outside the root, non-UTF-8). Skipped, never fatal.
    pub bad_layout: Vec<PathBuf>,
}

/// Build the desired-state set for `base_dir` under the given conf `prefix`.
pub fn scan_mirrors(base_dir: &Path, prefix: &str) -> Result<ScanReport> {
    let mut report = ScanReport::default();
    for dir in mirror_dirs(base_dir)? {
        match conf_path_for(base_dir, &dir, prefix) {
            Ok(path) => {
                report.mirrors.insert(path);
            }
            Err(err) => {
                warn!("skipping mirror with bad layout {}: {}", dir.display(), err);
                report.bad_layout.push(dir);
            }
        }
    }
    Ok(report)
}

/// Convert an on-disk mirror path into its conf path.
///
/// Example: `base=/srv/git/mirrors`, `repo=/srv/git/mirrors/github.com/psf/requests.git`
/// with prefix `mirrors` gives `mirrors/github.com/psf/requests.git`.
pub fn conf_path_for(base_dir: &Path, repo_dir: &Path, prefix: &str) -> Result<String> {
    let rel = repo_dir.strip_prefix(base_dir).map_err(|_| Error::Path {
        message: format!(
            "{} is not under mirror root {}",
            repo_dir.display(),
            base_dir.display()
        ),
    })?;

    let mut segments = Vec::new();
    for component in rel.iter() {
        let segment = component.to_str().ok_or_else(|| Error::Path {
            message: format!("non-UTF-8 path component in {}", repo_dir.display()),
        })?;
        segments.push(segment.to_string());
    }
    let Some(last) = segments.last_mut() else {
        return Err(Error::Path {
            message: format!("mirror path equals the mirror root: {}", base_dir.display()),
        });
    };
    if !last.ends_with(".git") {
        last.push_str(".git");
    }

    Ok(format!("{}/{}", prefix, segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Lay down a fake bare mirror: a `*.git` directory with config + HEAD.
    fn fake_mirror(base: &Path, rel: &str) {
        let dir = base.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config"), "[core]\n\tbare = true\n").unwrap();
        fs::write(dir.join("HEAD"), "ref: refs/heads/master\n").unwrap();
        fs::create_dir_all(dir.join("refs/heads")).unwrap();
    }

    #[test]
    fn test_is_mirror_dir() {
        let temp = tempfile::tempdir().unwrap();
        fake_mirror(temp.path(), "github.com/psf/requests.git");
        assert!(is_mirror_dir(
            &temp.path().join("github.com/psf/requests.git")
        ));
        // Missing HEAD/config
        fs::create_dir_all(temp.path().join("github.com/psf/empty.git")).unwrap();
        assert!(!is_mirror_dir(&temp.path().join("github.com/psf/empty.git")));
        // Not a .git directory
        assert!(!is_mirror_dir(&temp.path().join("github.com/psf")));
    }

    #[test]
    fn test_scan_finds_mirrors_recursively() {
        let temp = tempfile::tempdir().unwrap();
        fake_mirror(temp.path(), "github.com/psf/requests.git");
        fake_mirror(temp.path(), "gitlab.com/group/sub/repo.git");

        let report = scan_mirrors(temp.path(), "mirrors").unwrap();
        let mirrors: Vec<&str> = report.mirrors.iter().map(String::as_str).collect();
        assert_eq!(
            mirrors,
            vec![
                "mirrors/github.com/psf/requests.git",
                "mirrors/gitlab.com/group/sub/repo.git",
            ]
        );
        assert!(report.bad_layout.is_empty());
    }

    #[test]
    fn test_scan_does_not_descend_into_mirrors() {
        let temp = tempfile::tempdir().unwrap();
        fake_mirror(temp.path(), "github.com/a/outer.git");
        // A nested .git-looking dir inside a mirror must not be reported.
        fake_mirror(temp.path(), "github.com/a/outer.git/modules/inner.git");

        let report = scan_mirrors(temp.path(), "mirrors").unwrap();
        assert_eq!(report.mirrors.len(), 1);
        assert!(report.mirrors.contains("mirrors/github.com/a/outer.git"));
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let report = scan_mirrors(&temp.path().join("nope"), "mirrors").unwrap();
        assert!(report.mirrors.is_empty());
    }

    #[test]
    fn test_conf_path_for_appends_git_suffix() {
        let base = Path::new("/srv/git");
        let repo = Path::new("/srv/git/github.com/psf/requests");
        assert_eq!(
            conf_path_for(base, repo, "mirrors").unwrap(),
            "mirrors/github.com/psf/requests.git"
        );
    }

    #[test]
    fn test_conf_path_for_outside_root_fails() {
        let err = conf_path_for(
            Path::new("/srv/git"),
            Path::new("/elsewhere/repo.git"),
            "mirrors",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Path { .. }));
    }
}
