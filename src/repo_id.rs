//! # Repository Identity
//!
//! Maps a git remote URL onto the mirror layout:
//!
//! ```text
//! <base_dir>/<host>/<namespace...>/<repo>.git
//! ```
//!
//! Examples:
//! - `https://github.com/numpy/numpy.git`  -> `base/github.com/numpy/numpy.git`
//! - `git@github.com:torvalds/linux.git`   -> `base/github.com/torvalds/linux.git`
//! - `https://gitlab.com/group/sub/repo`   -> `base/gitlab.com/group/sub/repo.git`
//!
//! Multi-segment namespaces (GitLab subgroups) are preserved in full; the
//! reconciliation engine itself never re-derives identity from these parts —
//! once a conf path is built it is treated as an opaque string.

use std::path::{Path, PathBuf};

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

const SSH_SCHEME_PATTERN: &str =
    r"^(?P<user>[A-Za-z0-9._-]+)@(?P<host>[A-Za-z0-9._-]+):(?P<path>.+)$";

/// Identity of a mirrored repository: host plus the full namespace path.
///
/// `segments` is never empty; the last segment is the repository name
/// without a `.git` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub host: String,
    pub segments: Vec<String>,
}

impl RepoId {
    /// First namespace segment (user or organization).
    pub fn owner(&self) -> &str {
        &self.segments[0]
    }

    /// Repository name, without `.git`.
    pub fn name(&self) -> &str {
        self.segments.last().expect("segments is never empty")
    }

    /// On-disk mirror directory under `base_dir`.
    pub fn mirror_dir(&self, base_dir: &Path) -> PathBuf {
        let mut dir = base_dir.join(&self.host);
        for segment in &self.segments[..self.segments.len() - 1] {
            dir = dir.join(segment);
        }
        dir.join(format!("{}.git", self.name()))
    }

    /// Gitolite-visible path for this mirror (matches the on-disk layout).
    pub fn conf_path(&self, prefix: &str) -> String {
        let mut path = format!("{}/{}", prefix, self.host);
        for segment in &self.segments[..self.segments.len() - 1] {
            path.push('/');
            path.push_str(segment);
        }
        path.push('/');
        path.push_str(self.name());
        path.push_str(".git");
        path
    }
}

fn strip_git_suffix(name: &str) -> &str {
    name.strip_suffix(".git").unwrap_or(name)
}

fn split_segments(url: &str, path: &str) -> Result<Vec<String>> {
    let mut segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();

    let Some(last) = segments.last_mut() else {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
            message: "empty repository path".to_string(),
        });
    };
    *last = strip_git_suffix(last).to_string();
    if last.is_empty() || last == "." || last == ".." {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
            message: format!("suspicious repository segment in path {:?}", path),
        });
    }
    Ok(segments)
}

/// Parse a git remote URL (ssh-like or scheme-based) into a [`RepoId`].
pub fn parse_repo_id(url: &str) -> Result<RepoId> {
    // SSH style: git@host:owner/repo(.git)
    let ssh = Regex::new(SSH_SCHEME_PATTERN)?;
    if let Some(captures) = ssh.captures(url) {
        let host = captures["host"].to_string();
        let segments = split_segments(url, &captures["path"])?;
        return Ok(RepoId { host, segments });
    }

    // Scheme style: https://host/owner/repo(.git)
    if url.contains("://") {
        let parsed = Url::parse(url)?;
        match parsed.scheme() {
            "http" | "https" | "ssh" | "git" => {}
            scheme => {
                return Err(Error::InvalidUrl {
                    url: url.to_string(),
                    message: format!("unsupported scheme {:?}", scheme),
                });
            }
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::InvalidUrl {
                url: url.to_string(),
                message: "missing host".to_string(),
            })?
            .to_string();
        let segments = split_segments(url, parsed.path())?;
        return Ok(RepoId { host, segments });
    }

    Err(Error::InvalidUrl {
        url: url.to_string(),
        message: "expected ssh-like (git@host:path) or scheme-based URL".to_string(),
    })
}
