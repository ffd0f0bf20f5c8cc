//! # Git Subprocess Helpers
//!
//! Thin wrappers over the system `git` binary, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig
//!
//! Callers get stdout on success and [`Error::GitCommand`] with the captured
//! stderr on failure; cloning has its own variant with an auth hint for the
//! common private-repo failures.

use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Run `git <args>` in `cwd`, returning trimmed stdout.
pub fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let mut command = Command::new("git");
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    debug!("git {}", args.join(" "));

    let output = command.output().map_err(|e| Error::GitCommand {
        command: args.join(" "),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Clone `url` into `target`, passing `extra` flags (e.g. `--mirror`).
///
/// Auth failures get a hint about SSH keys and credential helpers, since
/// that is the most common operator mistake.
pub fn clone(url: &str, target: &Path, extra: &[&str]) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut args = vec!["clone"];
    args.extend_from_slice(extra);
    args.push(url);
    let target_str = target.to_str().ok_or_else(|| Error::Path {
        message: format!("non-UTF-8 clone target: {}", target.display()),
    })?;
    args.push(target_str);

    match run_git(&args, None) {
        Ok(_) => Ok(()),
        Err(Error::GitCommand { stderr, .. }) => {
            let hint = if stderr.contains("Authentication failed")
                || stderr.contains("Permission denied")
                || stderr.contains("Could not read from remote repository")
            {
                Some(
                    "make sure you have access to the repository: an SSH key added to \
                     ssh-agent, git credentials configured, or a personal access token"
                        .to_string(),
                )
            } else {
                None
            };
            Err(Error::GitClone {
                url: url.to_string(),
                message: stderr,
                hint,
            })
        }
        Err(other) => Err(other),
    }
}

/// `git remote update --prune` in an existing repository.
pub fn remote_update(repo_dir: &Path) -> Result<()> {
    run_git(&["remote", "update", "--prune"], Some(repo_dir))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_git_version() {
        let out = run_git(&["--version"], None).unwrap();
        assert!(out.starts_with("git version"));
    }

    #[test]
    fn test_run_git_failure_captures_stderr() {
        let err = run_git(&["definitely-not-a-subcommand"], None).unwrap_err();
        match err {
            Error::GitCommand { command, stderr } => {
                assert_eq!(command, "definitely-not-a-subcommand");
                assert!(!stderr.is_empty());
            }
            other => panic!("expected GitCommand, got {other:?}"),
        }
    }

    #[test]
    fn test_clone_nonexistent_local_path_fails() {
        let temp = tempfile::tempdir().unwrap();
        let err = clone(
            temp.path().join("missing-origin").to_str().unwrap(),
            &temp.path().join("target"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::GitClone { .. }));
    }
}
