//! # Document Store Gateway
//!
//! Owns the local working copy of the gitolite-admin repository. Every run
//! starts from [`AdminRepo::materialize`], which is fetch-and-reset rather
//! than a passive cache: reconciling against a stale checkout would silently
//! discard concurrent remote changes. Persisting is a strict no-op when the
//! rendered document is byte-identical to what is already checked in, and a
//! rejected push surfaces as [`Error::ConcurrentModification`] — never a
//! force-push, never a silent retry.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::git::{self, run_git};

/// Default name of the included stanza file inside `conf/`.
pub const DEFAULT_CONF_FILE: &str = "mirrors.conf";

/// Banner written into a freshly bootstrapped stanza file.
const MANAGED_BANNER: &str = "# Managed by git-mirror\n";

/// What [`AdminRepo::persist`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Document already matched; nothing staged, committed or pushed.
    Unchanged,
    /// A commit was created and pushed to the remote.
    Committed,
}

/// A materialized working copy of the gitolite-admin repository.
#[derive(Debug)]
pub struct AdminRepo {
    workdir: PathBuf,
}

impl AdminRepo {
    /// Ensure a local clone of gitolite-admin exists at `workdir` and
    /// reflects the remote's current default branch.
    ///
    /// Clones when absent, then fetches and hard-resets onto `origin/master`
    /// or `origin/main`, whichever the remote has.
    pub fn materialize(remote_url: &str, workdir: &Path) -> Result<Self> {
        if !workdir.join(".git").exists() {
            info!("cloning admin repository {} into {}", remote_url, workdir.display());
            git::clone(remote_url, workdir, &[])?;
        }

        run_git(&["fetch", "--prune", "origin"], Some(workdir))?;
        for branch in ["master", "main"] {
            let remote_ref = format!("origin/{branch}");
            if run_git(&["rev-parse", "--verify", &remote_ref], Some(workdir)).is_ok() {
                run_git(&["checkout", "-B", branch, &remote_ref], Some(workdir))?;
                debug!("admin working copy reset to {}", remote_ref);
                return Ok(Self {
                    workdir: workdir.to_path_buf(),
                });
            }
        }

        Err(Error::AdminLayout {
            path: workdir.to_path_buf(),
            message: "origin has neither a master nor a main branch".to_string(),
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn conf_dir(&self) -> PathBuf {
        self.workdir.join("conf")
    }

    fn conf_path(&self, conf_file: &str) -> PathBuf {
        self.conf_dir().join(conf_file)
    }

    /// Idempotent bootstrap: make sure `conf/gitolite.conf` includes the
    /// stanza file, and that the stanza file exists.
    ///
    /// Fails when `conf/gitolite.conf` is missing, since that means this is
    /// not a gitolite-admin checkout.
    pub fn ensure_include(&self, conf_file: &str) -> Result<PathBuf> {
        let main_conf = self.conf_dir().join("gitolite.conf");
        if !main_conf.exists() {
            return Err(Error::AdminLayout {
                path: main_conf,
                message: "conf/gitolite.conf not found; is this a gitolite-admin checkout?"
                    .to_string(),
            });
        }

        let include_line = format!("include \"{conf_file}\"");
        let text = fs::read_to_string(&main_conf)?;
        if !text.lines().any(|line| line.trim() == include_line) {
            let mut text = text;
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&include_line);
            text.push('\n');
            fs::write(&main_conf, text)?;
            info!("added {} to conf/gitolite.conf", include_line);
        }

        let stanza_file = self.conf_path(conf_file);
        if !stanza_file.exists() {
            fs::write(&stanza_file, MANAGED_BANNER)?;
        }
        Ok(stanza_file)
    }

    /// Read the current stanza document text. Missing file reads as empty:
    /// a first run against a freshly bootstrapped store has no stanzas yet.
    pub fn read_document(&self, conf_file: &str) -> Result<String> {
        let path = self.conf_path(conf_file);
        if !path.exists() {
            return Ok(String::new());
        }
        Ok(fs::read_to_string(path)?)
    }

    /// Write `text` as the stanza document and publish it.
    ///
    /// Stages `conf/`, commits with `message` and pushes — but only when the
    /// working tree actually changed. A push rejected because the remote
    /// advanced is [`Error::ConcurrentModification`].
    pub fn persist(&self, conf_file: &str, text: &str, message: &str) -> Result<PersistOutcome> {
        let path = self.conf_path(conf_file);
        let current = if path.exists() {
            Some(fs::read_to_string(&path)?)
        } else {
            None
        };
        if current.as_deref() != Some(text) {
            fs::write(&path, text)?;
        }

        run_git(&["add", "conf"], Some(&self.workdir))?;
        let status = run_git(&["status", "--porcelain"], Some(&self.workdir))?;
        if status.is_empty() {
            debug!("document unchanged, skipping commit");
            return Ok(PersistOutcome::Unchanged);
        }

        run_git(&["commit", "-m", message], Some(&self.workdir))?;
        match run_git(&["push", "origin", "HEAD"], Some(&self.workdir)) {
            Ok(_) => {
                info!("pushed: {}", message);
                Ok(PersistOutcome::Committed)
            }
            Err(Error::GitCommand { stderr, .. }) if push_was_rejected(&stderr) => {
                Err(Error::ConcurrentModification {
                    message: format!("push rejected, re-run after re-materializing: {stderr}"),
                })
            }
            Err(other) => Err(other),
        }
    }
}

fn push_was_rejected(stderr: &str) -> bool {
    stderr.contains("[rejected]")
        || stderr.contains("non-fast-forward")
        || stderr.contains("fetch first")
        || stderr.contains("failed to push some refs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_rejection_detection() {
        assert!(push_was_rejected(
            "! [rejected]        master -> master (fetch first)"
        ));
        assert!(push_was_rejected(
            "error: failed to push some refs to 'origin'"
        ));
        assert!(!push_was_rejected("Permission denied (publickey)"));
    }

    // Gateway behavior against real (local, bare) remotes is covered in
    // tests/store_gateway.rs.
}
