//! # Error Handling
//!
//! Centralized error type for git-mirror, built with `thiserror`.
//!
//! Two classes of failure matter to callers:
//!
//! - **Fatal for the run**: [`Error::MalformedDocument`],
//!   [`Error::ConcurrentModification`] and the git/transport variants. A
//!   reconciliation run never partially applies after one of these; the
//!   remote document is left untouched.
//! - **Per-identifier**: [`Error::InvalidIdentifier`] is collected into the
//!   reconciliation outcome and skipped; it never aborts the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for git-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// The permission document could not be parsed, or violates the
    /// one-block-per-identifier invariant.
    ///
    /// `line` is 1-based. Never auto-repaired: a document we cannot fully
    /// understand must not be rewritten.
    #[error("Malformed document at line {line}: {message}")]
    MalformedDocument { line: usize, message: String },

    /// A repository identifier cannot be expressed in the document grammar.
    ///
    /// Collected per identifier during reconciliation; does not abort the
    /// batch.
    #[error("Invalid repository identifier {identifier:?}: {message}")]
    InvalidIdentifier { identifier: String, message: String },

    /// The remote advanced past the local working copy while we were
    /// reconciling. The correct recovery is to re-materialize and re-run,
    /// never a force-push.
    #[error("Remote changed during persist: {message}")]
    ConcurrentModification { message: String },

    /// An error occurred while cloning a git repository.
    #[error("Git clone error for {url}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// An error occurred while executing a git command.
    #[error("Git command failed: git {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// The admin working copy does not look like a gitolite-admin checkout.
    #[error("Admin repository layout error: {message} ({})", path.display())]
    AdminLayout { path: PathBuf, message: String },

    /// A git remote URL that cannot be parsed into a mirror path.
    #[error("Unsupported or malformed git URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A settings-file error, wrapped from `ini::Error`.
    #[error("Settings file error: {0}")]
    Settings(#[from] ini::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_malformed_document() {
        let error = Error::MalformedDocument {
            line: 7,
            message: "duplicate stanza for mirrors/a/b.git".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("line 7"));
        assert!(display.contains("duplicate stanza"));
    }

    #[test]
    fn test_error_display_git_clone_with_hint() {
        let error = Error::GitClone {
            url: "https://github.com/test/repo.git".to_string(),
            message: "Authentication failed".to_string(),
            hint: Some("Check SSH keys".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git clone error"));
        assert!(display.contains("hint:"));
        assert!(display.contains("Check SSH keys"));
    }

    #[test]
    fn test_error_display_concurrent_modification() {
        let error = Error::ConcurrentModification {
            message: "push rejected (non-fast-forward)".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Remote changed during persist"));
        assert!(display.contains("non-fast-forward"));
    }

    #[test]
    fn test_error_display_invalid_identifier() {
        let error = Error::InvalidIdentifier {
            identifier: "mirrors/a b".to_string(),
            message: "contains whitespace".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("mirrors/a b"));
        assert!(display.contains("contains whitespace"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "push origin HEAD".to_string(),
            stderr: "Permission denied".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git command failed"));
        assert!(display.contains("push origin HEAD"));
        assert!(display.contains("Permission denied"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }
}
