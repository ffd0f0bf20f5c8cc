//! # git-mirror Library
//!
//! Core functionality for mirroring git repositories into a
//! `host/namespace/repo.git` layout and keeping a gitolite access-control
//! document in lockstep with what is actually on disk. The `git-mirror`
//! binary is a thin wrapper over this library.
//!
//! ## Quick Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use git_mirror::document::Document;
//! use git_mirror::reconcile::{reconcile, Policy};
//!
//! let mut doc = Document::parse("").unwrap();
//! let desired: BTreeSet<String> = ["mirrors/github.com/psf/requests.git"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! let outcome = reconcile(&mut doc, &desired, &Policy::default()).unwrap();
//! assert_eq!(outcome.added.len(), 1);
//! assert!(outcome.changed);
//! assert!(doc.to_text().contains("repo mirrors/github.com/psf/requests.git"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Document model (`document`)**: the parsed stanza file — raw lines
//!   plus an index of stanza spans. Parsing is pure; unrecognized content is
//!   preserved byte-for-byte.
//! - **Rendering (`stanza`)**: the canonical text form of a stanza, which is
//!   what makes "did anything change" an honest byte comparison.
//! - **Reconciliation (`reconcile`)**: set-diffs desired state against the
//!   document and applies minimal edits (add, correct drift, optionally
//!   prune).
//! - **Store gateway (`store`)**: the gitolite-admin working copy —
//!   materialize fresh, commit and push only on real change.
//! - **Desired state (`scan`, `repo_id`)**: filesystem walk of the mirror
//!   root and URL-to-layout mapping.
//! - **Mirror maintenance (`mirror`, `git`)**: clone/update of the mirrors
//!   themselves, including submodules.
//!
//! ## Execution Flow
//!
//! A `sync` run: materialize the admin working copy, bootstrap the include
//! once, parse the stanza document, scan the mirror root, reconcile, and
//! persist iff the rendered text changed. The whole edit happens in memory;
//! a crash mid-run leaves the working copy and the remote untouched.

pub mod config;
pub mod document;
pub mod error;
pub mod git;
pub mod mirror;
pub mod reconcile;
pub mod repo_id;
pub mod scan;
pub mod stanza;
pub mod store;
