//! # Reconciliation Engine
//!
//! Diffs the parsed permission document against the desired state derived
//! from the mirror root, and applies minimal, structure-preserving edits:
//!
//! 1. grant lines of present stanzas are rewritten in place when they drift
//!    from policy (header and unrecognized lines untouched),
//! 2. orphaned stanzas are pruned when requested, otherwise only reported,
//! 3. missing stanzas are appended in identifier sort order, so repeated
//!    runs produce byte-identical output regardless of scan order.
//!
//! Whether anything changed is decided by comparing rendered text before and
//! after, never by which steps ran.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::document::{classify, Document, LineKind};
use crate::error::Result;
use crate::stanza::{render_grant, render_stanza, validate_identifier};

/// Grant policy applied to every mirror stanza.
///
/// The write grant is always empty: nobody pushes to a mirror through
/// gitolite.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Reader grant value: a group token or comma-separated user list.
    pub readers: String,
    /// Remove stanzas whose mirrors no longer exist on disk.
    pub prune: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            readers: "@all".to_string(),
            prune: false,
        }
    }
}

/// What one reconciliation run did. Value-like; never mutated after the run.
#[derive(Debug, Default, Clone)]
pub struct Outcome {
    /// Stanzas appended for mirrors new on disk.
    pub added: Vec<String>,
    /// Existing stanzas whose grant lines drifted from policy.
    pub updated: Vec<String>,
    /// Stanzas removed because their mirrors are gone (prune only).
    pub pruned: Vec<String>,
    /// Stanzas without a mirror on disk, reported when pruning is off.
    pub orphaned: Vec<String>,
    /// Identifiers that could not be written, with the reason. These never
    /// abort the batch.
    pub skipped: Vec<(String, String)>,
    /// True iff the rendered document text differs from the input text.
    pub changed: bool,
}

impl Outcome {
    pub fn is_noop(&self) -> bool {
        !self.changed && self.skipped.is_empty()
    }
}

/// Reconcile `document` against `desired`, mutating it in place.
///
/// Idempotent: running twice with the same inputs yields `changed = false`
/// on the second run and byte-identical text across both.
pub fn reconcile(
    document: &mut Document,
    desired: &BTreeSet<String>,
    policy: &Policy,
) -> Result<Outcome> {
    let before = document.to_text();
    let existing: BTreeSet<String> = document.identifiers().map(str::to_owned).collect();
    let mut outcome = Outcome::default();

    // Field drift on stanzas that should stay.
    for identifier in desired.intersection(&existing) {
        if update_grants(document, identifier, &policy.readers)? {
            debug!("grant drift corrected for {}", identifier);
            outcome.updated.push(identifier.clone());
        }
    }

    // Stanzas whose mirrors are gone.
    let orphaned: Vec<String> = existing.difference(desired).cloned().collect();
    if policy.prune {
        for identifier in &orphaned {
            document.remove_stanza(identifier)?;
            debug!("pruned stanza for {}", identifier);
        }
        outcome.pruned = orphaned;
    } else {
        outcome.orphaned = orphaned;
    }

    // New mirrors, in identifier sort order (BTreeSet iteration).
    for identifier in desired.difference(&existing) {
        if let Err(err) = validate_identifier(identifier) {
            warn!("skipping {}: {}", identifier, err);
            outcome.skipped.push((identifier.clone(), err.to_string()));
            continue;
        }
        document.append_stanza(render_stanza(identifier, &policy.readers, ""))?;
        outcome.added.push(identifier.clone());
    }

    outcome.changed = document.to_text() != before;
    Ok(outcome)
}

/// Rewrite the read/write grant lines of one stanza when they differ from
/// policy. Grant lines missing from the stanza are inserted right after the
/// header. Returns whether the stanza text changed.
fn update_grants(document: &mut Document, identifier: &str, readers: &str) -> Result<bool> {
    let Some(span) = document.span(identifier) else {
        return Ok(false);
    };

    let mut read_line: Option<(usize, String)> = None;
    let mut write_line: Option<(usize, String)> = None;
    for i in span.start + 1..span.end {
        match classify(&document.lines()[i]) {
            LineKind::ReadGrant(value) if read_line.is_none() => {
                read_line = Some((i, value.to_string()));
            }
            LineKind::WriteGrant(value) if write_line.is_none() => {
                write_line = Some((i, value.to_string()));
            }
            _ => {}
        }
    }

    let mut changed = false;
    match read_line {
        Some((i, ref value)) if value != readers => {
            document.set_line(i, render_grant("R", readers));
            changed = true;
        }
        Some(_) => {}
        None => {
            document.insert_line(span.start + 1, render_grant("R", readers))?;
            changed = true;
        }
    }

    // Re-derive positions if an insert shifted the stanza body.
    match write_line {
        Some((i, ref value)) if !value.is_empty() => {
            let i = if read_line.is_none() { i + 1 } else { i };
            document.set_line(i, render_grant("RW+", ""));
            changed = true;
        }
        Some(_) => {}
        None => {
            let at = span.start + 2;
            document.insert_line(at, render_grant("RW+", ""))?;
            changed = true;
        }
    }

    Ok(changed)
}
