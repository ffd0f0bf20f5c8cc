//! # Stanza Rendering
//!
//! Canonical text form of one permission stanza. Rendering is a pure
//! function: the same identifier and grants always produce byte-identical
//! lines, which is what makes the reconciler's "did anything change" check
//! an honest text comparison.

use crate::error::{Error, Result};

/// Render a grant line in canonical form: four-space indent, key padded to
/// the width of `RW+`, and the value omitted entirely when empty.
pub fn render_grant(key: &str, value: &str) -> String {
    let mut line = format!("    {:<3} =", key);
    if !value.is_empty() {
        line.push(' ');
        line.push_str(value);
    }
    line
}

/// Render a full stanza: header, read grant, write grant, blank separator.
pub fn render_stanza(identifier: &str, readers: &str, writers: &str) -> Vec<String> {
    vec![
        format!("repo {}", identifier),
        render_grant("R", readers),
        render_grant("RW+", writers),
        String::new(),
    ]
}

/// Check that an identifier can be written into the document grammar.
///
/// The reconciler treats identifiers as opaque strings; this only rejects
/// what would corrupt the stanza file or escape the mirror namespace.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    let fail = |message: &str| {
        Err(Error::InvalidIdentifier {
            identifier: identifier.to_string(),
            message: message.to_string(),
        })
    };

    if identifier.is_empty() {
        return fail("identifier is empty");
    }
    if identifier.chars().any(char::is_whitespace) {
        return fail("contains whitespace");
    }
    if let Some(bad) = identifier.chars().find(|c| matches!(c, '#' | '"' | '=')) {
        return fail(&format!("contains character {:?} reserved by the document grammar", bad));
    }
    if identifier.chars().any(char::is_control) {
        return fail("contains control characters");
    }
    if identifier.starts_with('/') {
        return fail("must be relative (no leading slash)");
    }
    if identifier.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return fail("contains an empty or dot path segment");
    }
    Ok(())
}
