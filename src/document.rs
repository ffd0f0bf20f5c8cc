//! # Permission Document Model
//!
//! In-memory representation of a gitolite stanza file (`conf/mirrors.conf`):
//! an ordered sequence of raw lines plus a derived index mapping each
//! repository path to the line span of its stanza. Parsing is a pure
//! function of the text, and rendering the untouched parts back out is
//! byte-for-byte faithful — comments, blank lines and directives the parser
//! does not understand are preserved verbatim.
//!
//! A stanza looks like:
//!
//! ```text
//! repo mirrors/github.com/psf/requests.git
//!     R   = @all
//!     RW+ =
//! ```
//!
//! and extends from its `repo` header to the line before the next header (or
//! end of file), including any trailing blank separator.
//!
//! The index invariants are load-bearing for the reconciler:
//! - spans are disjoint and increasing in file order,
//! - at most one stanza per repository path; duplicates make the whole
//!   document [`Error::MalformedDocument`] rather than guessing which copy
//!   is authoritative.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Classification of a single document line.
///
/// This is the entire grammar the engine understands. Everything else is
/// [`LineKind::Other`] and is carried through untouched.
#[derive(Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `repo <path>` — starts a stanza. Holds the trimmed path token.
    Header(&'a str),
    /// A `repo` keyword with no path after it. Always malformed.
    BareHeader,
    /// `R = <readers>` — the read-grant line. Holds the trimmed value.
    ReadGrant(&'a str),
    /// `RW+ = <writers>` — the write-grant line. Holds the trimmed value.
    WriteGrant(&'a str),
    /// Empty or whitespace-only line.
    Blank,
    /// Anything else: comments, groups, custom directives.
    Other,
}

/// Classify one line of the document.
///
/// Keywords and grant keys are matched case-insensitively, mirroring what
/// gitolite itself accepts.
pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('#') {
        return LineKind::Other;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let keyword = parts.next().unwrap_or_default();
    if keyword.eq_ignore_ascii_case("repo") {
        return match parts.next().map(str::trim) {
            Some(path) if !path.is_empty() => LineKind::Header(path),
            _ => LineKind::BareHeader,
        };
    }

    if let Some((key, value)) = trimmed.split_once('=') {
        let key = key.trim();
        let value = value.trim();
        if key.eq_ignore_ascii_case("r") {
            return LineKind::ReadGrant(value);
        }
        if key.eq_ignore_ascii_case("rw+") {
            return LineKind::WriteGrant(value);
        }
    }

    LineKind::Other
}

/// Half-open line range `[start, end)` of one stanza.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// The parsed permission document.
///
/// Stanza bodies are only ever mutated through the methods below, which keep
/// the index in sync with the lines.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<String>,
    index: BTreeMap<String, Span>,
}

impl Document {
    /// Parse document text into lines plus a stanza index.
    ///
    /// Fails with [`Error::MalformedDocument`] on a `repo` header without a
    /// path, or on two stanzas sharing one path.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<String> = text.lines().map(str::to_owned).collect();
        let index = build_index(&lines)?;
        Ok(Self { lines, index })
    }

    /// Repository paths in document order is not guaranteed; iteration is in
    /// sorted (BTreeMap) order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    pub fn span(&self, identifier: &str) -> Option<Span> {
        self.index.get(identifier).copied()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render the document back to text.
    ///
    /// The inverse of [`Document::parse`] up to the trailing newline: a
    /// non-empty document always ends with exactly one `\n` after its last
    /// line.
    pub fn to_text(&self) -> String {
        if self.lines.is_empty() {
            String::new()
        } else {
            let mut text = self.lines.join("\n");
            text.push('\n');
            text
        }
    }

    /// Replace a single line in place. Does not shift spans.
    pub(crate) fn set_line(&mut self, index: usize, line: String) {
        self.lines[index] = line;
    }

    /// Insert a line, then rebuild the index since later spans shift.
    pub(crate) fn insert_line(&mut self, index: usize, line: String) -> Result<()> {
        self.lines.insert(index, line);
        self.reindex()
    }

    /// Append a rendered stanza at the end of the document, separated from
    /// prior content by exactly one blank line.
    pub(crate) fn append_stanza(&mut self, stanza: Vec<String>) -> Result<()> {
        if let Some(last) = self.lines.last() {
            if !last.trim().is_empty() {
                self.lines.push(String::new());
            }
        }
        self.lines.extend(stanza);
        self.reindex()
    }

    /// Remove a stanza's full line range, collapsing any resulting run of
    /// consecutive blank lines to a single blank line so repeated prunes do
    /// not accumulate whitespace.
    pub(crate) fn remove_stanza(&mut self, identifier: &str) -> Result<()> {
        let Some(span) = self.span(identifier) else {
            return Ok(());
        };
        self.lines.drain(span.start..span.end);

        let at = span.start;
        while at < self.lines.len()
            && self.lines[at].trim().is_empty()
            && (at == 0 || self.lines[at - 1].trim().is_empty())
        {
            self.lines.remove(at);
        }
        // A deleted final stanza leaves its blank separator dangling at EOF.
        if at >= self.lines.len() {
            while self
                .lines
                .last()
                .map(|l| l.trim().is_empty())
                .unwrap_or(false)
            {
                self.lines.pop();
            }
        }

        self.reindex()
    }

    fn reindex(&mut self) -> Result<()> {
        self.index = build_index(&self.lines)?;
        Ok(())
    }
}

fn build_index(lines: &[String]) -> Result<BTreeMap<String, Span>> {
    let mut headers: Vec<(usize, &str)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        match classify(line) {
            LineKind::Header(path) => headers.push((i, path)),
            LineKind::BareHeader => {
                return Err(Error::MalformedDocument {
                    line: i + 1,
                    message: "repo header without a repository path".to_string(),
                });
            }
            _ => {}
        }
    }

    let mut index = BTreeMap::new();
    for (n, &(start, path)) in headers.iter().enumerate() {
        let end = headers
            .get(n + 1)
            .map(|&(next, _)| next)
            .unwrap_or(lines.len());
        if index
            .insert(path.to_string(), Span { start, end })
            .is_some()
        {
            return Err(Error::MalformedDocument {
                line: start + 1,
                message: format!("duplicate stanza for {}", path),
            });
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Managed by git-mirror\n\
                          \n\
                          repo mirrors/github.com/psf/requests.git\n\
                          \x20   R   = @all\n\
                          \x20   RW+ =\n\
                          \n\
                          repo mirrors/gitlab.com/group/tool.git\n\
                          \x20   R   = @trusted\n\
                          \x20   RW+ =\n";

    #[test]
    fn test_classify_header() {
        assert_eq!(
            classify("repo mirrors/a/b.git"),
            LineKind::Header("mirrors/a/b.git")
        );
        assert_eq!(
            classify("  REPO mirrors/a/b.git  "),
            LineKind::Header("mirrors/a/b.git")
        );
        assert_eq!(classify("repo"), LineKind::BareHeader);
        assert_eq!(classify("repo   "), LineKind::BareHeader);
    }

    #[test]
    fn test_classify_grants() {
        assert_eq!(classify("    R   = @all"), LineKind::ReadGrant("@all"));
        assert_eq!(classify("r=alice,bob"), LineKind::ReadGrant("alice,bob"));
        assert_eq!(classify("    RW+ ="), LineKind::WriteGrant(""));
        assert_eq!(classify("    rw+ = admin"), LineKind::WriteGrant("admin"));
    }

    #[test]
    fn test_classify_other_and_blank() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify("   "), LineKind::Blank);
        assert_eq!(classify("# a comment"), LineKind::Other);
        assert_eq!(classify("@staff = alice bob"), LineKind::Other);
        // RW (without +) is not a grant line we manage
        assert_eq!(classify("    RW = carol"), LineKind::Other);
        assert_eq!(classify("config foo.bar = 1"), LineKind::Other);
    }

    #[test]
    fn test_parse_indexes_stanzas() {
        let doc = Document::parse(SAMPLE).unwrap();
        let ids: Vec<&str> = doc.identifiers().collect();
        assert_eq!(
            ids,
            vec![
                "mirrors/github.com/psf/requests.git",
                "mirrors/gitlab.com/group/tool.git"
            ]
        );
        assert_eq!(
            doc.span("mirrors/github.com/psf/requests.git"),
            Some(Span { start: 2, end: 6 })
        );
        assert_eq!(
            doc.span("mirrors/gitlab.com/group/tool.git"),
            Some(Span { start: 6, end: 9 })
        );
    }

    #[test]
    fn test_parse_empty_document() {
        let doc = Document::parse("").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.identifiers().count(), 0);
        assert_eq!(doc.to_text(), "");
    }

    #[test]
    fn test_parse_rejects_duplicate_stanza() {
        let text = "repo mirrors/a.git\n    R = @all\n\nrepo mirrors/a.git\n    R = @all\n";
        let err = Document::parse(text).unwrap_err();
        match err {
            Error::MalformedDocument { line, message } => {
                assert_eq!(line, 4);
                assert!(message.contains("duplicate"));
            }
            other => panic!("expected MalformedDocument, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bare_header() {
        let err = Document::parse("repo\n    R = @all\n").unwrap_err();
        match err {
            Error::MalformedDocument { line, .. } => assert_eq!(line, 1),
            other => panic!("expected MalformedDocument, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_is_stable() {
        let doc = Document::parse(SAMPLE).unwrap();
        let rendered = doc.to_text();
        assert_eq!(rendered, SAMPLE);
        let reparsed = Document::parse(&rendered).unwrap();
        assert_eq!(
            doc.identifiers().collect::<Vec<_>>(),
            reparsed.identifiers().collect::<Vec<_>>()
        );
        for id in doc.identifiers() {
            assert_eq!(doc.span(id), reparsed.span(id));
        }
    }

    #[test]
    fn test_append_stanza_adds_single_separator() {
        let mut doc = Document::parse("repo mirrors/a.git\n    R   = @all\n    RW+ =\n").unwrap();
        doc.append_stanza(vec![
            "repo mirrors/b.git".to_string(),
            "    R   = @all".to_string(),
            "    RW+ =".to_string(),
            String::new(),
        ])
        .unwrap();
        assert_eq!(
            doc.to_text(),
            "repo mirrors/a.git\n    R   = @all\n    RW+ =\n\nrepo mirrors/b.git\n    R   = @all\n    RW+ =\n\n"
        );
    }

    #[test]
    fn test_remove_stanza_collapses_blank_lines() {
        let doc = Document::parse(SAMPLE).unwrap();
        let mut pruned = doc.clone();
        pruned
            .remove_stanza("mirrors/github.com/psf/requests.git")
            .unwrap();
        let text = pruned.to_text();
        assert!(!text.contains("requests"));
        assert!(!text.contains("\n\n\n"), "double blank line left: {text:?}");
        assert!(text.contains("repo mirrors/gitlab.com/group/tool.git"));
    }

    #[test]
    fn test_remove_last_stanza_trims_trailing_blanks() {
        let text = "repo mirrors/a.git\n    R   = @all\n    RW+ =\n\nrepo mirrors/b.git\n    R   = @all\n    RW+ =\n";
        let mut doc = Document::parse(text).unwrap();
        doc.remove_stanza("mirrors/b.git").unwrap();
        assert_eq!(doc.to_text(), "repo mirrors/a.git\n    R   = @all\n    RW+ =\n");
    }
}
