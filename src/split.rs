//! Source splitting for `.lazy` components.
//!
//! A component is a script region followed by a markup region. The boundary
//! is the first `<` that starts a line or follows whitespace; this is a
//! heuristic, so a script that begins a line with `<` splits early and the
//! mistake surfaces as a parse error from the script or template parser.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Line start or whitespace run, then an opening tag.
    static ref TEMPLATE_START_RE: Regex = Regex::new(r"(?m)(?:^|\s+)<").unwrap();
}

/// The two halves of one component source, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRegions<'a> {
    pub script: &'a str,
    pub template: &'a str,
}

/// Byte offset where the template region begins. Returns `source.len()` when
/// no template is present, so the whole text is script.
pub fn split_source(source: &str) -> usize {
    TEMPLATE_START_RE
        .find(source)
        .map(|m| m.start())
        .unwrap_or(source.len())
}

pub fn split_regions(source: &str) -> SourceRegions<'_> {
    let offset = split_source(source);
    let (script, template) = source.split_at(offset);
    SourceRegions { script, template }
}
