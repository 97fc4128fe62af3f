//! Core data types for Termlink.
//!
//! This module defines the fundamental data structures shared by the term
//! index, the region classifier and the rewriting engines:
//!
//! - **Term**: a glossary record as loaded from disk
//! - **SkipRange**: a byte interval of a document that must not receive links
//! - **slugify**: the anchor function shared by links and the definitions page

use serde::{Deserialize, Serialize};
use std::fmt;

/// A glossary entry.
///
/// This is the record format of the glossary file. Derived values (slug,
/// case-folded text, matcher) live in the term index, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Canonical term text (e.g., "Access Control")
    #[serde(rename = "term")]
    pub text: String,

    /// Human-readable definition
    #[serde(default)]
    pub definition: String,

    /// Classification tags (e.g., "Layer 1"); the first one is shown on the
    /// definitions page
    #[serde(default, rename = "references")]
    pub reference_tags: Vec<String>,
}

impl Term {
    /// Create a term with no definition or references
    pub fn new(text: impl Into<String>) -> Self {
        Term {
            text: text.into(),
            definition: String::new(),
            reference_tags: Vec::new(),
        }
    }

    /// Set the definition
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    /// Add a reference tag
    pub fn with_reference(mut self, tag: impl Into<String>) -> Self {
        self.reference_tags.push(tag.into());
        self
    }

    /// The URL anchor for this term
    pub fn slug(&self) -> String {
        slugify(&self.text)
    }

    /// First reference tag, if any
    pub fn primary_reference(&self) -> Option<&str> {
        self.reference_tags.first().map(String::as_str)
    }
}

/// Convert term text into its URL anchor.
///
/// Lowercase, spaces become hyphens, and everything that is not a letter,
/// digit or hyphen is dropped. The definitions page emits the same anchors,
/// so this must stay a pure function of the text.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' => Some('-'),
            c if c.is_alphabetic() || c.is_numeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Why a range of a document is excluded from linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// An existing link (inline, reference-style, autolink or bare URL)
    Link,
    /// Front matter, fenced code block or inline code span
    Code,
    /// An HTML tag itself
    HtmlTag,
    /// Everything between a matched pair of HTML tags
    HtmlContent,
    /// A heading line
    Heading,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegionKind::Link => "link",
            RegionKind::Code => "code",
            RegionKind::HtmlTag => "html-tag",
            RegionKind::HtmlContent => "html-content",
            RegionKind::Heading => "heading",
        };
        f.write_str(name)
    }
}

/// A half-open byte interval `[start, end)` that must not receive new links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkipRange {
    pub start: usize,
    pub end: usize,
    pub kind: RegionKind,
}

impl SkipRange {
    /// Create a new skip range
    pub fn new(start: usize, end: usize, kind: RegionKind) -> Self {
        SkipRange { start, end, kind }
    }

    /// True if `[start, end)` overlaps this range at all
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && end > self.start
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for an empty interval
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Access Control"), "access-control");
        assert_eq!(slugify("Preventive Enforcement"), "preventive-enforcement");
        assert_eq!(slugify("Control-Catalog"), "control-catalog");
        assert_eq!(slugify("CI/CD Pipeline"), "cicd-pipeline");
        assert_eq!(slugify("Layer 2 (Controls)"), "layer-2-controls");
        assert_eq!(slugify("Überprüfung"), "überprüfung");
    }

    #[test]
    fn test_term_slug_matches_slugify() {
        let term = Term::new("Threat Model").with_reference("Layer 2");
        assert_eq!(term.slug(), "threat-model");
        assert_eq!(term.primary_reference(), Some("Layer 2"));
    }

    #[test]
    fn test_term_deserialize_defaults() {
        let term: Term = serde_yaml::from_str("term: Guideline\n").unwrap();
        assert_eq!(term.text, "Guideline");
        assert!(term.definition.is_empty());
        assert!(term.reference_tags.is_empty());
    }

    #[test]
    fn test_skip_range_overlap() {
        let range = SkipRange::new(10, 20, RegionKind::Code);
        assert!(range.overlaps(5, 11));
        assert!(range.overlaps(19, 25));
        assert!(range.overlaps(12, 15));
        assert!(range.overlaps(0, 30));
        assert!(!range.overlaps(0, 10));
        assert!(!range.overlaps(20, 25));
        assert_eq!(range.len(), 10);
    }

    #[test]
    fn test_region_kind_display() {
        assert_eq!(RegionKind::HtmlContent.to_string(), "html-content");
        assert_eq!(RegionKind::Link.to_string(), "link");
    }
}
