//! Priority-ordered term index.
//!
//! The `TermIndex` holds every glossary term together with its derived forms:
//!
//! - the case-folded text, for label lookups during cleanup and repair
//! - the slug, which is the anchor on the definitions page
//! - a compiled whole-word, case-insensitive matcher
//!
//! Terms are ordered by descending character length so compound terms are
//! linked before any of their substrings ("Preventive Enforcement" before
//! "Enforcement"). The sort is stable, so equal-length terms keep glossary
//! order and the application order is deterministic.

use crate::error::{Result, TermlinkError};
use crate::types::{slugify, Term};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A glossary term with its derived matching data.
#[derive(Debug, Clone)]
pub struct IndexedTerm {
    term: Term,
    lower: String,
    slug: String,
    matcher: Regex,
}

impl IndexedTerm {
    /// Compile a term.
    ///
    /// Fails only if the escaped pattern cannot be compiled, which pure text
    /// terms never trigger.
    pub fn compile(term: Term) -> Result<Self> {
        let pattern = format!(r"\b{}\b", regex::escape(&term.text));
        let matcher = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| TermlinkError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;

        Ok(IndexedTerm {
            lower: term.text.to_lowercase(),
            slug: slugify(&term.text),
            matcher,
            term,
        })
    }

    /// Canonical term text
    pub fn text(&self) -> &str {
        &self.term.text
    }

    /// Anchor slug
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Underlying glossary record
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Whole-word, case-insensitive matcher
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// Length used for priority ordering
    fn priority_len(&self) -> usize {
        self.term.text.chars().count()
    }
}

/// The term index, in application order.
#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    terms: Vec<IndexedTerm>,
    by_label: HashMap<String, usize>,
    by_slug: HashMap<String, usize>,
}

impl TermIndex {
    /// Build the index from glossary terms.
    ///
    /// Blank terms and terms whose matcher fails to compile are skipped with a
    /// warning instead of failing the whole build.
    pub fn build(terms: impl IntoIterator<Item = Term>) -> Self {
        let mut compiled = Vec::new();

        for term in terms {
            if term.text.trim().is_empty() {
                warn!("Skipping glossary entry with empty term text");
                continue;
            }
            match IndexedTerm::compile(term) {
                Ok(indexed) => compiled.push(indexed),
                Err(e) => warn!(error = %e, "Skipping term that cannot be matched"),
            }
        }

        // Stable: equal lengths keep glossary order
        compiled.sort_by_key(|t| std::cmp::Reverse(t.priority_len()));

        let mut by_label = HashMap::with_capacity(compiled.len());
        let mut by_slug = HashMap::with_capacity(compiled.len());
        for (i, term) in compiled.iter().enumerate() {
            by_label.entry(term.lower.clone()).or_insert(i);
            by_slug.entry(term.slug.clone()).or_insert(i);
        }

        debug!(terms = compiled.len(), "Term index built");

        TermIndex {
            terms: compiled,
            by_label,
            by_slug,
        }
    }

    /// Number of indexed terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if no terms are indexed
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in application order (longest first)
    pub fn iter(&self) -> impl Iterator<Item = &IndexedTerm> {
        self.terms.iter()
    }

    /// Look up a term by label, case-insensitively.
    pub fn lookup(&self, label: &str) -> Option<&IndexedTerm> {
        self.by_label
            .get(&label.to_lowercase())
            .map(|&i| &self.terms[i])
    }

    /// True if `slug` is the anchor of some term
    pub fn is_known_slug(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }

    /// Slug for a label: the known term's slug if the label names a term,
    /// otherwise a fresh slug of the label.
    pub fn slug_for_label(&self, label: &str) -> String {
        match self.lookup(label) {
            Some(term) => term.slug.clone(),
            None => slugify(label),
        }
    }
}

impl<'a> IntoIterator for &'a TermIndex {
    type Item = &'a IndexedTerm;
    type IntoIter = std::slice::Iter<'a, IndexedTerm>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(texts: &[&str]) -> TermIndex {
        TermIndex::build(texts.iter().map(|t| Term::new(*t)))
    }

    #[test]
    fn test_longest_first() {
        let index = index(&["Enforcement", "Preventive Enforcement", "Control"]);
        let order: Vec<&str> = index.iter().map(|t| t.text()).collect();
        assert_eq!(order, vec!["Preventive Enforcement", "Enforcement", "Control"]);
    }

    #[test]
    fn test_ties_keep_glossary_order() {
        let index = index(&["Beta", "Alfa", "Gamma"]);
        let order: Vec<&str> = index.iter().map(|t| t.text()).collect();
        assert_eq!(order, vec!["Gamma", "Beta", "Alfa"]);
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let index = index(&["Access Control"]);
        let term = index.lookup("ACCESS control").unwrap();
        assert_eq!(term.slug(), "access-control");
        assert!(index.lookup("Access").is_none());
    }

    #[test]
    fn test_duplicate_labels_first_wins() {
        let index = TermIndex::build(vec![
            Term::new("Policy").with_definition("first"),
            Term::new("policy").with_definition("second"),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("POLICY").unwrap().term().definition, "first");
    }

    #[test]
    fn test_blank_terms_skipped() {
        let index = index(&["", "   ", "Guideline"]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_matcher_is_whole_word() {
        let index = index(&["Control"]);
        let matcher = index.iter().next().unwrap().matcher();
        assert!(matcher.is_match("a control plane"));
        assert!(matcher.is_match("CONTROL"));
        assert!(!matcher.is_match("controls"));
        assert!(!matcher.is_match("uncontrolled"));
    }

    #[test]
    fn test_special_characters_are_literal() {
        let index = index(&["C.I. Pipeline"]);
        let matcher = index.iter().next().unwrap().matcher();
        assert!(matcher.is_match("the C.I. Pipeline runs"));
        assert!(!matcher.is_match("the CxIx Pipeline runs"));
    }

    #[test]
    fn test_slug_lookup() {
        let index = index(&["Control Catalog"]);
        assert!(index.is_known_slug("control-catalog"));
        assert!(!index.is_known_slug("catalog"));
        assert_eq!(index.slug_for_label("control catalog"), "control-catalog");
        assert_eq!(index.slug_for_label("Unknown Thing"), "unknown-thing");
    }
}
