//! Glossary loading.
//!
//! The glossary is a YAML sequence of term records:
//!
//! ```yaml
//! - term: Access Control
//!   definition: Restricting access to resources.
//!   references:
//!     - Layer 1
//! ```

use crate::error::{Result, TermlinkError};
use crate::types::Term;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The loaded glossary, in file order.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    terms: Vec<Term>,
    source: Option<PathBuf>,
}

impl Glossary {
    /// Create a glossary from terms already in memory.
    pub fn new(terms: Vec<Term>) -> Self {
        Glossary {
            terms,
            source: None,
        }
    }

    /// Load a glossary file.
    ///
    /// Read and parse failures are setup errors and abort the run.
    pub fn load(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading glossary");
        let contents = fs::read_to_string(path).map_err(|source| TermlinkError::GlossaryRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut glossary = Self::parse(&contents).map_err(|e| match e {
            TermlinkError::GlossaryParse { reason, .. } => TermlinkError::GlossaryParse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        glossary.source = Some(path.to_path_buf());

        debug!(terms = glossary.len(), "Glossary loaded");
        Ok(glossary)
    }

    /// Parse glossary YAML text.
    pub fn parse(contents: &str) -> Result<Self> {
        // An empty file is an empty glossary, not a parse error.
        if contents.trim().is_empty() {
            return Ok(Glossary::default());
        }

        let terms: Vec<Term> =
            serde_yaml::from_str(contents).map_err(|e| TermlinkError::GlossaryParse {
                path: PathBuf::new(),
                reason: e.to_string(),
            })?;

        Ok(Glossary::new(terms))
    }

    /// Terms in file order
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Path the glossary was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if there are no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl IntoIterator for Glossary {
    type Item = Term;
    type IntoIter = std::vec::IntoIter<Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
- term: Access Control
  definition: Restricting who may use a resource.
  references:
    - Layer 1
- term: Preventive Enforcement
  definition: Blocking a non-compliant change before it lands.
  references: [Layer 5, Layer 2]
- term: Enforcement
"#;

    #[test]
    fn test_parse() {
        let glossary = Glossary::parse(SAMPLE).unwrap();
        assert_eq!(glossary.len(), 3);
        assert_eq!(glossary.terms()[0].text, "Access Control");
        assert_eq!(glossary.terms()[1].reference_tags, vec!["Layer 5", "Layer 2"]);
        assert!(glossary.terms()[2].definition.is_empty());
    }

    #[test]
    fn test_parse_empty() {
        let glossary = Glossary::parse("   \n").unwrap();
        assert!(glossary.is_empty());
    }

    #[test]
    fn test_parse_rejects_mapping() {
        let result = Glossary::parse("title: not a list\n");
        assert!(matches!(result, Err(TermlinkError::GlossaryParse { .. })));
    }

    #[test]
    fn test_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lexicon.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let glossary = Glossary::load(&path).unwrap();
        assert_eq!(glossary.len(), 3);
        assert_eq!(glossary.source(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = Glossary::load(&temp_dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(TermlinkError::GlossaryRead { .. })));
    }

    #[test]
    fn test_load_parse_error_carries_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.yaml");
        std::fs::write(&path, "- term: [unterminated\n").unwrap();

        match Glossary::load(&path) {
            Err(TermlinkError::GlossaryParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
