//! Error types for Termlink core operations.
//!
//! This module defines well-structured error types using `thiserror` for
//! library-level errors, while the CLI uses `anyhow` for convenient error
//! handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using TermlinkError
pub type Result<T> = std::result::Result<T, TermlinkError>;

/// Core error types for Termlink operations.
///
/// Setup errors (glossary, corpus root, configuration, templates) abort a run
/// before any document is touched. Document errors are recovered per file by
/// the corpus driver.
#[derive(Error, Debug)]
pub enum TermlinkError {
    // === Glossary Errors ===
    /// The glossary file could not be read
    #[error("failed to read glossary {path}: {source}")]
    GlossaryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The glossary file is not a valid term list
    #[error("failed to parse glossary {path}: {reason}")]
    GlossaryParse { path: PathBuf, reason: String },

    /// The categorised lexicon file could not be read
    #[error("failed to read lexicon {path}: {source}")]
    LexiconRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The categorised lexicon file is malformed
    #[error("failed to parse lexicon {path}: {reason}")]
    LexiconParse { path: PathBuf, reason: String },

    // === Corpus Errors ===
    /// The documentation directory could not be walked
    #[error("cannot read documentation directory {path}: {reason}")]
    CorpusUnreadable { path: PathBuf, reason: String },

    /// A single document could not be read
    #[error("failed to read {path}: {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single document could not be written back
    #[error("failed to write {path}: {source}")]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Pattern Errors ===
    /// Invalid pattern (term matcher or exclusion glob)
    #[error("invalid pattern: {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file parsing failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === Definitions Page Errors ===
    /// The definitions page template is unusable
    #[error("template error: {reason}")]
    Template { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TermlinkError {
    /// Returns true if this error must abort the whole run.
    ///
    /// Per-document read and write failures are recovered by the driver; all
    /// other errors happen during setup.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            TermlinkError::DocumentRead { .. } | TermlinkError::DocumentWrite { .. }
        )
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        TermlinkError::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a template error
    pub fn template(reason: impl Into<String>) -> Self {
        TermlinkError::Template {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fatal() {
        let err = TermlinkError::GlossaryParse {
            path: PathBuf::from("docs/lexicon.yaml"),
            reason: "expected a sequence".to_string(),
        };
        assert!(err.is_fatal());

        let err = TermlinkError::CorpusUnreadable {
            path: PathBuf::from("docs"),
            reason: "not found".to_string(),
        };
        assert!(err.is_fatal());

        let err = TermlinkError::DocumentWrite {
            path: PathBuf::from("docs/a.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_display_includes_path() {
        let err = TermlinkError::DocumentRead {
            path: PathBuf::from("docs/guide.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let message = err.to_string();
        assert!(message.contains("docs/guide.md"));
        assert!(message.contains("gone"));
    }
}
