//! Categorised lexicon pages.
//!
//! A lexicon groups entries into named categories under a metadata header:
//!
//! ```yaml
//! metadata:
//!   title: Compliance Lexicon
//!   version: "1.2"
//!   description: Shared vocabulary.
//! categories:
//!   - name: Roles
//!     terms:
//!       - entity: Operator
//!         definition: Runs the system.
//!         context: Layer 3
//!         source: NIST
//! ```
//!
//! It renders to a complete page with front matter and a single
//! `Entity | Definition | Context | Source` table, categories in file order.

use crate::corpus::write_atomic;
use crate::definitions::table_cell;
use crate::error::{Result, TermlinkError};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Version stamped on a page when neither the file nor the caller names one.
pub const DEFAULT_VERSION: &str = "dev";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub metadata: LexiconMetadata,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconMetadata {
    pub title: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub name: String,
    pub terms: Vec<Entry>,
}

/// One lexicon row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    pub entity: String,
    pub definition: String,
    pub context: String,
    pub source: String,
}

impl Lexicon {
    /// Load a lexicon file.
    pub fn load(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading lexicon");
        let contents = fs::read_to_string(path).map_err(|source| TermlinkError::LexiconRead {
            path: path.to_path_buf(),
            source,
        })?;

        let lexicon = Self::parse(&contents).map_err(|e| match e {
            TermlinkError::LexiconParse { reason, .. } => TermlinkError::LexiconParse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;

        debug!(
            categories = lexicon.categories.len(),
            entries = lexicon.len(),
            "Lexicon loaded"
        );
        Ok(lexicon)
    }

    /// Parse lexicon YAML text.
    pub fn parse(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Lexicon::default());
        }
        serde_yaml::from_str(contents).map_err(|e| TermlinkError::LexiconParse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })
    }

    /// Number of entries across all categories
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.terms.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the full page.
    ///
    /// `version` overrides the version in the file; with neither, the page
    /// says `dev`.
    pub fn render_page(&self, version: Option<&str>) -> String {
        let meta = &self.metadata;
        let version = version
            .filter(|v| !v.is_empty())
            .or(Some(meta.version.as_str()).filter(|v| !v.is_empty()))
            .unwrap_or(DEFAULT_VERSION);

        let mut page = String::new();
        page.push_str("---\nlayout: page\n---\n\n");
        let _ = writeln!(page, "# {}\n", meta.title.trim());
        let _ = writeln!(
            page,
            "**Version**: <span class=\"badge badge-version\">{}</span>\n",
            version
        );
        if !meta.description.trim().is_empty() {
            let _ = writeln!(page, "{}\n", meta.description.trim());
        }
        page.push_str("| Entity | Definition | Context | Source |\n");
        page.push_str("|--------|------------|---------|--------|\n");

        for entry in self.categories.iter().flat_map(|c| &c.terms) {
            let _ = writeln!(
                page,
                "| **{}** | {} | {} | {} |",
                table_cell(&entry.entity),
                table_cell(&entry.definition),
                table_cell(&entry.context),
                table_cell(&entry.source)
            );
        }

        page
    }

    /// Load `lexicon` and write its page to `output`.
    pub fn render_file(lexicon: &Path, output: &Path, version: Option<&str>) -> Result<usize> {
        let loaded = Self::load(lexicon)?;
        let page = loaded.render_page(version);

        write_atomic(output, &page).map_err(|source| TermlinkError::DocumentWrite {
            path: output.to_path_buf(),
            source,
        })?;

        info!(output = %output.display(), entries = loaded.len(), "Lexicon page written");
        Ok(loaded.len())
    }
}
