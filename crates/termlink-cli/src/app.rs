//! Application state management.

use std::path::PathBuf;
use termlink_core::{Config, Corpus, CorpusOptions, Glossary, TermIndex};
use tracing::info;

/// Shared application state.
pub struct App {
    /// Configuration
    pub config: Config,

    /// The loaded glossary, in file order
    pub glossary: Glossary,

    /// Terms in application order
    pub index: TermIndex,
}

impl App {
    /// Create a new application instance.
    ///
    /// Loads the glossary and builds the term index. A missing or malformed
    /// glossary fails here, before any document is touched.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let glossary = Glossary::load(&config.glossary.path)?;
        let index = TermIndex::build(glossary.terms().iter().cloned());

        info!(
            glossary = %config.glossary.path.display(),
            terms = index.len(),
            "Application initialized"
        );

        Ok(App {
            config,
            glossary,
            index,
        })
    }

    /// The documentation corpus described by the configuration.
    pub fn corpus(&self, dry_run: bool) -> anyhow::Result<Corpus> {
        let mut options = CorpusOptions::from_config(&self.config)?;
        options.dry_run = dry_run;
        Ok(Corpus::new(options))
    }

    /// Source file of the definitions page
    pub fn definitions_source(&self) -> PathBuf {
        self.config.docs.dir.join(&self.config.glossary.source_page)
    }
}

/// Apply command-line path overrides to the configuration.
pub fn apply_overrides(config: &mut Config, glossary: Option<PathBuf>, docs: Option<PathBuf>) {
    if let Some(path) = glossary {
        config.glossary.path = path;
    }
    if let Some(dir) = docs {
        config.docs.dir = dir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        apply_overrides(&mut config, Some(PathBuf::from("terms.yaml")), None);
        assert_eq!(config.glossary.path, PathBuf::from("terms.yaml"));
        assert_eq!(config.docs.dir, PathBuf::from("docs"));

        apply_overrides(&mut config, None, Some(PathBuf::from("site")));
        assert_eq!(config.glossary.path, PathBuf::from("terms.yaml"));
        assert_eq!(config.docs.dir, PathBuf::from("site"));
    }

    #[test]
    fn test_new_loads_index() {
        let temp_dir = TempDir::new().unwrap();
        let glossary = temp_dir.path().join("lexicon.yaml");
        fs::write(&glossary, "- term: Guidance\n- term: Access Control\n").unwrap();

        let mut config = Config::default();
        config.glossary.path = glossary;
        config.docs.dir = temp_dir.path().to_path_buf();

        let app = App::new(config).unwrap();
        assert_eq!(app.index.len(), 2);
        assert_eq!(app.index.iter().next().unwrap().text(), "Access Control");
        assert_eq!(
            app.definitions_source(),
            temp_dir.path().join("model/02-definitions.md")
        );
    }

    #[test]
    fn test_new_missing_glossary() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.glossary.path = temp_dir.path().join("missing.yaml");
        assert!(App::new(config).is_err());
    }
}
