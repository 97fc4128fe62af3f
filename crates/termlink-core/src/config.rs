//! Configuration management for Termlink.
//!
//! This module provides configuration loading, saving, and defaults.
//! Configuration is stored in TOML format in a platform-appropriate location.

use crate::error::{Result, TermlinkError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure for Termlink.
///
/// ## Example Configuration File (termlink.toml)
///
/// ```toml
/// [glossary]
/// path = "docs/lexicon.yaml"
/// page = "model/02-definitions.html"
/// source_page = "model/02-definitions.md"
///
/// [docs]
/// dir = "docs"
/// extension = "md"
/// exclude = ["drafts/**"]
///
/// [processing]
/// parallel = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glossary source and rendered page
    pub glossary: GlossaryConfig,

    /// Documentation corpus
    pub docs: DocsConfig,

    /// Processing options
    pub processing: ProcessingConfig,
}

/// Glossary configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlossaryConfig {
    /// YAML term list
    pub path: PathBuf,

    /// Rendered definitions page, relative to the docs directory.
    /// Links point here.
    pub page: PathBuf,

    /// Markdown source of the definitions page, relative to the docs
    /// directory. Never linked.
    pub source_page: PathBuf,
}

impl Default for GlossaryConfig {
    fn default() -> Self {
        GlossaryConfig {
            path: PathBuf::from("docs/lexicon.yaml"),
            page: PathBuf::from("model/02-definitions.html"),
            source_page: PathBuf::from("model/02-definitions.md"),
        }
    }
}

/// Documentation corpus configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Root of the Markdown tree
    pub dir: PathBuf,

    /// File extension of documents, without the dot
    pub extension: String,

    /// Glob patterns, relative to `dir`, of files to leave alone
    pub exclude: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        DocsConfig {
            dir: PathBuf::from("docs"),
            extension: "md".to_string(),
            exclude: Vec::new(),
        }
    }
}

/// Processing configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Process files on the rayon thread pool
    pub parallel: bool,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| TermlinkError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "termlink")
            .ok_or_else(|| TermlinkError::config("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("termlink.toml"))
    }

    /// Compile the exclusion globs.
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.docs
            .exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| TermlinkError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.glossary.path, PathBuf::from("docs/lexicon.yaml"));
        assert_eq!(config.glossary.page, PathBuf::from("model/02-definitions.html"));
        assert_eq!(config.docs.extension, "md");
        assert!(!config.processing.parallel);
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        fs::write(
            &config_path,
            "[docs]\ndir = \"site/docs\"\nexclude = [\"drafts/**\"]\n\n[processing]\nparallel = true\n",
        )
        .unwrap();

        let mut expected = Config::default();
        expected.docs.dir = PathBuf::from("site/docs");
        expected.docs.exclude = vec!["drafts/**".to_string()];
        expected.processing.parallel = true;

        let loaded = Config::load_from(&config_path).unwrap();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "[docs]\ndir = \"content\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.docs.dir, PathBuf::from("content"));
        assert_eq!(config.docs.extension, "md");
        assert_eq!(config.glossary, GlossaryConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[docs\ndir = ").unwrap();

        let result = Config::load_from(&config_path);
        assert!(matches!(result, Err(TermlinkError::ConfigError { .. })));
    }

    #[test]
    fn test_exclude_patterns() {
        let mut config = Config::default();
        config.docs.exclude = vec!["drafts/*.md".to_string()];
        let patterns = config.exclude_patterns().unwrap();
        assert!(patterns[0].matches("drafts/wip.md"));

        config.docs.exclude = vec!["[".to_string()];
        assert!(matches!(
            config.exclude_patterns(),
            Err(TermlinkError::InvalidPattern { .. })
        ));
    }
}
