//! Documentation corpus driver.
//!
//! Discovers the Markdown files under the docs directory, computes each file's
//! relative path to the definitions page, and runs link insertion or cleanup
//! on every file. Files are processed in sorted path order, sequentially or on
//! the rayon pool. Read and write failures are recorded per file and never
//! stop the batch.

use crate::cleanup::remove_links;
use crate::config::Config;
use crate::error::{Result, TermlinkError};
use crate::index::TermIndex;
use crate::linker::insert_links;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What a run does to each file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Insert glossary links
    Link,
    /// Remove generated glossary links
    Cleanup,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Link => write!(f, "link"),
            Mode::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// Outcome for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Changed,
    Unchanged,
    Failed,
}

/// Per-file result
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Links added (link mode) or removed (cleanup mode)
    pub links: usize,
    /// Artifacts repaired before linking
    pub repairs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    fn failed(path: &Path, error: &TermlinkError) -> Self {
        FileOutcome {
            path: path.to_path_buf(),
            status: FileStatus::Failed,
            links: 0,
            repairs: 0,
            error: Some(error.to_string()),
        }
    }
}

/// Summary of a corpus run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files: Vec<FileOutcome>,
}

impl RunReport {
    /// Number of files discovered
    pub fn files_seen(&self) -> usize {
        self.files.len()
    }

    /// Files rewritten (or that would be, in a dry run)
    pub fn changed(&self) -> usize {
        self.count(FileStatus::Changed)
    }

    pub fn unchanged(&self) -> usize {
        self.count(FileStatus::Unchanged)
    }

    /// Files processed without error
    pub fn processed(&self) -> usize {
        self.changed() + self.unchanged()
    }

    /// Files that could not be read or written
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.status == FileStatus::Failed)
    }

    pub fn failed(&self) -> usize {
        self.count(FileStatus::Failed)
    }

    /// Links added or removed across all files
    pub fn links(&self) -> usize {
        self.files.iter().map(|f| f.links).sum()
    }

    pub fn repairs(&self) -> usize {
        self.files.iter().map(|f| f.repairs).sum()
    }

    /// Wall-clock duration of the run
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }
}

/// Corpus driver settings
#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// Root of the Markdown tree
    pub docs_dir: PathBuf,
    /// Rendered definitions page, relative to `docs_dir`
    pub glossary_page: PathBuf,
    /// Markdown source of the definitions page, relative to `docs_dir`
    pub source_page: PathBuf,
    /// Document extension, without the dot
    pub extension: String,
    /// Files to skip, matched against paths relative to `docs_dir`
    pub exclude: Vec<glob::Pattern>,
    pub parallel: bool,
    /// Compute changes without writing them
    pub dry_run: bool,
}

impl CorpusOptions {
    /// Options for a docs directory with the default layout.
    pub fn new(docs_dir: impl Into<PathBuf>) -> Self {
        let defaults = Config::default();
        CorpusOptions {
            docs_dir: docs_dir.into(),
            glossary_page: defaults.glossary.page,
            source_page: defaults.glossary.source_page,
            extension: defaults.docs.extension,
            exclude: Vec::new(),
            parallel: false,
            dry_run: false,
        }
    }

    /// Options from a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(CorpusOptions {
            docs_dir: config.docs.dir.clone(),
            glossary_page: config.glossary.page.clone(),
            source_page: config.glossary.source_page.clone(),
            extension: config.docs.extension.trim_start_matches('.').to_string(),
            exclude: config.exclude_patterns()?,
            parallel: config.processing.parallel,
            dry_run: false,
        })
    }
}

/// The documentation corpus.
pub struct Corpus {
    options: CorpusOptions,
}

impl Corpus {
    pub fn new(options: CorpusOptions) -> Self {
        Corpus { options }
    }

    /// Find all documents to process, sorted by path.
    ///
    /// An unreadable docs directory is fatal. Unreadable entries below it are
    /// skipped with a warning.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let root = &self.options.docs_dir;
        if !root.is_dir() {
            return Err(TermlinkError::CorpusUnreadable {
                path: root.clone(),
                reason: "not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(TermlinkError::CorpusUnreadable {
                        path: root.clone(),
                        reason: e.to_string(),
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_document(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!(files = files.len(), dir = %root.display(), "Discovered documents");
        Ok(files)
    }

    fn is_document(&self, path: &Path) -> bool {
        if path.extension() != Some(OsStr::new(&self.options.extension)) {
            return false;
        }
        let rel = path.strip_prefix(&self.options.docs_dir).unwrap_or(path);
        if rel.ends_with(&self.options.source_page) || rel.ends_with(&self.options.glossary_page) {
            return false;
        }
        !self.options.exclude.iter().any(|p| p.matches_path(rel))
    }

    /// Relative link from a document to the definitions page.
    pub fn glossary_link_for(&self, file: &Path) -> String {
        match file.strip_prefix(&self.options.docs_dir) {
            Ok(rel) => relative_link(
                rel.parent().unwrap_or(Path::new("")),
                &self.options.glossary_page,
            ),
            Err(_) => format!("/{}", posix_path(&self.options.glossary_page)),
        }
    }

    /// Run insertion or cleanup over the whole corpus.
    pub fn run(&self, index: &TermIndex, mode: Mode) -> Result<RunReport> {
        let started_at = Utc::now();
        let files = self.discover()?;

        info!(
            mode = %mode,
            files = files.len(),
            dry_run = self.options.dry_run,
            "Processing documents"
        );

        let outcomes: Vec<FileOutcome> = if self.options.parallel {
            files.par_iter().map(|f| self.process(f, index, mode)).collect()
        } else {
            files.iter().map(|f| self.process(f, index, mode)).collect()
        };

        let report = RunReport {
            mode,
            dry_run: self.options.dry_run,
            started_at,
            finished_at: Utc::now(),
            files: outcomes,
        };

        info!(
            processed = report.processed(),
            changed = report.changed(),
            failed = report.failed(),
            links = report.links(),
            repairs = report.repairs(),
            elapsed_ms = report.elapsed().num_milliseconds(),
            "Run complete"
        );

        Ok(report)
    }

    fn process(&self, path: &Path, index: &TermIndex, mode: Mode) -> FileOutcome {
        match self.transform(path, index, mode) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to process document");
                FileOutcome::failed(path, &e)
            }
        }
    }

    fn transform(&self, path: &Path, index: &TermIndex, mode: Mode) -> Result<FileOutcome> {
        let original = fs::read_to_string(path).map_err(|source| TermlinkError::DocumentRead {
            path: path.to_path_buf(),
            source,
        })?;

        let link = self.glossary_link_for(path);
        let (text, links, repairs) = match mode {
            Mode::Link => {
                let insertion = insert_links(&original, index, &link);
                (insertion.text, insertion.links_added, insertion.repairs)
            }
            Mode::Cleanup => {
                let removal = remove_links(&original, index, &link);
                (removal.text, removal.links_removed, 0)
            }
        };

        let status = if text == original {
            FileStatus::Unchanged
        } else {
            if !self.options.dry_run {
                write_atomic(path, &text).map_err(|source| TermlinkError::DocumentWrite {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            FileStatus::Changed
        };

        debug!(path = %path.display(), ?status, links, repairs, "Processed document");

        Ok(FileOutcome {
            path: path.to_path_buf(),
            status,
            links,
            repairs,
            error: None,
        })
    }
}

/// POSIX-style relative path from directory `from_dir` to file `target`.
///
/// Both paths are relative to the same root: a file in `sub` reaching
/// `model/02-definitions.html` gets `../model/02-definitions.html`.
pub fn relative_link(from_dir: &Path, target: &Path) -> String {
    let from = normal_components(from_dir);
    let to = normal_components(target);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - common];
    parts.extend(to[common..].iter().cloned());
    parts.join("/")
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn posix_path(path: &Path) -> String {
    normal_components(path).join("/")
}

/// Replace a file's contents atomically.
///
/// Writes a sibling temp file, copies the original permissions, then renames
/// over the target. On failure the original is untouched and the temp file is
/// removed.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let name = path.file_name().unwrap_or_else(|| OsStr::new("document"));
    let temp_path = path.with_file_name(format!(".{}.termlink.tmp", name.to_string_lossy()));

    let result = (|| {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(contents.as_bytes())?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        if let Ok(meta) = fs::metadata(path) {
            fs::set_permissions(&temp_path, meta.permissions())?;
        }
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
