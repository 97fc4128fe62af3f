//! # Termlink Core Library
//!
//! This crate provides glossary loading, term indexing, and the link rewriting
//! engine for the Termlink documentation tool. Everything here works on
//! in-memory text except the corpus driver, which owns file discovery and
//! write-back.
//!
//! ## Architecture
//!
//! - **Glossary** (`glossary`): YAML term list loading
//! - **Index** (`index`): Priority-ordered terms with compiled matchers
//! - **Regions** (`regions`): Skip ranges where links must never be inserted
//! - **Linker** (`linker`): Term-by-term link insertion
//! - **Repair** (`repair`): Normalization of artifacts from earlier runs
//! - **Cleanup** (`cleanup`): Removal of generated links
//! - **Corpus** (`corpus`): Docs tree discovery and per-file processing
//! - **Definitions** (`definitions`): Glossary page rendering
//! - **Lexicon** (`lexicon`): Categorised lexicon page rendering
//! - **Config** (`config`): Configuration management
//!
//! ## Example
//!
//! ```rust,ignore
//! use termlink_core::{insert_links, Glossary, TermIndex};
//!
//! let glossary = Glossary::load("docs/lexicon.yaml".as_ref())?;
//! let index = TermIndex::build(glossary);
//!
//! let linked = insert_links("See Access Control.", &index, "model/02-definitions.html");
//! println!("{}", linked.text);
//! ```

pub mod cleanup;
pub mod config;
pub mod corpus;
pub mod definitions;
pub mod error;
pub mod glossary;
pub mod index;
pub mod lexicon;
pub mod linker;
pub mod links;
pub mod regions;
pub mod repair;
pub mod types;

// Re-export commonly used types
pub use cleanup::{remove_links, Removal};
pub use config::Config;
pub use corpus::{Corpus, CorpusOptions, FileOutcome, FileStatus, Mode, RunReport};
pub use definitions::{render_page, render_table};
pub use error::{Result, TermlinkError};
pub use glossary::Glossary;
pub use index::{IndexedTerm, TermIndex};
pub use lexicon::Lexicon;
pub use linker::{insert_links, Insertion};
pub use regions::{classify, Regions};
pub use repair::{repair, Repair};
pub use types::{slugify, RegionKind, SkipRange, Term};
