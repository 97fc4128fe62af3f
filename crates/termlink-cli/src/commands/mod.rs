//! Subcommand implementations.

pub mod definitions;
pub mod lexicon;
pub mod link;
pub mod terms;
