//! Lexicon command - compile a categorised lexicon into a standalone page.

use std::path::Path;
use termlink_core::Lexicon;

/// Run the lexicon command.
pub fn run(lexicon: &Path, output: &Path, version: Option<&str>) -> anyhow::Result<()> {
    let entries = Lexicon::render_file(lexicon, output, version)?;

    println!(
        "Successfully compiled {} lexicon entries to {}",
        entries,
        output.display()
    );
    Ok(())
}
