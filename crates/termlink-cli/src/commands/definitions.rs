//! Definitions command - render the glossary table into the definitions page.

use crate::app::App;
use std::path::PathBuf;
use termlink_core::{definitions, Config};

/// Run the definitions command.
pub fn run(
    config: Config,
    template: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let app = App::new(config)?;

    let template = template.unwrap_or_else(|| app.definitions_source());
    let output = output.unwrap_or_else(|| template.clone());

    definitions::render_file(&template, &output, &app.glossary)?;

    println!("Successfully generated definitions table in {}", output.display());
    Ok(())
}
