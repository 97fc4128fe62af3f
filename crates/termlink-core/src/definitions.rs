//! Definitions page rendering.
//!
//! Renders the glossary as a Markdown table whose first column carries an
//! `<a id="slug"></a>` anchor per term, then substitutes the table into a page
//! template at the `{{.Table}}` placeholder. The anchors use the same slug
//! function as the linker, so every generated link resolves.

use crate::corpus::write_atomic;
use crate::error::{Result, TermlinkError};
use crate::glossary::Glossary;
use crate::types::Term;
use regex::{NoExpand, Regex};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*\.Table\s*\}\}").expect("valid placeholder regex"))
}

/// Render one table row.
pub fn render_row(term: &Term) -> String {
    format!(
        "| <a id=\"{}\"></a>**{}** | {} | {} |",
        term.slug(),
        table_cell(&term.text),
        table_cell(&term.definition),
        term.primary_reference().map(table_cell).unwrap_or_default()
    )
}

/// Render the glossary as Markdown table rows, in glossary order.
///
/// The header row belongs to the page template.
pub fn render_table(glossary: &Glossary) -> String {
    glossary
        .terms()
        .iter()
        .map(render_row)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitute the rendered table into a page template.
///
/// Every `{{.Table}}` placeholder is replaced. A template without one is an
/// error, since writing it back would silently drop the table.
pub fn render_page(template: &str, glossary: &Glossary) -> Result<String> {
    let re = placeholder_regex();
    if !re.is_match(template) {
        return Err(TermlinkError::template("template has no {{.Table}} placeholder"));
    }

    let table = render_table(glossary);
    Ok(re.replace_all(template, NoExpand(table.trim())).into_owned())
}

/// Render a template file into the definitions page.
///
/// `template` and `output` may be the same file, in which case the page is
/// regenerated in place.
pub fn render_file(template: &Path, output: &Path, glossary: &Glossary) -> Result<()> {
    let contents = fs::read_to_string(template).map_err(|e| {
        TermlinkError::template(format!("failed to read {}: {}", template.display(), e))
    })?;

    let page = render_page(&contents, glossary)?;
    write_atomic(output, &page).map_err(|source| TermlinkError::DocumentWrite {
        path: output.to_path_buf(),
        source,
    })?;

    info!(output = %output.display(), terms = glossary.len(), "Definitions page written");
    Ok(())
}

// Keep a value inside one table cell
pub(crate) fn table_cell(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}
