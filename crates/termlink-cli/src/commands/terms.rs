//! Terms command - list glossary terms in application order.

use crate::app::App;
use crate::OutputFormat;
use termlink_core::{Config, TermIndex};

/// Run the terms command.
pub fn run(config: Config, output: OutputFormat) -> anyhow::Result<()> {
    let app = App::new(config)?;

    if app.index.is_empty() {
        eprintln!("Glossary has no terms.");
        return Ok(());
    }

    match output {
        OutputFormat::Text => {
            for line in text_lines(&app.index) {
                println!("{}", line);
            }
            eprintln!();
            eprintln!("{} terms", app.index.len());
        }
        OutputFormat::Json => {
            let json_terms: Vec<serde_json::Value> = app
                .index
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "term": t.text(),
                        "slug": t.slug(),
                        "definition": t.term().definition,
                        "references": t.term().reference_tags,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json_terms)?);
        }
    }

    Ok(())
}

/// One tab-separated line per term: text, slug, first reference.
fn text_lines(index: &TermIndex) -> Vec<String> {
    index
        .iter()
        .map(|t| {
            format!(
                "{}\t{}\t{}",
                t.text(),
                t.slug(),
                t.term().primary_reference().unwrap_or("")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use termlink_core::Term;

    #[test]
    fn test_text_lines_in_application_order() {
        let index = TermIndex::build(vec![
            Term::new("Enforcement"),
            Term::new("Preventive Enforcement").with_reference("Layer 5"),
        ]);
        assert_eq!(
            text_lines(&index),
            vec![
                "Preventive Enforcement\tpreventive-enforcement\tLayer 5".to_string(),
                "Enforcement\tenforcement\t".to_string(),
            ]
        );
    }
}
