//! Link insertion.
//!
//! Terms are applied one at a time, longest first. For each term the current
//! text is classified into skip regions (existing links, code, HTML, headings,
//! front matter) and every match of the term that does not overlap a skip
//! region becomes a link. Matches are spliced from the end of the text
//! towards the start so earlier offsets stay valid.
//!
//! Because inserted links are themselves skip regions, a shorter term never
//! links inside a longer term's label, and a second run finds nothing to do.

use crate::index::TermIndex;
use crate::links::{format_link, is_escaped};
use crate::regions::classify;
use crate::repair::repair;
use tracing::{debug, trace};

/// Result of linking a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub text: String,
    /// Links inserted
    pub links_added: usize,
    /// Artifacts fixed by the repair pass
    pub repairs: usize,
}

impl Insertion {
    /// True if the document text changed
    pub fn changed(&self, original: &str) -> bool {
        self.text != original
    }
}

/// Link glossary terms in a document.
///
/// `glossary_path` is the relative path from the document's directory to the
/// definitions page. Existing artifacts are repaired first.
pub fn insert_links(text: &str, index: &TermIndex, glossary_path: &str) -> Insertion {
    let repaired = repair(text, index, glossary_path);
    let mut result = repaired.text;
    let mut links_added = 0;

    for term in index {
        let matches: Vec<(usize, usize)> = term
            .matcher()
            .find_iter(&result)
            .map(|m| (m.start(), m.end()))
            .collect();
        if matches.is_empty() {
            continue;
        }

        let regions = classify(&result);
        let mut linked = 0;

        for (start, end) in matches.into_iter().rev() {
            if regions.is_blocked(start, end)
                || follows_bang(&result, start)
                || is_escaped(&result, start)
            {
                continue;
            }
            let link = format_link(&result[start..end], glossary_path, term.slug());
            result.replace_range(start..end, &link);
            linked += 1;
        }

        if linked > 0 {
            trace!(term = term.text(), linked, "Linked term");
            links_added += linked;
        }
    }

    debug!(links_added, repairs = repaired.fixes, "Insertion complete");

    Insertion {
        text: result,
        links_added,
        repairs: repaired.fixes,
    }
}

// A link right after `!` would render as an image
fn follows_bang(text: &str, start: usize) -> bool {
    start > 0 && text.as_bytes()[start - 1] == b'!'
}
