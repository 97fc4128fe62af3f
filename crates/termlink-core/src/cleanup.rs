//! Glossary link removal.
//!
//! Reverses insertion: a link is unwrapped back to its label when it points at
//! the glossary page, its anchor is the slug of the term its label names, and
//! that term is in the index. Anything else, including author links to the
//! glossary with a custom label, is left as written.

use crate::index::TermIndex;
use crate::links::{is_escaped, parse_inline_link};
use crate::regions::{code_spans, scan_lines};
use crate::repair::{is_glossary_path, page_marker};
use tracing::debug;

/// Result of removing glossary links from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub text: String,
    pub links_removed: usize,
}

/// Remove engine-generated glossary links from a document.
///
/// Front matter, fenced code and inline code are left untouched. Headings are
/// processed so links added by older tools are cleaned there too.
pub fn remove_links(text: &str, index: &TermIndex, glossary_path: &str) -> Removal {
    let marker = page_marker(glossary_path);
    let lines = scan_lines(text);
    let mut out = String::with_capacity(text.len());
    let mut links_removed = 0;

    for (i, line) in lines.iter().enumerate() {
        let src = &text[line.start..line.end];
        if line.class.is_verbatim() {
            out.push_str(src);
        } else {
            let (cleaned, count) = clean_line(src, index, marker);
            links_removed += count;
            out.push_str(&cleaned);
        }
        if i + 1 < lines.len() {
            out.push('\n');
        }
    }

    if links_removed > 0 {
        debug!(links_removed, "Removed glossary links");
    }

    Removal {
        text: out,
        links_removed,
    }
}

fn clean_line(line: &str, index: &TermIndex, marker: &str) -> (String, usize) {
    let code = code_spans(line);
    let in_code = |pos: usize| code.iter().any(|&(start, end)| pos >= start && pos < end);

    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    let mut removed = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'[' || is_escaped(line, i) || in_code(i) {
            i += 1;
            continue;
        }

        let Some(link) = parse_inline_link(line, i) else {
            i += 1;
            continue;
        };

        let label = link.label_text(line);
        let generated = is_glossary_path(link.path_text(line), marker)
            && link
                .anchor_text(line)
                .zip(index.lookup(label))
                .is_some_and(|(anchor, term)| anchor == term.slug());

        if generated && !link.is_image(line) {
            out.push_str(&line[last..link.start]);
            out.push_str(label);
            last = link.end;
            i = link.end;
            removed += 1;
        } else {
            // Labels may still hold generated links
            i += 1;
        }
    }

    out.push_str(&line[last..]);
    (out, removed)
}
