//! Repair of link artifacts left by earlier linking runs.
//!
//! Older runs could nest a short term's link inside a compound term's link,
//! write whole sentences into an anchor, or leave stray fragments and
//! parentheses behind. The repair pass normalizes those shapes before new
//! links are inserted. Rules run in a fixed order on every text line:
//!
//! 1. Nested glossary links collapse into a single link whose label is the
//!    flattened text (`[[Word](u) Rest](v)` and `[prefix[Inner](u)](v)`).
//! 2. Overlong glossary anchors are cut back to a known term slug.
//! 3. A duplicated slug tail after a link (`](u#control-catalog)-catalog)`) is
//!    dropped.
//! 4. Orphan `)` after a glossary link and doubled brackets around one
//!    (`[[text](u)]`) are removed.
//!
//! Only links pointing at the glossary page are touched, and inline code spans
//! are copied as written. Every rule maps well-formed text to itself, so the
//! pass is idempotent.

use crate::index::TermIndex;
use crate::links::{find_inline_links, format_link, is_escaped, parse_inline_link, LinkSpan};
use crate::regions::{code_spans, scan_lines, LineClass};
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::debug;

/// Anchors at least this long are considered runaway fragments.
pub const LONG_ANCHOR_LEN: usize = 50;

/// Result of a repair pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    pub text: String,
    /// Number of individual rewrites applied
    pub fixes: usize,
}

/// File stem of the glossary page, used to recognize glossary links.
///
/// `../model/02-definitions.html` has the marker `02-definitions`.
pub fn page_marker(glossary_path: &str) -> &str {
    let name = glossary_path.rsplit('/').next().unwrap_or(glossary_path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

/// True if a link path points at the glossary page
pub fn is_glossary_path(path: &str, marker: &str) -> bool {
    !marker.is_empty() && path.contains(marker)
}

/// Repair link artifacts in every linkable line of a document.
pub fn repair(text: &str, index: &TermIndex, glossary_path: &str) -> Repair {
    let repairer = Repairer {
        index,
        glossary_path,
        marker: page_marker(glossary_path),
    };

    let lines = scan_lines(text);
    let mut out = String::with_capacity(text.len());
    let mut fixes = 0;
    // Parentheses opened earlier in the paragraph
    let mut depth = 0;

    for (i, line) in lines.iter().enumerate() {
        let src = &text[line.start..line.end];
        if line.class == LineClass::Text && !src.trim().is_empty() {
            let (fixed, count, open) = repairer.repair_line(src, depth);
            fixes += count;
            depth = open;
            out.push_str(&fixed);
        } else {
            depth = 0;
            out.push_str(src);
        }
        if i + 1 < lines.len() {
            out.push('\n');
        }
    }

    if fixes > 0 {
        debug!(fixes, "Repaired link artifacts");
    }

    Repair { text: out, fixes }
}

struct Repairer<'a> {
    index: &'a TermIndex,
    glossary_path: &'a str,
    marker: &'a str,
}

impl Repairer<'_> {
    /// Repair one line; `depth` is the number of parentheses still open from
    /// earlier lines of the paragraph. Returns the depth after this line.
    fn repair_line(&self, line: &str, mut depth: usize) -> (String, usize, usize) {
        let mut out = String::with_capacity(line.len());
        let mut fixes = 0;
        let mut last = 0;

        for (start, end) in code_spans(line) {
            let (text, count, open) = self.repair_segment(&line[last..start], depth);
            out.push_str(&text);
            out.push_str(&line[start..end]);
            fixes += count;
            depth = open;
            last = end;
        }

        let (text, count, depth) = self.repair_segment(&line[last..], depth);
        out.push_str(&text);
        (out, fixes + count, depth)
    }

    /// Apply every rule to text outside code spans.
    fn repair_segment(&self, line: &str, depth: usize) -> (String, usize, usize) {
        if line.is_empty() {
            return (String::new(), 0, depth);
        }
        let (text, nested) = self.collapse_nested(line);
        let (text, long) = self.truncate_long_anchors(&text);
        let (text, trailing) = self.strip_trailing_fragments(&text);
        let (text, parens, depth) = self.normalize_delimiters(&text, depth);
        (text, nested + long + trailing + parens, depth)
    }

    fn is_glossary_link(&self, text: &str, link: &LinkSpan) -> bool {
        is_glossary_path(link.path_text(text), self.marker)
    }

    /// Rule 1: collapse links nested inside another link's label.
    fn collapse_nested(&self, line: &str) -> (String, usize) {
        let bytes = line.as_bytes();
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        let mut fixes = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != b'[' || is_escaped(line, i) {
                i += 1;
                continue;
            }
            let Some(outer) = parse_inline_link(line, i) else {
                i += 1;
                continue;
            };

            let label = outer.label_text(line);
            let inner = find_inline_links(label);
            let nested_glossary = !inner.is_empty()
                && !outer.is_image(line)
                && inner.iter().all(|l| !l.is_image(label))
                && inner.iter().any(|l| self.is_glossary_link(label, l));

            if nested_glossary {
                let flattened = flatten_label(label, self.marker);
                let relink =
                    self.is_glossary_link(line, &outer) || outer.target_text(line).contains('[');
                let replacement = if relink {
                    let combined = flattened.trim();
                    let slug = self.index.slug_for_label(combined);
                    format_link(combined, self.glossary_path, &slug)
                } else {
                    // An author link around a glossary link keeps its own target
                    format!("[{}]({})", flattened, outer.target_text(line))
                };
                out.push_str(&line[last..outer.start]);
                out.push_str(&replacement);
                fixes += 1;
            } else {
                out.push_str(&line[last..outer.end]);
            }
            last = outer.end;
            i = outer.end;
        }

        out.push_str(&line[last..]);
        (out, fixes)
    }

    /// Rule 2: cut runaway anchors back to a known slug.
    fn truncate_long_anchors(&self, line: &str) -> (String, usize) {
        let mut fixes = 0;
        let text = long_anchor_regex().replace_all(line, |caps: &Captures| {
            let path = &caps[1];
            let anchor = &caps[2];
            if !is_glossary_path(path, self.marker) {
                return caps[0].to_string();
            }
            match self.known_slug_suffix(anchor) {
                Some(slug) if slug != anchor => {
                    fixes += 1;
                    format!("]({}#{})", path, slug)
                }
                _ => caps[0].to_string(),
            }
        });
        (text.into_owned(), fixes)
    }

    /// The slug a runaway anchor most likely meant.
    ///
    /// Prefers the longest term slug that ends the anchor on a hyphen boundary,
    /// then the last two and the last one hyphen segments. `None` when nothing
    /// is known, in which case the anchor is left alone.
    fn known_slug_suffix(&self, anchor: &str) -> Option<String> {
        for term in self.index {
            let slug = term.slug();
            if anchor == slug {
                return Some(slug.to_string());
            }
            if let Some(prefix) = anchor.strip_suffix(slug) {
                if prefix.ends_with('-') {
                    return Some(slug.to_string());
                }
            }
        }

        let parts: Vec<&str> = anchor.split('-').collect();
        [2usize, 1]
            .iter()
            .filter(|&&n| parts.len() > n)
            .map(|&n| parts[parts.len() - n..].join("-"))
            .find(|candidate| self.index.is_known_slug(candidate))
    }

    /// Rule 3: drop a slug tail repeated after the closing parenthesis.
    fn strip_trailing_fragments(&self, line: &str) -> (String, usize) {
        let mut fixes = 0;
        let text = trailing_fragment_regex().replace_all(line, |caps: &Captures| {
            let path = &caps[1];
            let slug = &caps[2];
            let trailing = &caps[3];
            let last_segment = slug.rsplit('-').next().unwrap_or(slug);

            let glossary = path.is_empty() || is_glossary_path(path, self.marker);
            if glossary && trailing == last_segment {
                fixes += 1;
                format!("]({}#{})", path, slug)
            } else {
                caps[0].to_string()
            }
        });
        (text.into_owned(), fixes)
    }

    /// Rule 4: remove orphan `)` after glossary links and unwrap `[[text](u)]`.
    fn normalize_delimiters(&self, line: &str, mut depth: usize) -> (String, usize, usize) {
        let bytes = line.as_bytes();
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        let mut fixes = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b'[' => {
                    if let Some(link) = self.doubled_bracket(line, i) {
                        out.push_str(&line[last..i]);
                        out.push_str(&line[link.start..link.end]);
                        fixes += 1;
                        // Skip the inner link and the extra `]`
                        last = link.end + 1;
                        i = link.end + 1;
                        i = self.skip_orphans(line, i, depth, &mut fixes, &mut out, &mut last);
                        continue;
                    }
                    if let Some(link) = parse_inline_link(line, i) {
                        i = link.end;
                        if self.is_glossary_link(line, &link) {
                            i = self.skip_orphans(line, i, depth, &mut fixes, &mut out, &mut last);
                        }
                        continue;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        out.push_str(&line[last..]);
        (out, fixes, depth)
    }

    /// A glossary link wrapped in one extra pair of brackets, starting at `open`.
    fn doubled_bracket(&self, line: &str, open: usize) -> Option<LinkSpan> {
        let bytes = line.as_bytes();
        if bytes.get(open + 1) != Some(&b'[') || (open > 0 && bytes[open - 1] == b'!') {
            return None;
        }
        let inner = parse_inline_link(line, open + 1)?;
        let closed = bytes.get(inner.end) == Some(&b']');
        let followed = matches!(bytes.get(inner.end + 1), Some(b'(') | Some(b'['));
        (closed && !followed && self.is_glossary_link(line, &inner)).then_some(inner)
    }

    /// Drop `)` bytes at `pos` that close nothing; returns the next position.
    fn skip_orphans(
        &self,
        line: &str,
        mut pos: usize,
        depth: usize,
        fixes: &mut usize,
        out: &mut String,
        last: &mut usize,
    ) -> usize {
        if depth > 0 {
            return pos;
        }
        let bytes = line.as_bytes();
        if bytes.get(pos) != Some(&b')') {
            return pos;
        }
        out.push_str(&line[*last..pos]);
        while bytes.get(pos) == Some(&b')') {
            pos += 1;
            *fixes += 1;
        }
        *last = pos;
        pos
    }
}

/// Replace glossary links in a label with their own (flattened) labels.
fn flatten_label(label: &str, marker: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut last = 0;

    for link in find_inline_links(label) {
        out.push_str(&label[last..link.start]);
        let inner = link.label_text(label);
        if is_glossary_path(link.path_text(label), marker) {
            out.push_str(&flatten_label(inner, marker));
        } else {
            out.push_str(&label[link.start..link.end]);
        }
        last = link.end;
    }

    out.push_str(&label[last..]);
    out
}

fn long_anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\]\(([^()\s#]*)#([a-z0-9-]{{{},}})\)", LONG_ANCHOR_LEN))
            .expect("valid anchor regex")
    })
}

fn trailing_fragment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\]\(([^()\s#]*)#([a-z0-9-]+)\)-([a-z0-9-]+)\)").expect("valid fragment regex")
    })
}
