//! Markdown link scanning.
//!
//! A small balance-counting scanner for `[label](target)` links. Labels are
//! matched by bracket depth and targets by parenthesis depth, so labels that
//! contain brackets and targets that contain parentheses are handled without
//! regex backtracking. Backslash escapes are honored and no span ever crosses
//! a newline.
//!
//! All delimiters are ASCII, so scanning bytes never splits a UTF-8 sequence.

use std::ops::Range;

/// An inline link located in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    /// Offset of the opening `[`
    pub start: usize,
    /// Label bytes, between `[` and `]`
    pub label: Range<usize>,
    /// Target bytes, between `(` and `)`
    pub target: Range<usize>,
    /// Offset one past the closing `)`
    pub end: usize,
}

impl LinkSpan {
    /// Label text
    pub fn label_text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.label.clone()]
    }

    /// Target text (path and fragment)
    pub fn target_text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.target.clone()]
    }

    /// Target path, without the fragment
    pub fn path_text<'a>(&self, text: &'a str) -> &'a str {
        let target = self.target_text(text);
        target.split_once('#').map_or(target, |(path, _)| path)
    }

    /// Fragment after the first `#`, if any
    pub fn anchor_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.target_text(text).split_once('#').map(|(_, anchor)| anchor)
    }

    /// True if this link is an image (`![alt](src)`)
    pub fn is_image(&self, text: &str) -> bool {
        self.start > 0 && text.as_bytes()[self.start - 1] == b'!'
    }
}

/// Find the delimiter closing the one at `open`.
///
/// Nested pairs of the same delimiter are balanced. Returns `None` if the line
/// ends first.
pub fn matching_delimiter(text: &str, open: usize, opener: u8, closer: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&opener) {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'\n' => return None,
            b if b == opener => depth += 1,
            b if b == closer => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Parse an inline link whose `[` is at `open`.
pub fn parse_inline_link(text: &str, open: usize) -> Option<LinkSpan> {
    let label_end = matching_delimiter(text, open, b'[', b']')?;
    let paren = label_end + 1;
    let target_end = matching_delimiter(text, paren, b'(', b')')?;

    Some(LinkSpan {
        start: open,
        label: open + 1..label_end,
        target: paren + 1..target_end,
        end: target_end + 1,
    })
}

/// True if the byte at `pos` is preceded by an odd number of backslashes.
pub fn is_escaped(text: &str, pos: usize) -> bool {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut i = pos;
    while i > 0 && bytes[i - 1] == b'\\' {
        count += 1;
        i -= 1;
    }
    count % 2 == 1
}

/// Find all top-level inline links in `text`, left to right.
///
/// Links nested inside another link's label are not reported separately.
pub fn find_inline_links(text: &str) -> Vec<LinkSpan> {
    let bytes = text.as_bytes();
    let mut links = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' && !is_escaped(text, i) {
            if let Some(link) = parse_inline_link(text, i) {
                i = link.end;
                links.push(link);
                continue;
            }
        }
        i += 1;
    }

    links
}

/// Format a link.
pub fn format_link(label: &str, path: &str, slug: &str) -> String {
    format!("[{}]({}#{})", label, path, slug)
}
