//! Region classification.
//!
//! Marks every byte range of a document that must never receive a new link.
//! Classification runs in two stages:
//!
//! 1. **Line state**: front matter, fenced code blocks and headings are
//!    recognized line by line with running state.
//! 2. **Inline scan**: within the remaining text lines, existing links, inline
//!    code spans, autolinks, bare URLs and HTML tags are found. HTML tags are
//!    then paired across the whole document so content between an opening and
//!    closing tag is skipped as well.
//!
//! Classification never fails. Input that does not look as expected is
//! skipped rather than linked: an unclosed HTML tag or comment blocks
//! everything up to the end of the document.

use crate::links::{is_escaped, matching_delimiter, parse_inline_link};
use crate::types::{RegionKind, SkipRange};
use regex::Regex;
use std::sync::OnceLock;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// How a physical line takes part in linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Inside front matter, delimiters included
    FrontMatter,
    /// Inside a fenced code block, fence lines included
    Fence,
    /// A heading line
    Heading,
    /// Ordinary text
    Text,
}

impl LineClass {
    /// True for lines that are never rewritten by any engine
    pub fn is_verbatim(&self) -> bool {
        matches!(self, LineClass::FrontMatter | LineClass::Fence)
    }
}

/// A physical line of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Offset of the first byte
    pub start: usize,
    /// Offset of the line terminator (or end of text)
    pub end: usize,
    pub class: LineClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrontMatter {
    NotSeen,
    Open,
    Closed,
}

/// Split a document into classified lines.
///
/// The first line that is exactly `---` (after trimming) opens front matter and
/// the second closes it; later `---` lines are thematic breaks. Fences open on
/// a line starting with three backticks or tildes and close on the next line
/// starting with the same fence character.
pub fn scan_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut front_matter = FrontMatter::NotSeen;
    let mut fence: Option<char> = None;
    let mut start = 0;

    for raw in text.split('\n') {
        let end = start + raw.len();
        let trimmed = raw.trim();

        let class = if front_matter == FrontMatter::Open {
            if trimmed == "---" {
                front_matter = FrontMatter::Closed;
            }
            LineClass::FrontMatter
        } else if let Some(marker) = fence {
            if fence_marker(trimmed) == Some(marker) {
                fence = None;
            }
            LineClass::Fence
        } else if trimmed == "---" && front_matter == FrontMatter::NotSeen {
            front_matter = FrontMatter::Open;
            LineClass::FrontMatter
        } else if let Some(marker) = fence_marker(trimmed) {
            fence = Some(marker);
            LineClass::Fence
        } else if trimmed.starts_with('#') {
            LineClass::Heading
        } else {
            LineClass::Text
        };

        lines.push(Line { start, end, class });
        start = end + 1;
    }

    lines
}

fn fence_marker(trimmed: &str) -> Option<char> {
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}

/// The skip ranges of one document.
///
/// Individual ranges are kept for inspection; overlap checks go through a
/// merged, sorted interval set so every candidate is checked once against
/// all skip reasons.
#[derive(Debug, Clone, Default)]
pub struct Regions {
    ranges: Vec<SkipRange>,
    merged: Vec<(usize, usize)>,
}

impl Regions {
    fn from_ranges(mut ranges: Vec<SkipRange>) -> Self {
        ranges.retain(|r| !r.is_empty());
        ranges.sort_by_key(|r| (r.start, r.end));

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
        for range in &ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.1 => last.1 = last.1.max(range.end),
                _ => merged.push((range.start, range.end)),
            }
        }

        Regions { ranges, merged }
    }

    /// Skip ranges of one kind
    pub fn of_kind(&self, kind: RegionKind) -> impl Iterator<Item = &SkipRange> {
        self.ranges.iter().filter(move |r| r.kind == kind)
    }

    /// True if `[start, end)` overlaps any skip range
    pub fn is_blocked(&self, start: usize, end: usize) -> bool {
        let idx = self.merged.partition_point(|&(_, e)| e <= start);
        idx < self.merged.len() && self.merged[idx].0 < end
    }

    /// Skip ranges overlapping `[start, end)`
    pub fn overlapping(&self, start: usize, end: usize) -> impl Iterator<Item = &SkipRange> {
        self.ranges.iter().filter(move |r| r.overlaps(start, end))
    }
}

/// An HTML tag found during the inline scan.
#[derive(Debug, Clone)]
struct HtmlTag {
    start: usize,
    end: usize,
    name: String,
    closing: bool,
    self_closing: bool,
}

fn html_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9-]*)(?:\s[^<>]*)?/?>"#).expect("valid tag regex")
    })
}

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[!?][^<>]*>").expect("valid declaration regex"))
}

fn autolink_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<(?:[A-Za-z][A-Za-z0-9+.\-]{1,31}:[^\s<>]*|[^\s<>@]+@[^\s<>@]+)>")
            .expect("valid autolink regex")
    })
}

fn bare_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>\[\]()]*[^\s<>\[\]().,;:!?'"*_~]"#)
            .expect("valid url regex")
    })
}

/// Classify a document into skip ranges.
pub fn classify(text: &str) -> Regions {
    classify_lines(text, &scan_lines(text))
}

/// Classify a document whose lines were already scanned.
pub fn classify_lines(text: &str, lines: &[Line]) -> Regions {
    let mut ranges = Vec::new();
    let mut tags = Vec::new();
    let comments = comment_ranges(text);

    let mut block: Option<(usize, usize, LineClass)> = None;
    for line in lines {
        // Front matter and fences collapse into one Code range per block
        if line.class.is_verbatim() {
            match block {
                Some((start, _, class)) if class == line.class => {
                    block = Some((start, line.end, class));
                }
                _ => {
                    flush_block(&mut ranges, block.take());
                    block = Some((line.start, line.end, line.class));
                }
            }
            continue;
        }
        flush_block(&mut ranges, block.take());

        match line.class {
            LineClass::Heading => {
                ranges.push(SkipRange::new(line.start, line.end, RegionKind::Heading));
            }
            LineClass::Text => {
                scan_inline(text, line, &comments, &mut ranges, &mut tags);
            }
            LineClass::FrontMatter | LineClass::Fence => {}
        }
    }
    flush_block(&mut ranges, block);

    ranges.extend(
        comments
            .iter()
            .map(|&(start, end)| SkipRange::new(start, end, RegionKind::HtmlTag)),
    );
    ranges.extend(pair_html_tags(&tags, text.len()));

    Regions::from_ranges(ranges)
}

fn flush_block(ranges: &mut Vec<SkipRange>, block: Option<(usize, usize, LineClass)>) {
    if let Some((start, end, _)) = block {
        ranges.push(SkipRange::new(start, end, RegionKind::Code));
    }
}

/// HTML comments across the whole text; an unclosed comment runs to the end.
fn comment_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut comments = Vec::new();
    let mut offset = 0;

    while let Some(found) = text[offset..].find("<!--") {
        let start = offset + found;
        match text[start + 4..].find("-->") {
            Some(close) => {
                let end = start + 4 + close + 3;
                comments.push((start, end));
                offset = end;
            }
            None => {
                comments.push((start, text.len()));
                break;
            }
        }
    }

    comments
}

fn in_any(spans: &[(usize, usize)], pos: usize) -> bool {
    spans.iter().any(|&(s, e)| pos >= s && pos < e)
}

/// Scan one text line for inline skip ranges and HTML tags.
fn scan_inline(
    text: &str,
    line: &Line,
    comments: &[(usize, usize)],
    ranges: &mut Vec<SkipRange>,
    tags: &mut Vec<HtmlTag>,
) {
    let base = line.start;
    let src = &text[line.start..line.end];

    let code = code_spans(src);
    ranges.extend(
        code.iter()
            .map(|&(s, e)| SkipRange::new(base + s, base + e, RegionKind::Code)),
    );

    let links = bracket_links(src, &code);
    ranges.extend(
        links
            .iter()
            .map(|&(s, e)| SkipRange::new(base + s, base + e, RegionKind::Link)),
    );

    for m in autolink_regex().find_iter(src) {
        if !in_any(&code, m.start()) {
            ranges.push(SkipRange::new(base + m.start(), base + m.end(), RegionKind::Link));
        }
    }

    for m in bare_url_regex().find_iter(src) {
        if !in_any(&code, m.start()) {
            ranges.push(SkipRange::new(base + m.start(), base + m.end(), RegionKind::Link));
        }
    }

    for m in declaration_regex().find_iter(src) {
        if !in_any(&code, m.start()) {
            ranges.push(SkipRange::new(base + m.start(), base + m.end(), RegionKind::HtmlTag));
        }
    }

    for caps in html_tag_regex().captures_iter(src) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let start = base + whole.start();
        if in_any(&code, whole.start())
            || in_any(&links, whole.start())
            || in_any(comments, start)
        {
            continue;
        }

        let end = base + whole.end();
        let name = caps[2].to_ascii_lowercase();
        let closing = !caps[1].is_empty();
        let self_closing = whole.as_str().ends_with("/>") || VOID_ELEMENTS.contains(&name.as_str());

        ranges.push(SkipRange::new(start, end, RegionKind::HtmlTag));
        tags.push(HtmlTag {
            start,
            end,
            name,
            closing,
            self_closing,
        });
    }
}

/// Inline code spans of one line, as `(start, end)` offsets.
///
/// A run of N backticks opens a span that closes at the next run of exactly N
/// backticks; an unmatched run is literal text.
pub fn code_spans(src: &str) -> Vec<(usize, usize)> {
    let bytes = src.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let open = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let width = i - open;

        let mut j = i;
        let mut close = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let run_start = j;
                while j < bytes.len() && bytes[j] == b'`' {
                    j += 1;
                }
                if j - run_start == width {
                    close = Some(j);
                    break;
                }
            } else {
                j += 1;
            }
        }

        if let Some(end) = close {
            spans.push((open, end));
            i = end;
        }
    }

    spans
}

/// Bracketed link constructs of one line, as `(start, end)` offsets.
///
/// Covers inline links and images, reference links `[label][ref]`, link
/// reference definitions `[label]: url`, and bare `[label]` shortcuts.
fn bracket_links(src: &str, code: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let bytes = src.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'[' || is_escaped(src, i) || in_any(code, i) {
            i += 1;
            continue;
        }

        let start = if i > 0 && bytes[i - 1] == b'!' { i - 1 } else { i };

        if let Some(link) = parse_inline_link(src, i) {
            spans.push((start, link.end));
            i = link.end;
            continue;
        }

        let Some(close) = matching_delimiter(src, i, b'[', b']') else {
            i += 1;
            continue;
        };

        let end = match bytes.get(close + 1) {
            Some(b'[') => {
                matching_delimiter(src, close + 1, b'[', b']').map_or(close + 1, |e| e + 1)
            }
            Some(b':') if src[..start].trim().is_empty() => src.len(),
            _ => close + 1,
        };
        spans.push((start, end));
        i = end;
    }

    spans
}

/// Pair opening and closing tags into content ranges.
///
/// Tags are matched with a stack keyed by tag name. A closing tag pops back to
/// its nearest matching opener; stray closing tags are ignored. Openers left on
/// the stack skip everything to the end of the document.
fn pair_html_tags(tags: &[HtmlTag], text_len: usize) -> Vec<SkipRange> {
    let mut content = Vec::new();
    let mut stack: Vec<(&str, usize)> = Vec::new();

    for tag in tags {
        if tag.self_closing {
            continue;
        }

        if !tag.closing {
            stack.push((tag.name.as_str(), tag.end));
            continue;
        }

        if let Some(pos) = stack.iter().rposition(|(name, _)| *name == tag.name) {
            let content_start = stack[pos].1;
            if tag.start > content_start {
                content.push(SkipRange::new(
                    content_start,
                    tag.start,
                    RegionKind::HtmlContent,
                ));
            }
            stack.truncate(pos);
        }
    }

    for (_, content_start) in stack {
        content.push(SkipRange::new(content_start, text_len, RegionKind::HtmlContent));
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_covering(regions: &Regions, text: &str, needle: &str) -> Vec<RegionKind> {
        let start = text.find(needle).expect("needle present");
        let end = start + needle.len();
        let mut kinds: Vec<RegionKind> = regions.overlapping(start, end).map(|r| r.kind).collect();
        kinds.dedup();
        kinds
    }

    fn blocked(text: &str, needle: &str) -> bool {
        let regions = classify(text);
        let start = text.find(needle).expect("needle present");
        regions.is_blocked(start, start + needle.len())
    }

    #[test]
    fn test_scan_lines_front_matter() {
        let text = "---\ntitle: Access Control\n---\nBody\n---\nMore";
        let classes: Vec<LineClass> = scan_lines(text).iter().map(|l| l.class).collect();
        assert_eq!(
            classes,
            vec![
                LineClass::FrontMatter,
                LineClass::FrontMatter,
                LineClass::FrontMatter,
                LineClass::Text,
                LineClass::Text,
                LineClass::Text,
            ]
        );
    }

    #[test]
    fn test_scan_lines_fences() {
        let text = "a\n```yaml\n# comment\n---\n```\nb\n~~~\nx\n```\n~~~\nc";
        let classes: Vec<LineClass> = scan_lines(text).iter().map(|l| l.class).collect();
        assert_eq!(
            classes,
            vec![
                LineClass::Text,
                LineClass::Fence,
                LineClass::Fence,
                LineClass::Fence,
                LineClass::Fence,
                LineClass::Text,
                LineClass::Fence,
                LineClass::Fence,
                LineClass::Fence,
                LineClass::Fence,
                LineClass::Text,
            ]
        );
    }

    #[test]
    fn test_scan_lines_offsets() {
        let text = "one\ntwo\n";
        let lines = scan_lines(text);
        assert_eq!(lines.len(), 3);
        assert_eq!(&text[lines[1].start..lines[1].end], "two");
        assert_eq!(lines[2].start, text.len());
    }

    #[test]
    fn test_heading_lines() {
        let text = "# Access Control\n  ## Also Access Control\nAccess Control";
        let regions = classify(text);
        assert_eq!(regions.of_kind(RegionKind::Heading).count(), 2);
        let last = text.rfind("Access Control").unwrap();
        assert!(!regions.is_blocked(last, last + "Access Control".len()));
    }

    #[test]
    fn test_front_matter_is_one_code_range() {
        let text = "---\ntitle: x\nlayout: page\n---\nbody";
        let regions = classify(text);
        let code: Vec<&SkipRange> = regions.of_kind(RegionKind::Code).collect();
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].start, 0);
        assert_eq!(&text[code[0].end..], "\nbody");
    }

    #[test]
    fn test_inline_code() {
        let text = "Use `Access Control` and ``a ` b`` here, not `this";
        assert!(blocked(text, "Access Control"));
        assert!(blocked(text, "a ` b"));
        assert!(!blocked(text, "here"));
        assert!(!blocked(text, "this"));
    }

    #[test]
    fn test_existing_links() {
        let text = "[Access Control](x.md) and ![Logo](l.png) and [Ref][1] and [Shortcut].";
        let regions = classify(text);
        assert_eq!(kinds_covering(&regions, text, "Access Control"), vec![RegionKind::Link]);
        assert!(blocked(text, "Logo"));
        assert!(blocked(text, "Ref"));
        assert!(blocked(text, "Shortcut"));
        assert!(!blocked(text, " and "));
    }

    #[test]
    fn test_reference_definition() {
        let text = "[policy]: https://example.com/policy \"Policy\"";
        assert!(blocked(text, "Policy"));
    }

    #[test]
    fn test_urls() {
        let text = "Visit https://example.com/access/control or <https://example.com/a> today.";
        assert!(blocked(text, "control"));
        assert!(blocked(text, "example.com/a"));
        assert!(!blocked(text, "today"));
    }

    #[test]
    fn test_html_content() {
        let text = "Text<sup>Access Control</sup> and <b>bold</b> after";
        let regions = classify(text);
        assert_eq!(
            kinds_covering(&regions, text, "Access Control"),
            vec![RegionKind::HtmlContent]
        );
        assert!(blocked(text, "bold"));
        assert!(!blocked(text, "after"));
        assert!(blocked(text, "<sup>"));
    }

    #[test]
    fn test_html_pairs_across_lines() {
        let text = "<details>\n<summary>Guide</summary>\nAccess Control\n</details>\nAfter";
        assert!(blocked(text, "Access Control"));
        assert!(!blocked(text, "After"));
    }

    #[test]
    fn test_void_and_self_closing_tags() {
        let text = "Line<br>Access Control<img src=\"x\"/>Policy<hr/>";
        assert!(!blocked(text, "Access Control"));
        assert!(!blocked(text, "Policy"));
    }

    #[test]
    fn test_unclosed_tag_skips_to_end() {
        let text = "<div class=\"note\">\nAccess Control\n\nPolicy";
        assert!(blocked(text, "Access Control"));
        assert!(blocked(text, "Policy"));
    }

    #[test]
    fn test_angle_target_is_not_a_tag() {
        let text = "[Guide](<guide.md>) then Policy";
        assert!(!blocked(text, "Policy"));
    }

    #[test]
    fn test_comparison_is_not_a_tag() {
        let text = "when a < b and c > d the Policy applies";
        assert!(!blocked(text, "Policy"));
    }

    #[test]
    fn test_tags_in_inline_code_are_not_paired() {
        let text = "Write `<div>` to open. Policy applies.";
        assert!(!blocked(text, "Policy"));
    }

    #[test]
    fn test_comments() {
        let text = "<!-- Access Control -->\nPolicy <!-- open\nGuideline";
        assert!(blocked(text, "Access Control"));
        assert!(!blocked(text, "Policy"));
        assert!(blocked(text, "Guideline"));
    }

    #[test]
    fn test_fenced_code_is_skipped() {
        let text = "```\nAccess Control\n```\nPolicy";
        assert!(blocked(text, "Access Control"));
        assert!(blocked(text, "```"));
        assert!(!blocked(text, "Policy"));
    }

    #[test]
    fn test_merged_lookup_edges() {
        let regions = Regions::from_ranges(vec![
            SkipRange::new(5, 10, RegionKind::Code),
            SkipRange::new(8, 12, RegionKind::Link),
            SkipRange::new(20, 25, RegionKind::HtmlTag),
        ]);
        assert!(!regions.is_blocked(0, 5));
        assert!(regions.is_blocked(4, 6));
        assert!(regions.is_blocked(11, 13));
        assert!(!regions.is_blocked(12, 20));
        assert!(regions.is_blocked(24, 30));
        assert!(!regions.is_blocked(25, 30));
    }
}
