//! Markdown link rewriting.
//!
//! Parses a document with `pulldown-cmark` and rewrites the destination of
//! every inline link, inline image and link reference definition through
//! [`links::rewrite_url`]. Reference-style links (`[text][id]`) point at a
//! definition and are rewritten there.
//!
//! The parser is only used to *find* destinations: each one is located as a
//! byte span in the source and replaced in place, so everything that is not a
//! URL (headings, tables, code blocks, titles, alt text, whitespace) comes out
//! byte-for-byte as it went in.

use crate::links::{self, LinkContext};
use pulldown_cmark::{Event, LinkType, Options, Parser, Tag, TagEnd};
use std::ops::Range;

/// A markdown node that carries a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlNode {
    Image { url: String },
    Link { url: String },
    Definition { url: String, title: Option<String> },
}

impl UrlNode {
    pub fn url(&self) -> &str {
        match self {
            UrlNode::Image { url } | UrlNode::Link { url } | UrlNode::Definition { url, .. } => url,
        }
    }
}

/// A [`UrlNode`] together with where its destination sits in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedUrl {
    pub node: UrlNode,
    /// Byte range of the raw destination, without angle brackets.
    pub span: Range<usize>,
    /// The destination was written as `<...>`.
    pub angled: bool,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Rewrite every link, image and definition URL in `text`.
pub fn rewrite_links(text: &str, current_dir: &str, ctx: &LinkContext) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for located in url_nodes(text) {
        let url = located.node.url();
        let rewritten = links::rewrite_url(url, current_dir, ctx);
        if rewritten == url {
            continue;
        }
        out.push_str(&text[copied..located.span.start]);
        out.push_str(&format_destination(&rewritten, located.angled));
        copied = located.span.end;
    }
    out.push_str(&text[copied..]);
    out
}

/// All URL-carrying nodes of a document, in source order.
pub fn url_nodes(text: &str) -> Vec<LocatedUrl> {
    let parser = Parser::new_ext(text, parser_options());
    let mut found: Vec<LocatedUrl> = parser
        .reference_definitions()
        .iter()
        .filter_map(|(_, def)| {
            locate_definition(text, def.span.clone(), &def.dest, def.title.as_deref())
        })
        .collect();

    let mut open: Vec<OpenLink> = Vec::new();
    let mut blocks: Vec<Range<usize>> = Vec::new();
    let mut depth = 0usize;
    for (event, range) in parser.into_offset_iter() {
        match &event {
            Event::Start(_) => {
                if depth == 0 {
                    blocks.push(range.clone());
                }
                depth += 1;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            _ if depth == 0 => blocks.push(range.clone()),
            _ => {}
        }
        match event {
            Event::Start(Tag::Link { link_type, dest_url, .. }) => {
                extend(&mut open, range.end);
                open.push(OpenLink::new(false, link_type, dest_url.to_string(), range));
            }
            Event::Start(Tag::Image { link_type, dest_url, .. }) => {
                extend(&mut open, range.end);
                open.push(OpenLink::new(true, link_type, dest_url.to_string(), range));
            }
            Event::End(TagEnd::Link | TagEnd::Image) => {
                let Some(link) = open.pop() else { continue };
                extend(&mut open, link.range.end);
                if let Some(located) = link.locate(text) {
                    found.push(located);
                }
            }
            _ => {
                for link in open.iter_mut() {
                    link.text_end = link.text_end.max(range.end);
                }
            }
        }
    }

    // The parser keeps one definition per label. Later duplicates at the top
    // level sit between blocks and are found by parsing those gaps again.
    let mut gap_start = 0;
    let eof = text.len()..text.len();
    for block in blocks.iter().chain(std::iter::once(&eof)) {
        if block.start > gap_start {
            found.extend(gap_definitions(text, gap_start..block.start));
        }
        gap_start = gap_start.max(block.end);
    }

    found.sort_by_key(|l| l.span.start);
    found.dedup_by_key(|l| l.span.start);
    found
}

/// Every definition in `gap`, one parse per definition so that repeated
/// labels are each reported.
fn gap_definitions(text: &str, gap: Range<usize>) -> Vec<LocatedUrl> {
    let mut found = Vec::new();
    let mut pos = gap.start;
    while pos < gap.end {
        let parser = Parser::new_ext(&text[pos..gap.end], parser_options());
        let Some(def) = parser
            .reference_definitions()
            .iter()
            .map(|(_, def)| def)
            .min_by_key(|def| def.span.start)
        else {
            break;
        };
        let span = pos + def.span.start..pos + def.span.end;
        if let Some(located) = locate_definition(text, span.clone(), &def.dest, def.title.as_deref())
        {
            found.push(located);
        }
        pos = span.end.max(pos + 1);
        while !text.is_char_boundary(pos) {
            pos += 1;
        }
    }
    found
}

fn locate_definition(
    text: &str,
    def_span: Range<usize>,
    dest: &str,
    title: Option<&str>,
) -> Option<LocatedUrl> {
    let Some((span, angled)) = definition_destination(text, def_span) else {
        tracing::debug!(url = %dest, "could not locate definition destination");
        return None;
    };
    destination_matches(&text[span.clone()], dest).then(|| LocatedUrl {
        node: UrlNode::Definition {
            url: dest.to_string(),
            title: title.map(str::to_string),
        },
        span,
        angled,
    })
}

fn extend(open: &mut [OpenLink], end: usize) {
    if let Some(parent) = open.last_mut() {
        parent.text_end = parent.text_end.max(end);
    }
}

/// A link or image whose end event has not been seen yet.
struct OpenLink {
    image: bool,
    inline: bool,
    url: String,
    range: Range<usize>,
    /// End of the last inner event: the link text closes at or after this.
    text_end: usize,
}

impl OpenLink {
    fn new(image: bool, link_type: LinkType, url: String, range: Range<usize>) -> Self {
        let opener = if image { 2 } else { 1 };
        Self {
            image,
            inline: link_type == LinkType::Inline,
            url,
            text_end: range.start + opener,
            range,
        }
    }

    fn locate(self, text: &str) -> Option<LocatedUrl> {
        if !self.inline {
            return None;
        }
        let end = self.range.end.min(text.len());
        let close = text.get(self.text_end..end)?.find("](")? + self.text_end;
        let (span, angled) = scan_destination(text, close + 2, end)?;
        if !destination_matches(&text[span.clone()], &self.url) {
            tracing::debug!(url = %self.url, "link destination does not match source, skipping");
            return None;
        }
        let node = if self.image {
            UrlNode::Image { url: self.url }
        } else {
            UrlNode::Link { url: self.url }
        };
        Some(LocatedUrl { node, span, angled })
    }
}

/// Find the destination of a `[label]: destination "title"` definition.
fn definition_destination(text: &str, span: Range<usize>) -> Option<(Range<usize>, bool)> {
    let bytes = text.as_bytes();
    let end = span.end.min(text.len());
    let mut i = span.start + text.get(span.start..end)?.find('[')? + 1;
    while i < end {
        match bytes[i] {
            b'\\' => i += 2,
            b']' => break,
            _ => i += 1,
        }
    }
    if bytes.get(i + 1) != Some(&b':') {
        return None;
    }
    scan_destination(text, i + 2, end)
}

/// Scan a link destination starting at `start` (whitespace allowed first).
fn scan_destination(text: &str, start: usize, end: usize) -> Option<(Range<usize>, bool)> {
    let bytes = text.as_bytes();
    let mut i = start;
    while i < end && bytes[i].is_ascii_whitespace() {
        i += 1;
        // Destination on the line after a definition label, inside a block quote.
        if bytes[i - 1] == b'\n' {
            while i < end && (bytes[i] == b'>' || bytes[i] == b' ') {
                i += 1;
            }
        }
    }
    if i >= end {
        return None;
    }

    if bytes[i] == b'<' {
        let from = i + 1;
        let mut j = from;
        while j < end {
            match bytes[j] {
                b'\\' => j += 2,
                b'>' => return Some((from..j, true)),
                b'\n' => return None,
                _ => j += 1,
            }
        }
        return None;
    }

    let from = i;
    let mut depth = 0usize;
    while i < end {
        match bytes[i] {
            b'\\' => i += 2,
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' if depth == 0 => break,
            b')' => {
                depth -= 1;
                i += 1;
            }
            b if b.is_ascii_whitespace() || b.is_ascii_control() => break,
            _ => i += 1,
        }
    }
    Some((from..i.min(end), false))
}

/// The raw source text decodes to the destination the parser reported.
/// Entity references are not decoded and are trusted as-is.
fn destination_matches(raw: &str, parsed: &str) -> bool {
    if raw.contains('&') {
        return true;
    }
    let mut unescaped = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek().is_some_and(|n| n.is_ascii_punctuation()) {
            continue;
        }
        unescaped.push(c);
    }
    unescaped == parsed
}

/// Write a destination back so that it parses to `url`.
///
/// `angled` destinations already sit between `<` and `>` in the source; a
/// bare destination gets them when it could not be parsed otherwise.
/// Backslashes, angle brackets and `|` are escaped in both forms. An
/// unescaped `|` would split a table cell before the link is parsed.
fn format_destination(url: &str, angled: bool) -> String {
    let needs_brackets = !angled
        && (url
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '<' || c == '>')
            || !parens_balanced(url));
    let mut out = String::with_capacity(url.len() + 2);
    if needs_brackets {
        out.push('<');
    }
    for c in url.chars() {
        if matches!(c, '\\' | '<' | '>' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    if needs_brackets {
        out.push('>');
    }
    out
}

fn parens_balanced(url: &str) -> bool {
    let mut depth = 0i32;
    for c in url.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
