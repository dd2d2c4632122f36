//! Tag and attribute scanner with byte spans.
//!
//! Documents are edited in place: passes locate attribute values and tags by
//! span, then splice replacements into the original text. Everything outside
//! an edited span is preserved byte for byte, including whitespace,
//! attribute order and quoting style.
//!
//! The scanner understands just enough HTML to not be fooled:
//! comments, doctypes and processing instructions are skipped, and the
//! content of `script`, `style`, `title` and `textarea` is never scanned
//! for tags.

use crate::utils::html::is_raw_text_element;
use std::ops::Range;

// =============================================================================
// Tokens
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    Unquoted,
    /// Opening quote with no closing one before the end of the tag.
    Unterminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrValue<'a> {
    /// Raw value text, without quotes, entities undecoded.
    pub text: &'a str,
    /// Span of `text` in the document.
    pub span: Range<usize>,
    pub quote: Quote,
}

impl AttrValue<'_> {
    /// Quoted with a matching closing quote.
    pub fn is_well_formed(&self) -> bool {
        matches!(self.quote, Quote::Double | Quote::Single)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    pub name: &'a str,
    pub value: Option<AttrValue<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Tag name as written.
    pub name: &'a str,
    /// From `<` to just past `>`.
    pub span: Range<usize>,
    pub closing: bool,
    pub self_closing: bool,
    /// False when the document ends before `>`.
    pub terminated: bool,
    pub attrs: Vec<Attr<'a>>,
}

impl<'a> Tag<'a> {
    /// Start tag with this name, case-insensitively.
    pub fn is_start(&self, name: &str) -> bool {
        !self.closing && self.name.eq_ignore_ascii_case(name)
    }

    /// End tag with this name, case-insensitively.
    pub fn is_end(&self, name: &str) -> bool {
        self.closing && self.name.eq_ignore_ascii_case(name)
    }

    pub fn attr(&self, name: &str) -> Option<&Attr<'a>> {
        self.attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Raw text of a valued attribute.
    pub fn attr_value(&self, name: &str) -> Option<&'a str> {
        self.attr(name)?.value.as_ref().map(|v| v.text)
    }

    /// `<link>` whose `rel` tokens include `canonical`.
    pub fn is_canonical_link(&self) -> bool {
        self.is_start("link")
            && self.attr_value("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
    }
}

// =============================================================================
// Scanner
// =============================================================================

/// Iterate over start and end tags in document order.
pub fn tags(html: &str) -> Tags<'_> {
    Tags { html, pos: 0 }
}

pub struct Tags<'a> {
    html: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Tag<'a>> {
        let html = self.html;
        let bytes = html.as_bytes();
        let len = bytes.len();

        loop {
            let lt = find_byte(bytes, self.pos, b'<')?;
            let rest = &bytes[lt..];

            if rest.starts_with(b"<!--") {
                self.pos = find_str(html, lt + 4, "-->").map_or(len, |i| i + 3);
                continue;
            }
            if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
                self.pos = find_byte(bytes, lt + 2, b'>').map_or(len, |i| i + 1);
                continue;
            }

            let closing = rest.get(1) == Some(&b'/');
            let name_start = if closing { lt + 2 } else { lt + 1 };
            if !bytes.get(name_start).is_some_and(u8::is_ascii_alphabetic) {
                // Stray `<` in text
                self.pos = lt + 1;
                continue;
            }

            let mut name_end = name_start;
            while name_end < len && is_name_byte(bytes[name_end]) {
                name_end += 1;
            }

            let mut tag = Tag {
                name: &html[name_start..name_end],
                span: lt..len,
                closing,
                self_closing: false,
                terminated: false,
                attrs: Vec::new(),
            };

            let end = if closing {
                match find_byte(bytes, name_end, b'>') {
                    Some(gt) => {
                        tag.terminated = true;
                        gt + 1
                    }
                    None => len,
                }
            } else {
                parse_attrs(html, name_end, &mut tag)
            };
            tag.span = lt..end;
            self.pos = end;

            if !closing && !tag.self_closing && is_raw_text_element(tag.name) {
                self.pos = find_end_tag(html, end, tag.name).unwrap_or(len);
            }

            return Some(tag);
        }
    }
}

/// Parse attributes from `start`, returning the position just past the tag.
fn parse_attrs<'a>(html: &'a str, start: usize, tag: &mut Tag<'a>) -> usize {
    let bytes = html.as_bytes();
    let len = bytes.len();
    let mut i = start;

    loop {
        i = skip_ws(bytes, i);
        if i >= len {
            return len;
        }
        match bytes[i] {
            b'>' => {
                tag.terminated = true;
                return i + 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                tag.terminated = true;
                tag.self_closing = true;
                return i + 2;
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < len
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'>'
            && !(bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>'))
        {
            i += 1;
        }
        if i == name_start {
            // `=` with no name before it
            i += 1;
        }
        let name = &html[name_start..i];

        let after_name = skip_ws(bytes, i);
        let mut value = None;
        if bytes.get(after_name) == Some(&b'=') {
            let j = skip_ws(bytes, after_name + 1);
            match bytes.get(j) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    let vstart = j + 1;
                    match find_byte(bytes, vstart, q) {
                        Some(vend) => {
                            let quote = if q == b'"' { Quote::Double } else { Quote::Single };
                            value = Some(AttrValue {
                                text: &html[vstart..vend],
                                span: vstart..vend,
                                quote,
                            });
                            i = vend + 1;
                        }
                        None => {
                            // No closing quote anywhere; end the value at the next `>`
                            let vend = find_byte(bytes, vstart, b'>').unwrap_or(len);
                            value = Some(AttrValue {
                                text: &html[vstart..vend],
                                span: vstart..vend,
                                quote: Quote::Unterminated,
                            });
                            i = vend;
                        }
                    }
                }
                Some(_) => {
                    let mut vend = j;
                    while vend < len && !bytes[vend].is_ascii_whitespace() && bytes[vend] != b'>' {
                        vend += 1;
                    }
                    value = Some(AttrValue {
                        text: &html[j..vend],
                        span: j..vend,
                        quote: Quote::Unquoted,
                    });
                    i = vend;
                }
                None => i = j,
            }
        }

        tag.attrs.push(Attr { name, value });
    }
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_')
}

#[inline]
fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

#[inline]
fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| i + from)
}

#[inline]
fn find_str(html: &str, from: usize, needle: &str) -> Option<usize> {
    html.get(from..)?.find(needle).map(|i| i + from)
}

/// Position of `</name` closing a raw text element, case-insensitively.
fn find_end_tag(html: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut pos = from;
    while let Some(lt) = find_str(html, pos, "</") {
        let name_end = lt + 2 + name.len();
        let matches_name = bytes
            .get(lt + 2..name_end)
            .is_some_and(|n| n.eq_ignore_ascii_case(name.as_bytes()));
        let boundary = bytes
            .get(name_end)
            .is_none_or(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/');
        if matches_name && boundary {
            return Some(lt);
        }
        pos = lt + 2;
    }
    None
}

// =============================================================================
// Splicing
// =============================================================================

/// Non-overlapping replacements applied to a document in one pass.
#[derive(Debug, Default)]
pub struct Edits {
    edits: Vec<(Range<usize>, String)>,
}

impl Edits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, span: Range<usize>, text: impl Into<String>) {
        self.edits.push((span, text.into()));
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.edits.push((at..at, text.into()));
    }

    pub fn remove(&mut self, span: Range<usize>) {
        self.edits.push((span, String::new()));
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all edits. Insertions at the same offset keep their order.
    pub fn apply(mut self, html: &str) -> String {
        self.edits.sort_by_key(|(span, _)| span.start);

        let mut out = String::with_capacity(html.len() + 256);
        let mut cursor = 0;
        for (span, text) in self.edits {
            if span.start < cursor {
                // Overlaps an earlier edit
                continue;
            }
            out.push_str(&html[cursor..span.start]);
            out.push_str(&text);
            cursor = span.end;
        }
        out.push_str(&html[cursor..]);
        out
    }
}

// =============================================================================
// Line helpers
// =============================================================================

/// Start of the line containing `pos`.
pub fn line_start(html: &str, pos: usize) -> usize {
    html[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// End of the line containing `pos`, at its `\n` or the document end.
pub fn line_end(html: &str, pos: usize) -> usize {
    find_str(html, pos, "\n").unwrap_or(html.len())
}

/// The document's line ending.
pub fn newline(html: &str) -> &'static str {
    if html.contains("\r\n") { "\r\n" } else { "\n" }
}
