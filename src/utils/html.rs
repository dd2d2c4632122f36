//! HTML text helpers.
//!
//! - `escape_attr()` - quote-safe attribute values for tags we emit
//! - `unescape()` - decode entities in extracted titles and descriptions
//! - `is_raw_text_element()` - elements whose content is never markup

use std::borrow::Cow;

// =============================================================================
// Escaping
// =============================================================================

const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape a value for a double-quoted attribute.
///
/// Borrows when nothing needs escaping.
///
/// ```ignore
/// assert_eq!(escape_attr("Tom & Jerry"), "Tom &amp; Jerry");
/// assert_eq!(escape_attr("plain"), "plain");
/// ```
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Decode named and numeric character references.
///
/// Unknown entities are kept verbatim so decoding never loses text.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        // Entities are short; anything longer is literal text
        let entity = after
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .map(|end| (&after[..end], end));

        match entity.and_then(|(name, end)| decode_entity(name).map(|c| (c, end))) {
            Some((c, end)) => {
                result.push(c);
                rest = &after[end + 1..];
            }
            None => {
                result.push('&');
                rest = after;
            }
        }
    }
    result.push_str(rest);

    Cow::Owned(result)
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "rsquo" => Some('\u{2019}'),
        "lsquo" => Some('\u{2018}'),
        "copy" => Some('\u{00A9}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

// =============================================================================
// Element Classification
// =============================================================================

/// Elements whose content is text up to the matching end tag.
///
/// Covers both raw text (script, style) and escapable raw text
/// (textarea, title). Markup-looking content inside them is not markup.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    ["script", "style", "textarea", "title"]
        .iter()
        .any(|t| t.eq_ignore_ascii_case(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("plain text"), "plain text");
        assert_eq!(
            escape_attr(r#"Eye "care" & <vision>"#),
            "Eye &quot;care&quot; &amp; &lt;vision&gt;"
        );
        assert_eq!(escape_attr("Dr. O'Neil"), "Dr. O&#39;Neil");
    }

    #[test]
    fn test_escape_attr_borrows_when_clean() {
        assert!(matches!(escape_attr("nothing here"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape_named() {
        assert_eq!(unescape("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(unescape("&lt;b&gt; &quot;x&quot; &apos;y&apos;"), "<b> \"x\" 'y'");
    }

    #[test]
    fn test_unescape_numeric() {
        assert_eq!(unescape("O&#39;Neil"), "O'Neil");
        assert_eq!(unescape("O&#x27;Neil"), "O'Neil");
        assert_eq!(unescape("caf&#233;"), "café");
    }

    #[test]
    fn test_unescape_keeps_unknown_and_bare_ampersands() {
        assert_eq!(unescape("R&D"), "R&D");
        assert_eq!(unescape("&bogus; stays"), "&bogus; stays");
        assert_eq!(unescape("a & b; c"), "a & b; c");
        assert_eq!(unescape("trailing &"), "trailing &");
    }

    #[test]
    fn test_escape_then_unescape() {
        let original = r#"Vision "Care" & O'Neil <LLC>"#;
        assert_eq!(unescape(&escape_attr(original)), original);
    }

    #[test]
    fn test_is_raw_text_element() {
        assert!(is_raw_text_element("script"));
        assert!(is_raw_text_element("STYLE"));
        assert!(is_raw_text_element("title"));
        assert!(is_raw_text_element("textarea"));
        assert!(!is_raw_text_element("a"));
        assert!(!is_raw_text_element("head"));
    }
}
