//! Caption XML to plain text.
//!
//! Timed-text documents are scanned with a tag regex rather than a full XML
//! parser, so stray or broken markup around the `<text>` elements is ignored.

use regex::Regex;
use std::sync::LazyLock;

static TEXT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").expect("Invalid regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(?:x([0-9A-Fa-f]+)|([0-9]+));").expect("Invalid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Convert a caption document into a single line of plain text.
///
/// Never fails: malformed input or a document without `<text>` elements
/// yields an empty string.
pub fn parse_caption_xml(xml: &str) -> String {
    TEXT_SPAN
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean_caption_text(m.as_str()))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode entities, then strip markup and collapse whitespace.
///
/// Decoding runs first so markup that arrives entity-encoded
/// (`&lt;font&gt;`) is removed along with literal tags.
pub fn clean_caption_text(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let stripped = TAG.replace_all(&decoded, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Decode the XML entities, `&nbsp;` and numeric character references.
///
/// `&amp;` goes last among the named entities so `&amp;lt;` decodes to the
/// literal text `&lt;` rather than `<`. Numeric references are decoded after
/// that, which resolves the double-encoded `&amp;#39;` YouTube emits.
fn decode_entities(s: &str) -> String {
    let named = s
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");

    NUMERIC_ENTITY
        .replace_all(&named, |caps: &regex::Captures| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
                _ => None,
            };
            code.and_then(char::from_u32)
                .map(|c| c.to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_document() {
        assert_eq!(parse_caption_xml("<text>A &amp; B</text><text>C</text>"), "A & B C");
    }

    #[test]
    fn test_timed_text_attributes_and_newlines() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0.5" dur="2.1">Hello
world</text>
<text start="2.6" dur="1.0">it&amp;#39;s &quot;fine&quot;</text>
</transcript>"#;
        assert_eq!(parse_caption_xml(xml), "Hello world it's \"fine\"");
    }

    #[test]
    fn test_encoded_markup_is_stripped() {
        let xml = r##"<text>&lt;font color="#E5E5E5"&gt;so&lt;/font&gt; <b>bold</b>&nbsp;move</text>"##;
        assert_eq!(parse_caption_xml(xml), "so bold move");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(parse_caption_xml("<text>caf&#233; &#x2014; ok</text>"), "café — ok");
    }

    #[test]
    fn test_empty_spans_are_skipped() {
        assert_eq!(parse_caption_xml("<text>one</text><text>  </text><text>two</text>"), "one two");
    }

    #[test]
    fn test_malformed_input_never_panics() {
        for input in [
            "",
            "<text>",
            "</text>",
            "<text>unterminated",
            "<<<>>>",
            "<html><body>no captions</body></html>",
            "&#99999999999;",
            "<text>&#xFFFFFFFF;</text>",
        ] {
            let _ = parse_caption_xml(input);
        }
        assert_eq!(parse_caption_xml("<html>no captions</html>"), "");
        assert_eq!(parse_caption_xml("<text>broken <b</text><text>fine</text>"), "broken <b fine");
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let once = parse_caption_xml("<text>A &amp; B</text><text>C</text>");
        let twice = parse_caption_xml(&format!("<text>{}</text>", once));
        assert_eq!(once, twice);

        let clean = "Already clean text, nothing to do.";
        assert_eq!(clean_caption_text(clean), clean);
        assert_eq!(clean_caption_text(&clean_caption_text(clean)), clean);
    }
}
