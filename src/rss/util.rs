//! Utility functions for RSS feed processing.

use encoding_rs::Encoding;
use url::Url;

/// Helper function to validate a URL
pub fn is_valid_url(url: &str) -> bool {
    if let Ok(parsed) = Url::parse(url) {
        parsed.scheme() == "http" || parsed.scheme() == "https"
    } else {
        false
    }
}

/// Clean up malformed XML
pub fn cleanup_xml(xml: &str) -> String {
    let mut cleaned = xml.trim().trim_start_matches('\u{FEFF}').to_string();

    // Drop anything before the XML declaration or the feed root.
    if let Some(start) = ["<?xml", "<rss", "<feed"]
        .iter()
        .filter_map(|marker| cleaned.find(marker))
        .min()
    {
        cleaned = cleaned[start..].to_string();
    }

    // HTML entities are not defined in XML.
    cleaned = cleaned
        .replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&rsquo;", "&#8217;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rdquo;", "&#8221;")
        .replace("&ldquo;", "&#8220;")
        .replace("&hellip;", "&#8230;")
        .replace("&amp;amp;", "&amp;")
        .replace("&apos;", "&#39;");

    cleaned = cleaned
        .chars()
        .filter(|&c| {
            matches!(c,
                '\u{0009}' | // tab
                '\u{000A}' | // newline
                '\u{000D}' | // carriage return
                '\u{0020}'..='\u{D7FF}' |
                '\u{E000}'..='\u{FFFD}' |
                '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect();

    if !cleaned.starts_with("<?xml") {
        cleaned = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", cleaned);
    }

    cleaned
}

/// Extract the `charset=` parameter from a Content-Type header value.
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            part.get(..8)
                .filter(|prefix| prefix.eq_ignore_ascii_case("charset="))
                .map(|_| part[8..].trim_matches('"').trim())
        })
        .filter(|charset| !charset.is_empty())
}

/// Decode a response body to text: UTF-8 first, then the declared charset,
/// then lossy UTF-8.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    if let Some(encoding) = content_type
        .and_then(charset_from_content_type)
        .and_then(|charset| Encoding::for_label(charset.as_bytes()))
    {
        let (decoded, _, _) = encoding.decode(bytes);
        return decoded.into_owned();
    }

    String::from_utf8_lossy(bytes).into_owned()
}

/// First characters of a body for error messages, or a marker for binary data.
pub fn body_preview(body: &str) -> String {
    if body
        .chars()
        .take(100)
        .all(|c| c.is_ascii_graphic() || c.is_whitespace())
    {
        body.chars().take(100).collect()
    } else {
        "[binary data]".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://arxiv.org/rss/cs.AI"));
        assert!(is_valid_url("http://localhost:8080/feed"));
        assert!(!is_valid_url("ftp://example.com/feed"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_cleanup_xml_strips_bom_and_leading_garbage() {
        let cleaned = cleanup_xml("\u{FEFF}  junk before <rss version=\"2.0\">&nbsp;</rss>");
        assert!(cleaned.starts_with("<?xml version=\"1.0\""));
        assert!(cleaned.contains("<rss version=\"2.0\">&#160;</rss>"));
        assert!(!cleaned.contains("junk"));
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("application/rss+xml; charset=ISO-8859-1"),
            Some("ISO-8859-1")
        );
        assert_eq!(
            charset_from_content_type("text/xml;Charset=\"utf-8\""),
            Some("utf-8")
        );
        assert_eq!(charset_from_content_type("text/xml"), None);
    }

    #[test]
    fn test_decode_body_uses_declared_charset() {
        // "café" in windows-1252
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        assert_eq!(
            decode_body(&bytes, Some("text/xml; charset=windows-1252")),
            "café"
        );
        assert_eq!(decode_body("plain".as_bytes(), None), "plain");
        assert_eq!(decode_body(&bytes, None), "caf\u{FFFD}");
    }
}
