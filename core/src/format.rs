//! Response body formatting for display
//!
//! Pure rendering of a classified body: JSON is pretty-printed, markup is
//! compacted, an empty body becomes a fixed placeholder, plain text passes
//! through untouched.

use crate::classify::ResponseKind;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Placeholder rendered in place of an empty response body
pub const EMPTY_BODY_PLACEHOLDER: &str = "(empty response body)";

#[allow(clippy::expect_used)] // Fixed pattern, exercised by every markup test
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

#[allow(clippy::expect_used)] // Fixed pattern, exercised by every markup test
static INTER_TAG_GAPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("inter-tag pattern compiles"));

/// Render a classified body for display.
///
/// JSON that fails to parse (possible when the classification came from an
/// unreliable header) falls back to the raw text rather than erroring.
#[must_use]
pub fn format_body(kind: ResponseKind, body: &str) -> String {
    match kind {
        ResponseKind::Json => match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string())
            }
            Err(_) => body.to_string(),
        },
        ResponseKind::Html | ResponseKind::Xml => collapse_markup(body),
        ResponseKind::Empty => EMPTY_BODY_PLACEHOLDER.to_string(),
        ResponseKind::Text => body.to_string(),
    }
}

/// Render response headers as pretty-printed JSON.
#[must_use]
pub fn format_headers(headers: &BTreeMap<String, String>) -> String {
    serde_json::to_string_pretty(headers).unwrap_or_else(|_| "{}".to_string())
}

/// Collapse whitespace runs to single spaces, drop the gaps between
/// adjacent tags, trim the ends.
fn collapse_markup(body: &str) -> String {
    let collapsed = WHITESPACE_RUNS.replace_all(body, " ");
    let joined = INTER_TAG_GAPS.replace_all(&collapsed, "><");
    joined.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_json_is_pretty_printed() {
        let formatted = format_body(ResponseKind::Json, "{\"b\":2,\"a\":1}");
        assert_eq!(formatted, "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[test]
    fn test_unparseable_json_falls_back_to_raw() {
        let formatted = format_body(ResponseKind::Json, "{broken");
        assert_eq!(formatted, "{broken");
    }

    #[test]
    fn test_html_loses_inter_tag_whitespace() {
        let body = "<html>\n  <body>Hi</body>\n</html>";
        assert_eq!(
            format_body(ResponseKind::Html, body),
            "<html><body>Hi</body></html>"
        );
    }

    #[test]
    fn test_markup_text_runs_collapse_to_single_spaces() {
        let body = "<p>\n  Hello   there\n  world\n</p>";
        assert_eq!(format_body(ResponseKind::Html, body), "<p> Hello there world </p>");
    }

    #[test]
    fn test_xml_declaration_survives_compaction() {
        let body = "<?xml version=\"1.0\"?>\n<root>\n  <a>1</a>\n</root>";
        assert_eq!(
            format_body(ResponseKind::Xml, body),
            "<?xml version=\"1.0\"?><root><a>1</a></root>"
        );
    }

    #[test]
    fn test_empty_body_becomes_placeholder() {
        assert_eq!(format_body(ResponseKind::Empty, ""), EMPTY_BODY_PLACEHOLDER);
        assert_eq!(format_body(ResponseKind::Empty, "  \n "), EMPTY_BODY_PLACEHOLDER);
    }

    #[test]
    fn test_text_passes_through_unchanged() {
        let body = "  leading and trailing  \n kept ";
        assert_eq!(format_body(ResponseKind::Text, body), body);
    }

    #[test]
    fn test_headers_render_as_pretty_json() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "text/plain".to_string());
        assert_eq!(
            format_headers(&headers),
            "{\n  \"content-type\": \"text/plain\"\n}"
        );
    }

    proptest! {
        #[test]
        fn test_pretty_json_round_trips(
            entries in proptest::collection::vec(("[a-z]{1,8}", any::<i64>()), 0..6),
        ) {
            let mut map = serde_json::Map::new();
            for (k, v) in entries {
                map.insert(k, serde_json::Value::from(v));
            }
            let original = serde_json::Value::Object(map);
            let body = original.to_string();

            let formatted = format_body(ResponseKind::Json, &body);
            let reparsed: serde_json::Value =
                serde_json::from_str(&formatted).expect("formatted JSON parses");
            prop_assert_eq!(reparsed, original);
        }
    }
}
