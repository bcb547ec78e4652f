//! Response classification
//!
//! Assigns a semantic body type from the declared content type and, when
//! that is absent or unrecognized, from the body text itself. Pure and
//! best-effort: parse attempts are probes, ties are broken by a fixed
//! priority order, and a recognized content type always wins over body
//! sniffing.

use std::fmt;

/// Semantic type of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Body parses as JSON
    Json,
    /// HTML markup
    Html,
    /// XML markup
    Xml,
    /// Anything else with content
    Text,
    /// Body is empty after trimming
    Empty,
}

impl ResponseKind {
    /// Lowercase name used in tool output and statistics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::Xml => "xml",
            Self::Text => "text",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parses_as_json(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body).is_ok()
}

/// Classify a response body given its declared content type.
///
/// Header rules run first, matched case-insensitively by substring so
/// parameters like `; charset=utf-8` do not interfere. A `application/json`
/// declaration is verified with a parse probe and demoted to text when the
/// body does not actually parse. An unmatched or absent content type falls
/// through to [`sniff_body`].
#[must_use]
pub fn classify(content_type: Option<&str>, body: &str) -> ResponseKind {
    if let Some(raw) = content_type {
        let ct = raw.to_ascii_lowercase();
        if ct.contains("application/json") {
            return if parses_as_json(body) {
                ResponseKind::Json
            } else {
                ResponseKind::Text
            };
        }
        if ct.contains("text/html") {
            return ResponseKind::Html;
        }
        if ct.contains("text/xml") || ct.contains("application/xml") {
            return ResponseKind::Xml;
        }
        if ct.contains("text/plain") {
            return ResponseKind::Text;
        }
    }
    sniff_body(body)
}

/// Classify from the body text alone.
///
/// Markup requires an opening angle bracket at the start plus a closing
/// bracket, and either a closing tag or an XML declaration; a lone `<br>`
/// stays text.
#[must_use]
pub fn sniff_body(body: &str) -> ResponseKind {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return ResponseKind::Empty;
    }
    if parses_as_json(trimmed) {
        return ResponseKind::Json;
    }
    if trimmed.starts_with('<')
        && trimmed.contains('>')
        && (trimmed.contains("</") || trimmed.starts_with("<?xml"))
    {
        return if trimmed.starts_with("<?xml") {
            ResponseKind::Xml
        } else {
            ResponseKind::Html
        };
    }
    ResponseKind::Text
}
