//! Diagram text normalization
//!
//! Reduces captured diagram text, whatever markup or wrapping it arrived in,
//! to canonical Mermaid source and renders it as a fenced block.

use crate::diagram::{DiagramFragment, Dialect};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static QUOTED_SUBGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"subgraph\s+"([^"]+)""#).expect("valid regex"));

/// Normalizes raw diagram text into canonical Mermaid source
///
/// # Steps
///
/// 1. Decode HTML entities
/// 2. Collapse whitespace runs to single spaces and trim
/// 3. Unwrap JSON payloads exposing a `content` or `diagram` string
/// 4. Strip remaining HTML tags
/// 5. Decode HTML entities again (JSON payloads may be double-escaped)
/// 6. Decode literal `<br>`, `>`, `\"` and `\n` sequences
/// 7. For Mermaid, rewrite a leading `graph` keyword to `flowchart`; text
///    without a diagram type keyword is left as-is
/// 8. Rewrite `subgraph "Label"` to `subgraph Label["Label"]`
///
/// Returns `None` when nothing is left.
///
/// # Examples
///
/// ```
/// use docmirror::diagram::{canonicalize, Dialect};
///
/// let content = canonicalize("graph TD;A--&gt;B;", Dialect::Mermaid).unwrap();
/// assert_eq!(content, "flowchart TD;A-->B;");
/// ```
pub fn canonicalize(raw: &str, dialect: Dialect) -> Option<String> {
    let decoded = html_escape::decode_html_entities(raw);
    let collapsed = WHITESPACE_RUN.replace_all(&decoded, " ");
    let mut content = collapsed.trim().to_string();

    if let Some(unwrapped) = unwrap_json_payload(&content) {
        content = unwrapped;
    }

    let content = HTML_TAG.replace_all(&content, "");
    let content = html_escape::decode_html_entities(&content);
    let mut content = content
        .replace("\\u003cbr\\u003e", ">")
        .replace("\\u003e", ">")
        .replace("\\\"", "\"")
        .replace("\\n", "\n");

    if dialect == Dialect::Mermaid && content.starts_with("graph") {
        content = content.replacen("graph", "flowchart", 1);
    }

    let content = QUOTED_SUBGRAPH
        .replace_all(&content, r#"subgraph ${1}["${1}"]"#)
        .into_owned();

    let content = content.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

/// Wraps canonical Mermaid source in a fenced code block
pub fn mermaid_fence(content: &str) -> String {
    format!("```mermaid\n{}\n```", content)
}

/// Normalizes a fragment and renders it as a Mermaid fence
///
/// Fragments that normalize to nothing yield `None` and are dropped.
pub fn render_fence(fragment: &DiagramFragment) -> Option<String> {
    canonicalize(&fragment.raw_content, fragment.dialect).map(|c| mermaid_fence(&c))
}

/// Extracts the diagram source from a JSON-wrapped payload
///
/// Malformed JSON, non-objects and payloads without a string `content` or
/// `diagram` key yield `None`, leaving the caller's text untouched.
fn unwrap_json_payload(content: &str) -> Option<String> {
    if !(content.starts_with('{') && content.ends_with('}')) {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Diagram payload looks like JSON but is not: {}", e);
            return None;
        }
    };

    let object = value.as_object()?;
    ["content", "diagram"]
        .iter()
        .find_map(|key| object.get(*key))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
