//! Markdown rendering module for docmirror
//!
//! Converts a fetched page to Markdown while keeping diagrams where they
//! appeared:
//! 1. A marker token is inserted after every element whose text holds a
//!    diagram's raw content
//! 2. The marked document is converted to Markdown
//! 3. Every marker left in the text is replaced by the diagram's Mermaid fence
//!
//! Markers the conversion dropped are ignored.

mod marker;

pub use marker::{insert_marker, marker_for, MARKER_PREFIX};

use crate::diagram::DiagramFragment;
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Markdown body of a page, before the metadata header is added
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub markdown: String,

    /// Number of fences spliced into the body
    pub diagrams_rendered: usize,
}

/// Converts HTML to Markdown with diagrams spliced back in
///
/// Fragments with identical raw content share one marker, so a diagram
/// reported by both scans is rendered once per location.
pub fn render_page(html: &str, fragments: &[DiagramFragment]) -> RenderedPage {
    let mut document = Html::parse_document(html);
    let mut pending: Vec<(String, String)> = Vec::new();

    for fragment in fragments {
        let marker = marker_for(&fragment.raw_content);
        if pending.iter().any(|(m, _)| *m == marker) {
            continue;
        }

        let Some(fence) = fragment.fence() else {
            tracing::debug!("Dropping empty {} diagram ({})", fragment.dialect, fragment.source);
            continue;
        };

        let inserted = insert_marker(&mut document, &fragment.raw_content, &marker);
        tracing::trace!("Inserted {} markers {}", inserted, marker);
        if inserted > 0 {
            pending.push((marker, fence));
        }
    }

    let converted = if pending.is_empty() {
        html2md::parse_html(html)
    } else {
        html2md::parse_html(&document.html())
    };

    let (markdown, diagrams_rendered) = splice_fences(converted, &pending);
    RenderedPage {
        markdown,
        diagrams_rendered,
    }
}

/// Replaces every marker occurrence with its fence surrounded by blank lines
fn splice_fences(mut markdown: String, pending: &[(String, String)]) -> (String, usize) {
    let mut spliced = 0;

    for (marker, fence) in pending {
        let count = markdown.matches(marker.as_str()).count();
        if count == 0 {
            tracing::debug!("Marker {} did not survive conversion", marker);
            continue;
        }
        markdown = markdown.replace(marker.as_str(), &format!("\n\n{}\n\n", fence));
        spliced += count;
    }

    if spliced > 0 {
        markdown = EXCESS_NEWLINES.replace_all(&markdown, "\n\n").into_owned();
    }

    (markdown, spliced)
}

/// Prefixes a Markdown body with its metadata header
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use docmirror::render::with_metadata;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let doc = with_metadata("https://example.com/a", at, "# A\n");
/// assert_eq!(
///     doc,
///     "---\nsource: https://example.com/a\ncrawled_at: 2024-05-01T12:00:00Z\n---\n\n# A\n"
/// );
/// ```
pub fn with_metadata(source: &str, crawled_at: DateTime<Utc>, body: &str) -> String {
    let mut doc = String::new();
    doc.push_str("---\n");
    doc.push_str(&format!("source: {}\n", source));
    doc.push_str(&format!(
        "crawled_at: {}\n",
        crawled_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    doc.push_str("---\n\n");
    doc.push_str(body);
    doc
}

/// Renders a complete document: metadata header plus Markdown body
pub fn render_document(
    source: &str,
    html: &str,
    fragments: &[DiagramFragment],
    crawled_at: DateTime<Utc>,
) -> RenderedPage {
    let page = render_page(html, fragments);
    RenderedPage {
        markdown: with_metadata(source, crawled_at, &page.markdown),
        diagrams_rendered: page.diagrams_rendered,
    }
}
