//! Pattern-based diagram scan
//!
//! Each matcher recognizes one markup convention for embedding diagrams.
//! Matchers run over the raw HTML text in a fixed priority order and every
//! match is collected, so the same region may be reported more than once.

use crate::diagram::{DetectionSource, DiagramFragment, Dialect};
use once_cell::sync::Lazy;
use regex::Regex;

/// A named regular expression whose first capture group is the diagram body
pub struct DiagramPattern {
    /// Short identifier used in logs and test-mode output
    pub name: &'static str,
    regex: Regex,
}

impl DiagramPattern {
    fn new(name: &'static str, pattern: &str) -> Option<Self> {
        match Regex::new(pattern) {
            Ok(regex) => Some(Self { name, regex }),
            Err(e) => {
                tracing::error!("Invalid diagram pattern {}: {}", name, e);
                None
            }
        }
    }
}

/// Pattern table in priority order
const PATTERN_SOURCES: &[(&str, &str)] = &[
    // Basic flowchart containers
    (
        "div.flowchart",
        r#"(?s)<div[^>]*class="[^"]*flowchart[^"]*"[^>]*>(.*?)</div>"#,
    ),
    (
        "pre.mermaid",
        r#"(?s)<pre[^>]*class="[^"]*mermaid[^"]*"[^>]*>(.*?)</pre>"#,
    ),
    (
        "div[data-type=flowchart]",
        r#"(?s)<div[^>]*data-type="flowchart"[^>]*>(.*?)</div>"#,
    ),
    // Mermaid containers
    (
        "div.mermaid",
        r#"(?s)<div[^>]*class="[^"]*mermaid[^"]*"[^>]*>(.*?)</div>"#,
    ),
    (
        "code.mermaid",
        r#"(?s)<code[^>]*class="[^"]*mermaid[^"]*"[^>]*>(.*?)</code>"#,
    ),
    // Generic diagram containers
    (
        "div.diagram",
        r#"(?s)<div[^>]*class="[^"]*diagram[^"]*"[^>]*>(.*?)</div>"#,
    ),
    (
        "pre.diagram",
        r#"(?s)<pre[^>]*class="[^"]*diagram[^"]*"[^>]*>(.*?)</pre>"#,
    ),
    // data-* attributed containers
    (
        "div[data-diagram-type]",
        r#"(?s)<div[^>]*data-diagram-type="[^"]*"[^>]*>(.*?)</div>"#,
    ),
    (
        "div[data-mermaid]",
        r#"(?s)<div[^>]*data-mermaid="[^"]*"[^>]*>(.*?)</div>"#,
    ),
    // Fenced code blocks left in the page text
    ("fence.mermaid", r"(?s)```mermaid\s*(.*?)\s*```"),
    ("fence.flowchart", r"(?s)```flowchart\s*(.*?)\s*```"),
    (
        "svg[data-type=flowchart]",
        r#"(?s)<svg[^>]*data-type="flowchart"[^>]*>(.*?)</svg>"#,
    ),
    // Looser id-based containers
    (
        "div#flow",
        r#"(?s)<div[^>]*id="[^"]*flow[^"]*"[^>]*>(.*?)</div>"#,
    ),
    (
        "div#chart",
        r#"(?s)<div[^>]*id="[^"]*chart[^"]*"[^>]*>(.*?)</div>"#,
    ),
    (
        "div#diagram",
        r#"(?s)<div[^>]*id="[^"]*diagram[^"]*"[^>]*>(.*?)</div>"#,
    ),
];

static DIAGRAM_PATTERNS: Lazy<Vec<DiagramPattern>> = Lazy::new(|| {
    PATTERN_SOURCES
        .iter()
        .filter_map(|(name, pattern)| DiagramPattern::new(name, pattern))
        .collect()
});

/// Returns the compiled pattern table in priority order
pub fn diagram_patterns() -> &'static [DiagramPattern] {
    &DIAGRAM_PATTERNS
}

/// Scans raw HTML with every pattern and collects all matches
///
/// A fragment is tagged [`Dialect::Mermaid`] when the whole matched text
/// (tag and body) mentions "mermaid", case-insensitively.
pub fn scan_patterns(html: &str) -> Vec<DiagramFragment> {
    let mut fragments = Vec::new();

    for pattern in diagram_patterns() {
        for captures in pattern.regex.captures_iter(html) {
            let (Some(whole), Some(body)) = (captures.get(0), captures.get(1)) else {
                continue;
            };

            let dialect = Dialect::classify(whole.as_str());
            tracing::debug!("Pattern {} matched a {} diagram", pattern.name, dialect);

            fragments.push(DiagramFragment {
                dialect,
                raw_content: body.as_str().trim().to_string(),
                source: DetectionSource::Pattern(pattern.name),
            });
        }
    }

    fragments
}
