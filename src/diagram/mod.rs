//! Diagram extraction module for docmirror
//!
//! Locates diagram definitions embedded in raw HTML and reduces them to
//! Mermaid source. Two independent scans run over every page:
//! - a pattern scan over the raw text (fast, tolerant of broken markup)
//! - a structural scan over the parsed DOM
//!
//! Their results are concatenated, not deduplicated.

mod canonical;
mod patterns;
mod structural;

pub use canonical::{canonicalize, mermaid_fence, render_fence};
pub use patterns::{diagram_patterns, scan_patterns, DiagramPattern};
pub use structural::{scan_document, scan_structure};

use std::fmt;

/// Diagram description syntax of a captured fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Mermaid,
    GenericFlowchart,
}

impl Dialect {
    /// Classifies matched text: anything mentioning "mermaid" is Mermaid
    pub fn classify(matched: &str) -> Self {
        if matched.to_lowercase().contains("mermaid") {
            Dialect::Mermaid
        } else {
            Dialect::GenericFlowchart
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Mermaid => "mermaid",
            Dialect::GenericFlowchart => "flowchart",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which scan produced a fragment, with the rule that matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    /// Named entry of the pattern table
    Pattern(&'static str),
    /// Structural rule (`class` or `data-type`)
    Structural(&'static str),
}

impl fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionSource::Pattern(name) => write!(f, "pattern {}", name),
            DetectionSource::Structural(rule) => write!(f, "structural {}", rule),
        }
    }
}

/// A diagram captured from a page, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramFragment {
    pub dialect: Dialect,
    pub raw_content: String,
    pub source: DetectionSource,
}

impl DiagramFragment {
    /// Canonical Mermaid fence for this fragment, if it has any content
    pub fn fence(&self) -> Option<String> {
        render_fence(self)
    }
}

/// Runs both scans over a page and returns every fragment found
///
/// Pattern matches come first, in pattern priority order, followed by
/// structural matches in document order.
///
/// # Examples
///
/// ```
/// use docmirror::diagram::{extract_diagrams, Dialect};
///
/// let fragments = extract_diagrams(r#"<div class="flowchart">graph TD;A-->B;</div>"#);
/// assert!(!fragments.is_empty());
/// assert!(fragments.iter().all(|f| f.dialect == Dialect::GenericFlowchart));
/// ```
pub fn extract_diagrams(html: &str) -> Vec<DiagramFragment> {
    let mut fragments = scan_patterns(html);
    let structural = scan_structure(html);

    tracing::debug!(
        "Diagram scan found {} pattern and {} structural fragments",
        fragments.len(),
        structural.len()
    );

    fragments.extend(structural);
    fragments
}
