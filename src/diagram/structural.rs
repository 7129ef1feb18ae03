//! DOM-based diagram scan
//!
//! Independent of the pattern scan: parses the document and looks for
//! diagram containers by element name and attributes, capturing their text
//! content.

use crate::diagram::{DetectionSource, DiagramFragment, Dialect};
use scraper::{ElementRef, Html, Selector};

/// `div`/`pre` elements whose class attribute mentions a diagram kind
const CLASS_CONTAINERS: &str = r#"div[class*="flowchart"], div[class*="mermaid"], pre[class*="flowchart"], pre[class*="mermaid"]"#;

/// Any element explicitly marked as a flowchart
const DATA_TYPE_CONTAINERS: &str = r#"[data-type="flowchart"]"#;

/// Scans a parsed document for diagram containers
///
/// Class-based containers are tagged [`Dialect::Mermaid`] when their class
/// attribute mentions "mermaid"; `data-type="flowchart"` containers are
/// always [`Dialect::GenericFlowchart`]. An element matched by both
/// selectors is reported twice.
pub fn scan_document(document: &Html) -> Vec<DiagramFragment> {
    let mut fragments = Vec::new();

    if let Ok(selector) = Selector::parse(CLASS_CONTAINERS) {
        for element in document.select(&selector) {
            let class = element.value().attr("class").unwrap_or("");
            let dialect = Dialect::classify(class);
            push_fragment(&mut fragments, element, dialect, "class");
        }
    }

    if let Ok(selector) = Selector::parse(DATA_TYPE_CONTAINERS) {
        for element in document.select(&selector) {
            push_fragment(
                &mut fragments,
                element,
                Dialect::GenericFlowchart,
                "data-type",
            );
        }
    }

    fragments
}

/// Parses raw HTML and scans it for diagram containers
pub fn scan_structure(html: &str) -> Vec<DiagramFragment> {
    scan_document(&Html::parse_document(html))
}

fn push_fragment(
    fragments: &mut Vec<DiagramFragment>,
    element: ElementRef<'_>,
    dialect: Dialect,
    rule: &'static str,
) {
    let text = element.text().collect::<String>().trim().to_string();
    tracing::debug!(
        "Element <{}> matched structural rule {} as a {} diagram",
        element.value().name(),
        rule,
        dialect
    );
    fragments.push(DiagramFragment {
        dialect,
        raw_content: text,
        source: DetectionSource::Structural(rule),
    });
}
