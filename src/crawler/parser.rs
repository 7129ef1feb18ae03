//! HTML parser for extracting links and metadata
//!
//! This module handles parsing fetched pages to extract:
//! - In-scope links to follow (from `<a href>` tags)
//! - The page title, for logging

use crate::url::UrlScope;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// In-scope links in document order, fragments removed, no duplicates
    pub links: Vec<Url>,
}

/// Parses HTML content and extracts in-scope links and the title
///
/// # Link Extraction Rules
///
/// Every `<a href>` is resolved by [`UrlScope::resolve_link`]. That drops:
/// - empty and fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - links outside the crawl scope
/// - hrefs that cannot be resolved
///
/// # Example
///
/// ```
/// use docmirror::crawler::parse_html;
/// use docmirror::url::UrlScope;
/// use url::Url;
///
/// let scope = UrlScope::new("https://example.com/docs").unwrap();
/// let page = Url::parse("https://example.com/docs").unwrap();
/// let html = r#"<title>Docs</title><a href="/docs/intro">Intro</a><a href="/blog">Blog</a>"#;
///
/// let parsed = parse_html(html, &page, &scope);
/// assert_eq!(parsed.title.as_deref(), Some("Docs"));
/// assert_eq!(parsed.links.len(), 1);
/// ```
pub fn parse_html(html: &str, page_url: &Url, scope: &UrlScope) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, page_url, scope),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all in-scope links from the HTML document
fn extract_links(document: &Html, page_url: &Url, scope: &UrlScope) -> Vec<Url> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        match scope.resolve_link(href, page_url) {
            Some(url) => {
                if seen.insert(url.as_str().to_string()) {
                    links.push(url);
                }
            }
            None => tracing::trace!("Ignoring link {} on {}", href, page_url),
        }
    }

    links
}
