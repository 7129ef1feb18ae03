//! Crawler module for mirroring a documentation subtree
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with randomized client identity
//! - Link extraction restricted to the crawl scope
//! - Frontier, visited set and politeness scheduling
//! - Overall crawl coordination and the final link rewrite

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, CrawlSession, PageOutcome};
pub use fetcher::{build_http_client, fetch_page, pick_user_agent};
pub use parser::{parse_html, ParsedPage};
pub use scheduler::{QueuedUrl, RateGate, Scheduler};

use crate::config::Config;
use crate::diagram::{extract_diagrams, DiagramFragment};
use crate::render::render_page;
use crate::url::UrlScope;
use crate::Result;

/// Results of running the diagram pipeline on a single page
#[derive(Debug, Clone)]
pub struct PageInspection {
    pub url: String,

    /// Every fragment both scans reported, in report order
    pub fragments: Vec<DiagramFragment>,

    /// Rendered fence per fragment; `None` for fragments that normalize to nothing
    pub fences: Vec<Option<String>>,

    /// Converted Markdown body with fences spliced in
    pub markdown: String,

    pub diagrams_rendered: usize,
}

/// Fetches one page and runs extraction and rendering without persisting
///
/// Nothing is written to disk and no links are followed.
pub async fn inspect_page(config: &Config, url: &str) -> Result<PageInspection> {
    let scope = UrlScope::new(url)?;
    let client = build_http_client(&config.fetch)?;

    let html = fetch_page(&client, scope.base(), &config.fetch.user_agents).await?;
    let fragments = extract_diagrams(&html);
    let fences = fragments.iter().map(|f| f.fence()).collect();
    let page = render_page(&html, &fragments);

    Ok(PageInspection {
        url: scope.base().to_string(),
        fragments,
        fences,
        markdown: page.markdown,
        diagrams_rendered: page.diagrams_rendered,
    })
}
