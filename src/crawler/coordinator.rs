//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop, which:
//! - Owns the per-run [`CrawlSession`] (frontier, visited set, mapping, states)
//! - Dispatches page tasks to a bounded pool of workers
//! - Merges every [`PageOutcome`] back into the session
//! - Runs the link rewrite pass once the frontier has drained and no task is
//!   in flight
//!
//! Workers never touch the session. They fetch, render and persist one page
//! and report back; all bookkeeping happens on the coordinator task.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::parse_html;
use crate::crawler::scheduler::{QueuedUrl, RateGate, Scheduler};
use crate::diagram::extract_diagrams;
use crate::output::{
    ensure_output_dir, rewrite_all, write_document, CrawlStatistics, RewriteSummary, UrlMapping,
};
use crate::render::render_document;
use crate::state::PageState;
use crate::url::{to_file_path, UrlScope};
use crate::{MirrorError, Result};
use chrono::Utc;
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// What a worker reports after processing one URL
#[derive(Debug)]
pub enum PageOutcome {
    /// The fetch failed; nothing was rendered or written
    FetchFailed { queued: QueuedUrl, error: MirrorError },

    /// The page was rendered; `persisted` tells whether the file was written
    Rendered {
        queued: QueuedUrl,
        title: Option<String>,
        file_name: String,
        persisted: Result<()>,
        diagrams_rendered: usize,
        links: Vec<Url>,
    },
}

/// Result of a finished crawl
#[derive(Debug)]
pub struct CrawlReport {
    /// Directory every document was written to
    pub output_dir: PathBuf,

    /// URL to file mapping, in render order
    pub mapping: UrlMapping,

    /// Where the mapping was written; `None` if the write failed
    pub mapping_path: Option<PathBuf>,

    /// Final state of every claimed URL
    pub states: HashMap<String, PageState>,

    pub statistics: CrawlStatistics,

    pub rewrite: RewriteSummary,
}

impl CrawlReport {
    /// Final state of a URL, if the crawl ever claimed it
    pub fn state_of(&self, url: &str) -> Option<PageState> {
        self.states.get(url).copied()
    }
}

/// Mutable state of one crawl run, owned by the coordinator
#[derive(Debug)]
pub struct CrawlSession {
    scheduler: Scheduler,
    mapping: UrlMapping,
    states: HashMap<String, PageState>,
    statistics: CrawlStatistics,
}

impl CrawlSession {
    fn new(max_depth: Option<u32>) -> Self {
        Self {
            scheduler: Scheduler::new(max_depth),
            mapping: UrlMapping::new(),
            states: HashMap::new(),
            statistics: CrawlStatistics::default(),
        }
    }

    /// Claims a URL at `depth` if it is new and within the depth limit
    fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        let key = url.as_str().to_string();
        if self.scheduler.enqueue_if_new(url, depth) {
            self.states.insert(key, PageState::Pending);
            self.statistics.pages_discovered += 1;
            true
        } else {
            false
        }
    }

    fn transition(&mut self, url: &Url, next: PageState) {
        let state = self
            .states
            .entry(url.as_str().to_string())
            .or_insert(PageState::Pending);

        if !state.can_transition_to(next) {
            tracing::warn!("Unexpected state change for {}: {} -> {}", url, state, next);
        }
        *state = next;

        if next.is_terminal() {
            self.statistics.record(next);
        }
    }

    /// Folds a worker's report into the session
    fn merge(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::FetchFailed { queued, error } => {
                if error.is_fetch_error() {
                    tracing::warn!("Fetch failed for {}: {}", queued.url, error);
                } else {
                    tracing::error!("Could not fetch {}: {}", queued.url, error);
                }
                self.transition(&queued.url, PageState::FetchFailed);
            }

            PageOutcome::Rendered {
                queued,
                title,
                file_name,
                persisted,
                diagrams_rendered,
                links,
            } => {
                // Recorded even if the write failed.
                self.mapping.insert(queued.url.as_str(), file_name.as_str());
                self.statistics.max_depth_reached =
                    self.statistics.max_depth_reached.max(queued.depth);

                match persisted {
                    Ok(()) => {
                        tracing::info!(
                            "Saved {} -> {}{}",
                            queued.url,
                            file_name,
                            title.map(|t| format!(" ({})", t)).unwrap_or_default()
                        );
                        self.statistics.diagrams_rendered += diagrams_rendered as u64;
                        self.transition(&queued.url, PageState::Saved);
                    }
                    Err(e) => {
                        tracing::warn!("Could not save {}: {}", queued.url, e);
                        self.transition(&queued.url, PageState::PersistFailed);
                    }
                }

                self.statistics.links_found += links.len() as u64;
                let mut enqueued = 0;
                for link in links {
                    if self.enqueue(link, queued.depth + 1) {
                        enqueued += 1;
                    }
                }
                if enqueued > 0 {
                    tracing::debug!("{} new URLs from {}", enqueued, queued.url);
                }
            }
        }
    }
}

/// Everything a worker needs, shared read-only across tasks
struct PageContext {
    client: Client,
    gate: RateGate,
    scope: UrlScope,
    output_dir: PathBuf,
    user_agents: Vec<String>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: Arc<PageContext>,
    start_url: Url,
    concurrency: usize,
    max_depth: Option<u32>,
    mapping_file: String,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The merged and validated configuration
    /// * `start_url` - The crawl root; its directory becomes the scope
    /// * `output_dir` - Where documents and the mapping are written
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(MirrorError)` - The start URL is invalid or the client failed
    pub fn new(config: &Config, start_url: &str, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let scope = UrlScope::new(start_url)?;
        let mut start = scope.base().clone();
        start.set_fragment(None);

        let client = build_http_client(&config.fetch)?;

        Ok(Self {
            context: Arc::new(PageContext {
                client,
                gate: RateGate::new(config.crawler.delay()),
                scope,
                output_dir: output_dir.into(),
                user_agents: config.fetch.user_agents.clone(),
            }),
            start_url: start,
            concurrency: config.crawler.concurrency.max(1) as usize,
            max_depth: config.crawler.depth_limit(),
            mapping_file: config.output.mapping_file.clone(),
        })
    }

    /// The crawl scope
    pub fn scope(&self) -> &UrlScope {
        &self.context.scope
    }

    pub fn output_dir(&self) -> &Path {
        &self.context.output_dir
    }

    /// Runs the crawl to completion
    ///
    /// 1. Creates the output directory (the only fatal failure)
    /// 2. Processes the frontier until it is empty and no task is in flight
    /// 3. Writes the URL mapping
    /// 4. Rewrites links in every persisted document
    pub async fn run(self) -> Result<CrawlReport> {
        ensure_output_dir(&self.context.output_dir).await?;

        tracing::info!(
            "Crawling {} (scope {}, depth {}, concurrency {})",
            self.start_url,
            self.context.scope.prefix(),
            self.max_depth
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unbounded".to_string()),
            self.concurrency
        );

        let mut session = CrawlSession::new(self.max_depth);
        session.enqueue(self.start_url.clone(), 0);

        let start_time = std::time::Instant::now();
        let mut tasks = JoinSet::new();

        loop {
            while tasks.len() < self.concurrency {
                let Some(queued) = session.scheduler.next_url() else {
                    break;
                };

                session.transition(&queued.url, PageState::Fetching);
                let expand = session.scheduler.should_expand(queued.depth);
                tasks.spawn(process_page(Arc::clone(&self.context), queued, expand));
            }

            match tasks.join_next().await {
                Some(Ok(outcome)) => session.merge(outcome),
                Some(Err(e)) => tracing::error!("Page task aborted: {}", e),
                // Nothing in flight and nothing queued.
                None => break,
            }
        }

        tracing::info!(
            "Frontier drained: {} URLs claimed in {:?}",
            session.scheduler.visited_count(),
            start_time.elapsed()
        );

        let mapping_path = self.context.output_dir.join(&self.mapping_file);
        let mapping_path = match session.mapping.write(&mapping_path).await {
            Ok(()) => Some(mapping_path),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        };

        let rewrite = rewrite_all(
            &self.context.output_dir,
            &session.mapping,
            &self.context.scope,
        )
        .await;

        let mut statistics = session.statistics;
        statistics.links_rewritten = rewrite.links_rewritten as u64;
        statistics.mapping_entries = session.mapping.len() as u64;
        statistics.log();

        Ok(CrawlReport {
            output_dir: self.context.output_dir.clone(),
            mapping: session.mapping,
            mapping_path,
            states: session.states,
            statistics,
            rewrite,
        })
    }
}

/// Fetches, renders and persists one page
async fn process_page(ctx: Arc<PageContext>, queued: QueuedUrl, expand: bool) -> PageOutcome {
    ctx.gate.wait(&queued.url).await;
    tracing::debug!("Fetching {} (depth {})", queued.url, queued.depth);

    let html = match fetch_page(&ctx.client, &queued.url, &ctx.user_agents).await {
        Ok(html) => html,
        Err(error) => return PageOutcome::FetchFailed { queued, error },
    };

    let fragments = extract_diagrams(&html);
    let rendered = render_document(queued.url.as_str(), &html, &fragments, Utc::now());

    let file_name = to_file_path(queued.url.as_str());
    let persisted = write_document(&ctx.output_dir.join(&file_name), &rendered.markdown).await;

    let parsed = parse_html(&html, &queued.url, &ctx.scope);
    let links = if expand {
        parsed.links
    } else {
        tracing::debug!("Not expanding {}: depth limit reached", queued.url);
        Vec::new()
    };

    PageOutcome::Rendered {
        queued,
        title: parsed.title,
        file_name,
        persisted,
        diagrams_rendered: rendered.diagrams_rendered,
        links,
    }
}

/// Runs a complete crawl from `start_url` into `output_dir`
///
/// # Example
///
/// ```no_run
/// use docmirror::config::Config;
/// use docmirror::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(&Config::default(), "https://example.com/docs", "output").await?;
/// println!("{} pages mapped", report.mapping.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    start_url: &str,
    output_dir: impl Into<PathBuf>,
) -> Result<CrawlReport> {
    Coordinator::new(config, start_url, output_dir)?.run().await
}
