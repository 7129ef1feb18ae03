use serde::Deserialize;
use std::time::Duration;

/// Browser identities rotated across requests
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
];

/// Largest accepted politeness delay (seconds)
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Main configuration structure for docmirror
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to expand from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Ignore `max_depth` and follow the whole reachable in-scope graph
    #[serde(rename = "unbounded-depth")]
    pub unbounded_depth: bool,

    /// Maximum number of pages processed at the same time
    pub concurrency: u32,

    /// Minimum time between two fetches to the same origin (seconds)
    #[serde(rename = "delay-secs")]
    pub delay_secs: f64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            unbounded_depth: false,
            concurrency: 1,
            delay_secs: 1.0,
        }
    }
}

impl CrawlerConfig {
    /// The depth limit, or `None` when the crawl is unbounded
    pub fn depth_limit(&self) -> Option<u32> {
        if self.unbounded_depth {
            None
        } else {
            Some(self.max_depth)
        }
    }

    /// The politeness delay as a `Duration`
    ///
    /// Negative or non-finite values collapse to zero and values above
    /// [`MAX_DELAY_SECS`] are clamped; validation rejects both before a crawl
    /// starts.
    pub fn delay(&self) -> Duration {
        if self.delay_secs.is_finite() && self.delay_secs > 0.0 {
            Duration::from_secs_f64(self.delay_secs.min(MAX_DELAY_SECS))
        } else {
            Duration::ZERO
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Pool of User-Agent strings, one picked at random per request
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory; derived from the start URL when unset
    pub directory: Option<String>,

    /// File name of the URL to file mapping, written inside the output directory
    #[serde(rename = "mapping-file")]
    pub mapping_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            mapping_file: "url_mapping.json".to_string(),
        }
    }
}
