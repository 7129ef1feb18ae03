//! Output module for persisted documents and crawl artifacts
//!
//! This module handles:
//! - Writing rendered Markdown documents
//! - The URL to file mapping and its JSON artifact
//! - The deferred link rewrite pass
//! - Crawl statistics

mod document;
mod mapping;
mod rewrite;
pub mod stats;

pub use document::{ensure_output_dir, read_document, write_document};
pub use mapping::UrlMapping;
pub use rewrite::{rewrite_all, rewrite_links, RewriteSummary};
pub use stats::{print_statistics, CrawlStatistics};
