//! Crawl statistics
//!
//! Counters accumulated by the coordinator while merging page outcomes,
//! plus the summary printed once the crawl and link rewrite are done.

use crate::state::PageState;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// URLs claimed by the crawl, including the start URL
    pub pages_discovered: u64,

    /// Count of pages by final state
    pub pages_by_state: HashMap<PageState, u64>,

    /// Mermaid fences spliced into saved documents
    pub diagrams_rendered: u64,

    /// In-scope links found on expanded pages, before deduplication
    pub links_found: u64,

    /// Links pointed at local files by the rewrite pass
    pub links_rewritten: u64,

    /// Entries in the URL mapping
    pub mapping_entries: u64,

    /// Deepest level a page was rendered at
    pub max_depth_reached: u32,
}

impl CrawlStatistics {
    /// Records a page reaching `state`
    pub fn record(&mut self, state: PageState) {
        *self.pages_by_state.entry(state).or_insert(0) += 1;
    }

    /// Number of pages that ended in `state`
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn pages_saved(&self) -> u64 {
        self.count(PageState::Saved)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.count(PageState::FetchFailed)
    }

    pub fn persist_failures(&self) -> u64 {
        self.count(PageState::PersistFailed)
    }

    /// Percentage of discovered pages that were saved
    pub fn success_rate(&self) -> f64 {
        if self.pages_discovered > 0 {
            (self.pages_saved() as f64 / self.pages_discovered as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Emits the summary through `tracing`
    pub fn log(&self) {
        tracing::info!(
            "Crawl finished: {} saved, {} fetch failures, {} persist failures, {} diagrams, {} links rewritten",
            self.pages_saved(),
            self.fetch_failures(),
            self.persist_failures(),
            self.diagrams_rendered,
            self.links_rewritten
        );
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages discovered: {}", stats.pages_discovered);
    println!("  Deepest level rendered: {}", stats.max_depth_reached);
    println!("  In-scope links found: {}", stats.links_found);
    println!("  Diagrams rendered: {}", stats.diagrams_rendered);
    println!("  Links rewritten: {}", stats.links_rewritten);
    println!("  Mapping entries: {}", stats.mapping_entries);
    println!();

    println!("Pages by State:");
    // Sort states by count (descending)
    let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

    for (state, count) in state_counts {
        let percentage = if stats.pages_discovered > 0 {
            (*count as f64 / stats.pages_discovered as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages saved)",
        stats.success_rate(),
        stats.pages_saved(),
        stats.pages_discovered
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let mut stats = CrawlStatistics::default();
        stats.record(PageState::Saved);
        stats.record(PageState::Saved);
        stats.record(PageState::FetchFailed);

        assert_eq!(stats.pages_saved(), 2);
        assert_eq!(stats.fetch_failures(), 1);
        assert_eq!(stats.persist_failures(), 0);
    }

    #[test]
    fn test_success_rate() {
        let mut stats = CrawlStatistics {
            pages_discovered: 4,
            ..Default::default()
        };
        stats.record(PageState::Saved);
        stats.record(PageState::Saved);
        stats.record(PageState::Saved);

        assert!((stats.success_rate() - 75.0).abs() < f64::EPSILON);
        assert_eq!(CrawlStatistics::default().success_rate(), 0.0);
    }
}
