//! Scheduler for managing the crawl frontier and politeness
//!
//! This module handles:
//! - The FIFO frontier of `(url, depth)` pairs
//! - The visited set, consulted and updated at enqueue time
//! - The depth policy
//! - Per-origin minimum spacing between fetches

use crate::url::origin_key;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch, without fragment
    pub url: Url,

    /// Number of links followed from the start URL
    pub depth: u32,
}

/// Scheduler owns the frontier and the visited set of one crawl
///
/// A URL is marked visited the moment it is enqueued, so the frontier never
/// holds the same URL twice and no URL is dequeued twice.
#[derive(Debug)]
pub struct Scheduler {
    /// Frontier queue of URLs to fetch, in discovery order
    frontier: VecDeque<QueuedUrl>,

    /// Every URL ever enqueued; never shrinks
    visited: HashSet<String>,

    /// Deepest level that may be enqueued, `None` when unbounded
    max_depth: Option<u32>,
}

impl Scheduler {
    /// Creates an empty scheduler
    ///
    /// # Arguments
    ///
    /// * `max_depth` - The depth limit, or `None` for an unbounded crawl
    pub fn new(max_depth: Option<u32>) -> Self {
        Self {
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            max_depth,
        }
    }

    /// Adds a URL to the frontier unless it was seen before or is too deep
    ///
    /// Returns true if the URL was enqueued.
    pub fn enqueue_if_new(&mut self, url: Url, depth: u32) -> bool {
        if !self.within_depth(depth) {
            tracing::trace!("Not enqueuing {} at depth {}: beyond limit", url, depth);
            return false;
        }

        if !self.visited.insert(url.as_str().to_string()) {
            return false;
        }

        tracing::debug!("Enqueued {} at depth {}", url, depth);
        self.frontier.push_back(QueuedUrl { url, depth });
        true
    }

    /// Takes the next URL off the frontier
    pub fn next_url(&mut self) -> Option<QueuedUrl> {
        self.frontier.pop_front()
    }

    /// Returns true if links found on a page at `depth` should be followed
    ///
    /// Pages at the depth limit are still rendered; only their expansion
    /// stops.
    pub fn should_expand(&self, depth: u32) -> bool {
        match self.max_depth {
            Some(max) => depth < max,
            None => true,
        }
    }

    fn within_depth(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    /// Returns true if the URL has already been claimed by this crawl
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns the number of URLs claimed so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }
}

/// Minimum-interval gate shared by every fetch of a crawl
///
/// Each origin gets one slot per `interval`. A caller reserves the next free
/// slot for its origin under the lock, then sleeps until that slot outside
/// the lock, so concurrent workers queue up behind each other instead of
/// bursting. The first fetch to an origin is never delayed.
#[derive(Debug)]
pub struct RateGate {
    interval: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until a fetch to `url`'s origin may be dispatched
    pub async fn wait(&self, url: &Url) {
        if self.interval.is_zero() {
            return;
        }

        let key = origin_key(url);
        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match next_slot.get(&key) {
                Some(&reserved) if reserved > now => reserved,
                _ => now,
            };
            next_slot.insert(key.clone(), slot + self.interval);
            slot
        };

        let now = Instant::now();
        if slot > now {
            tracing::trace!("Waiting {:?} before fetching from {}", slot - now, key);
            tokio::time::sleep_until(slot).await;
        }
    }
}
