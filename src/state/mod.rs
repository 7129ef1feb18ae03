//! State module for tracking crawl progress
//!
//! Every URL claimed by a crawl moves through a small state machine:
//! `Pending -> Fetching -> Saved | FetchFailed | PersistFailed`.
//! No state is ever retried within a run.

mod page_state;

pub use page_state::PageState;
