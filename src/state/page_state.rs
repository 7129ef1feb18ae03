/// Page state definitions for tracking crawl progress
///
/// This module defines all possible states a page can be in during a crawl.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page is claimed (in the visited set) and waiting in the frontier
    Pending,

    /// Page is currently being fetched and rendered
    Fetching,

    // ===== Terminal Success States =====
    /// Page was fetched, rendered and written to disk
    Saved,

    // ===== Terminal Error States =====
    /// Network error, timeout or non-2xx response
    FetchFailed,

    /// Page was rendered but the file could not be written
    ///
    /// The page still has an entry in the URL mapping.
    PersistFailed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (page may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Fetching)
    }

    /// Returns true if moving from `self` to `next` is a valid transition
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Fetching, Self::Saved)
                | (Self::Fetching, Self::FetchFailed)
                | (Self::Fetching, Self::PersistFailed)
        )
    }

    /// Short lowercase name used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Saved => "saved",
            Self::FetchFailed => "fetch_failed",
            Self::PersistFailed => "persist_failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
