//! Section model for the activity feed.

use serde::{Deserialize, Serialize};

/// State of the trailing pagination footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationState {
    /// The next page is being fetched.
    Loading,
    /// The last fetch failed; carries the user-facing title.
    Error(String),
}

/// A titled group of event items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsSection {
    /// Day header, e.g. "Today".
    pub title: String,
    /// Item identifiers in render order. Payloads are resolved through
    /// the list delegate at draw time.
    pub items: Vec<String>,
}

/// A section of the activity feed. The set is closed: every consumer
/// matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    /// A titled group of resolved events.
    Events(EventsSection),
    /// Placeholder rows shown while the first page loads.
    Shimmer(Vec<String>),
    /// Trailing "load more" footer. Contributes no items.
    Pagination(PaginationState),
}

impl Section {
    /// Item identifiers this section contributes to a snapshot.
    pub fn items(&self) -> &[String] {
        match self {
            Section::Events(events) => &events.items,
            Section::Shimmer(items) => items,
            Section::Pagination(_) => &[],
        }
    }
}

/// Stable identity used by the snapshot diff.
///
/// Pagination identities carry a generation counter so that replacing the
/// footer registers as a fresh section rather than an in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Events(String),
    Shimmer,
    Pagination(u64),
}
