//! Tools the agent can call mid-turn.

#[cfg(feature = "search")]
pub mod search;

#[cfg(feature = "search")]
pub use search::{DuckDuckGoSearch, SafeSearch, SearchOptions, SearchResult};
