//! Query layer - search over shortcuts
//!
//! Provides the search predicate shared by every storage engine:
//! - Case-insensitive substring match over name and path
//! - Tag-set filtering, either any-of or all-of

pub mod search;

pub use search::{SearchQuery, TagMatch};
