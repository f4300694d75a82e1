//! Storage Layer - the shortcut store contract and its engines
//!
//! System of record is SQLite with tables:
//! - shortcuts(id, name, path, created_at, updated_at)
//! - tags(id, name)
//! - shortcut_tags(shortcut_id, tag_id)
//!
//! Callers depend on [`ShortcutStore`], never on an engine directly.
//! [`MemoryStore`] implements the same contract without a database.

pub mod schema;
pub mod sqlite;
pub mod memory;

pub use sqlite::SqliteStore;
pub use memory::MemoryStore;

use crate::Result;
use crate::query::SearchQuery;
use crate::shortcut::{Shortcut, TagUsage};

/// Operations every shortcut storage engine provides.
///
/// Every operation that takes a shortcut name fails with
/// [`Error::NotFound`](crate::Error::NotFound) when no shortcut has exactly
/// that name. Returned shortcuts always carry their full, sorted tag list.
pub trait ShortcutStore {
    /// Insert a new shortcut. Fails with `DuplicateName` if `name` is taken.
    fn add_shortcut(&mut self, name: &str, path: &str) -> Result<()>;

    fn get_shortcut(&self, name: &str) -> Result<Shortcut>;

    /// All shortcuts, sorted by name
    fn list_shortcuts(&self) -> Result<Vec<Shortcut>>;

    /// Delete a shortcut and its tag links. Tags themselves are kept.
    fn delete_shortcut(&mut self, name: &str) -> Result<()>;

    fn update_shortcut_path(&mut self, name: &str, new_path: &str) -> Result<()>;

    /// Rename in place. Fails with `DuplicateName` if `new_name` belongs to
    /// another shortcut.
    fn update_shortcut_name(&mut self, old_name: &str, new_name: &str) -> Result<()>;

    /// Link each tag, creating missing tags. Already-linked tags are skipped.
    ///
    /// Not atomic across the batch: tags linked before a failure stay linked.
    fn add_tags(&mut self, name: &str, tags: &[String]) -> Result<()>;

    /// Unlink each tag. Tags that are not linked are skipped.
    fn remove_tags(&mut self, name: &str, tags: &[String]) -> Result<()>;

    /// Sorted tag names linked to `name`
    fn get_shortcut_tags(&self, name: &str) -> Result<Vec<String>>;

    /// Shortcuts matching `query`, de-duplicated and sorted by name
    fn search_shortcuts(&self, query: &SearchQuery) -> Result<Vec<Shortcut>>;

    /// Every tag, orphans included, with link counts, sorted by name
    fn list_tags(&self) -> Result<Vec<TagUsage>>;

    /// Release the underlying resources
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
