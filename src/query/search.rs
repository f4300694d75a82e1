//! Search query definition and the in-process matching predicate
//!
//! The SQLite engine compiles a [`SearchQuery`] to SQL; the in-memory engine
//! evaluates [`SearchQuery::matches`] directly. Both must agree, so text
//! matching is ASCII-case-insensitive only, mirroring SQLite's `LIKE`.

use serde::{Deserialize, Serialize};

use crate::shortcut::Shortcut;

/// How a set of tag filters restricts the candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatch {
    /// Linked to at least one of the filter tags (union)
    #[default]
    Any,
    /// Linked to every filter tag (intersection)
    All,
}

/// Free-text query plus tag filters.
///
/// An empty query and no tags matches every shortcut.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub tags: Vec<String>,
    pub mode: TagMatch,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Everything, no filters
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mode(mut self, mode: TagMatch) -> Self {
        self.mode = mode;
        self
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Filter tags with duplicates removed, sorted
    pub fn distinct_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }

    /// `LIKE` pattern for the text query with `%`, `_` and `\` escaped.
    ///
    /// Must be used together with `ESCAPE '\'`.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.text.len() + 2);
        pattern.push('%');
        for c in self.text.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// Does `shortcut` satisfy this query? `shortcut.tags` must be populated.
    pub fn matches(&self, shortcut: &Shortcut) -> bool {
        self.matches_tags(&shortcut.tags) && self.matches_text(&shortcut.name, &shortcut.path)
    }

    fn matches_text(&self, name: &str, path: &str) -> bool {
        if !self.has_text() {
            return true;
        }
        let needle = self.text.to_ascii_lowercase();
        name.to_ascii_lowercase().contains(&needle) || path.to_ascii_lowercase().contains(&needle)
    }

    fn matches_tags(&self, linked: &[String]) -> bool {
        if !self.has_tags() {
            return true;
        }
        let linked_has = |tag: &&str| linked.iter().any(|l| l.as_str() == *tag);
        let filters = self.distinct_tags();
        match self.mode {
            TagMatch::Any => filters.iter().any(linked_has),
            TagMatch::All => filters.iter().all(linked_has),
        }
    }
}
