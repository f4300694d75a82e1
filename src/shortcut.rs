//! Entity model - shortcuts, tags and the links between them
//!
//! A [`Shortcut`] binds a unique name to an absolute directory path. Tags are
//! shared labels: one [`Tag`] row can be linked to many shortcuts, and a
//! shortcut can carry many tags. Links live in their own relation; the
//! `tags` field on a shortcut is always derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named binding from a short identifier to a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    /// Store-assigned identity, never reused after deletion
    pub id: i64,
    /// Unique, case-sensitive lookup key
    pub name: String,
    /// Absolute path; existence is checked by the command layer, not the store
    pub path: String,
    /// Linked tag names, sorted and de-duplicated
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shortcut {
    /// Create a shortcut with no tags and both timestamps set to `now`
    pub fn new(id: i64, name: impl Into<String>, path: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a tag list, normalising it to sorted + unique
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = normalize_tags(tags);
        self
    }

    /// `name -> path [a, b]`, the one-line form used by list output and the picker
    pub fn display_line(&self) -> String {
        if self.tags.is_empty() {
            format!("{} -> {}", self.name, self.path)
        } else {
            format!("{} -> {} [{}]", self.name, self.path, self.tags.join(", "))
        }
    }
}

impl std::fmt::Display for Shortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_line())
    }
}

/// A user-defined label shared across shortcuts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A tag together with the number of shortcuts currently linked to it.
///
/// Orphaned tags (no links left) are reported with `shortcuts == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUsage {
    pub tag: Tag,
    pub shortcuts: usize,
}

/// Sort and de-duplicate a tag list
pub fn normalize_tags(mut tags: Vec<String>) -> Vec<String> {
    tags.sort();
    tags.dedup();
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_normalized() {
        let sc = Shortcut::new(1, "proj", "/home/me/proj", Utc::now())
            .with_tags(vec!["work".into(), "code".into(), "work".into()]);
        assert_eq!(sc.tags, vec!["code", "work"]);
    }

    #[test]
    fn test_display_line() {
        let now = Utc::now();
        let bare = Shortcut::new(1, "dl", "/tmp/dl", now);
        assert_eq!(bare.display_line(), "dl -> /tmp/dl");

        let tagged = bare.with_tags(vec!["b".into(), "a".into()]);
        assert_eq!(tagged.to_string(), "dl -> /tmp/dl [a, b]");
    }
}
