//! In-memory storage implementation
//!
//! Satisfies the same [`ShortcutStore`] contract as the SQLite engine with
//! ordered maps instead of tables. Used to exercise the command layer
//! without touching disk.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::ShortcutStore;
use crate::query::SearchQuery;
use crate::shortcut::{Shortcut, Tag, TagUsage};
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct ShortcutRow {
    id: i64,
    path: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Map-backed shortcut store
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Keyed by name, so iteration is already name-ordered
    shortcuts: BTreeMap<String, ShortcutRow>,
    tags: BTreeMap<String, i64>,
    /// (shortcut_id, tag_id)
    links: BTreeSet<(i64, i64)>,
    last_shortcut_id: i64,
    last_tag_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn row(&self, name: &str) -> Result<&ShortcutRow> {
        self.shortcuts
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn row_mut(&mut self, name: &str) -> Result<&mut ShortcutRow> {
        self.shortcuts
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn tags_for_id(&self, shortcut_id: i64) -> Vec<String> {
        self.tags
            .iter()
            .filter(|(_, tag_id)| self.links.contains(&(shortcut_id, **tag_id)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn to_shortcut(&self, name: &str, row: &ShortcutRow) -> Shortcut {
        Shortcut {
            id: row.id,
            name: name.to_string(),
            path: row.path.clone(),
            tags: self.tags_for_id(row.id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn tag_id_or_insert(&mut self, tag: &str) -> i64 {
        if let Some(id) = self.tags.get(tag) {
            return *id;
        }
        self.last_tag_id += 1;
        self.tags.insert(tag.to_string(), self.last_tag_id);
        self.last_tag_id
    }
}

impl ShortcutStore for MemoryStore {
    fn add_shortcut(&mut self, name: &str, path: &str) -> Result<()> {
        if self.shortcuts.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        self.last_shortcut_id += 1;
        let now = Utc::now();
        self.shortcuts.insert(
            name.to_string(),
            ShortcutRow {
                id: self.last_shortcut_id,
                path: path.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    fn get_shortcut(&self, name: &str) -> Result<Shortcut> {
        let row = self.row(name)?;
        Ok(self.to_shortcut(name, row))
    }

    fn list_shortcuts(&self) -> Result<Vec<Shortcut>> {
        Ok(self
            .shortcuts
            .iter()
            .map(|(name, row)| self.to_shortcut(name, row))
            .collect())
    }

    fn delete_shortcut(&mut self, name: &str) -> Result<()> {
        let id = self.row(name)?.id;
        self.shortcuts.remove(name);
        self.links.retain(|(shortcut_id, _)| *shortcut_id != id);
        Ok(())
    }

    fn update_shortcut_path(&mut self, name: &str, new_path: &str) -> Result<()> {
        let row = self.row_mut(name)?;
        row.path = new_path.to_string();
        row.updated_at = Utc::now();
        Ok(())
    }

    fn update_shortcut_name(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        self.row(old_name)?;
        if old_name == new_name {
            return Ok(());
        }
        if self.shortcuts.contains_key(new_name) {
            return Err(Error::DuplicateName(new_name.to_string()));
        }

        if let Some(mut row) = self.shortcuts.remove(old_name) {
            row.updated_at = Utc::now();
            self.shortcuts.insert(new_name.to_string(), row);
        }
        Ok(())
    }

    fn add_tags(&mut self, name: &str, tags: &[String]) -> Result<()> {
        let shortcut_id = self.row(name)?.id;
        for tag in tags {
            let tag_id = self.tag_id_or_insert(tag);
            self.links.insert((shortcut_id, tag_id));
        }
        Ok(())
    }

    fn remove_tags(&mut self, name: &str, tags: &[String]) -> Result<()> {
        let shortcut_id = self.row(name)?.id;
        for tag in tags {
            if let Some(tag_id) = self.tags.get(tag) {
                self.links.remove(&(shortcut_id, *tag_id));
            }
        }
        Ok(())
    }

    fn get_shortcut_tags(&self, name: &str) -> Result<Vec<String>> {
        let row = self.row(name)?;
        Ok(self.tags_for_id(row.id))
    }

    fn search_shortcuts(&self, query: &SearchQuery) -> Result<Vec<Shortcut>> {
        Ok(self
            .list_shortcuts()?
            .into_iter()
            .filter(|sc| query.matches(sc))
            .collect())
    }

    fn list_tags(&self) -> Result<Vec<TagUsage>> {
        Ok(self
            .tags
            .iter()
            .map(|(name, id)| TagUsage {
                tag: Tag {
                    id: *id,
                    name: name.clone(),
                },
                shortcuts: self.links.iter().filter(|(_, tag_id)| tag_id == id).count(),
            })
            .collect())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
