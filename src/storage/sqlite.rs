//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};

use super::schema;
use super::ShortcutStore;
use crate::query::{SearchQuery, TagMatch};
use crate::shortcut::{Shortcut, Tag, TagUsage};
use crate::{Error, Result};

/// How long a writer waits for another process to release the database lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SHORTCUT_COLUMNS: &str = "s.id, s.name, s.path, s.created_at, s.updated_at";

/// SQLite-backed shortcut store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates it and its parent directory if missing)
    pub fn open(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "opening shortcut store");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::StorageUnavailable(format!(
                        "cannot create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::StorageUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::apply_pragmas(&conn, true)?;

        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        debug!("opening in-memory shortcut store");

        let conn = Connection::open_in_memory()?;
        Self::apply_pragmas(&conn, false)?;

        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn apply_pragmas(conn: &Connection, on_disk: bool) -> Result<()> {
        // Cascading link deletes depend on this.
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        if on_disk {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
        }
        Ok(())
    }

    /// Initialize the database schema; safe to run on every open
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Lookup ==========

    /// Resolve a shortcut name to its id. Every name-taking operation other
    /// than `get_shortcut` (which reads the whole row) goes through here, so
    /// an unknown name is always `NotFound`.
    fn shortcut_id(&self, name: &str) -> Result<i64> {
        self.conn
            .query_row("SELECT id FROM shortcuts WHERE name = ?1", [name], |row| row.get(0))
            .optional()?
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn tags_for_id(&self, shortcut_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT t.name
            FROM tags t
            JOIN shortcut_tags st ON t.id = st.tag_id
            WHERE st.shortcut_id = ?1
            ORDER BY t.name
            "#,
        )?;

        let tags = stmt
            .query_map([shortcut_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tags)
    }

    /// Run a shortcut query and attach each row's tags
    fn query_shortcuts(&self, sql: &str, args: &[String]) -> Result<Vec<Shortcut>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), row_to_shortcut)?
            .collect::<rusqlite::Result<Vec<Shortcut>>>()?;

        rows.into_iter()
            .map(|sc| {
                let tags = self.tags_for_id(sc.id)?;
                Ok(Shortcut { tags, ..sc })
            })
            .collect()
    }
}

impl ShortcutStore for SqliteStore {
    fn add_shortcut(&mut self, name: &str, path: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO shortcuts (name, path) VALUES (?1, ?2)",
                params![name, path],
            )
            .map_err(|e| unique_violation(e, name))?;
        debug!(shortcut = name, path, "added shortcut");
        Ok(())
    }

    fn get_shortcut(&self, name: &str) -> Result<Shortcut> {
        let sql = format!("SELECT {SHORTCUT_COLUMNS} FROM shortcuts s WHERE s.name = ?1");
        let sc = self
            .conn
            .query_row(&sql, [name], row_to_shortcut)
            .optional()?
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let tags = self.tags_for_id(sc.id)?;
        Ok(Shortcut { tags, ..sc })
    }

    fn list_shortcuts(&self) -> Result<Vec<Shortcut>> {
        let sql = format!("SELECT {SHORTCUT_COLUMNS} FROM shortcuts s ORDER BY s.name");
        self.query_shortcuts(&sql, &[])
    }

    fn delete_shortcut(&mut self, name: &str) -> Result<()> {
        let id = self.shortcut_id(name)?;
        self.conn.execute("DELETE FROM shortcuts WHERE id = ?1", [id])?;
        debug!(shortcut = name, "deleted shortcut");
        Ok(())
    }

    fn update_shortcut_path(&mut self, name: &str, new_path: &str) -> Result<()> {
        let id = self.shortcut_id(name)?;
        self.conn.execute(
            "UPDATE shortcuts SET path = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![new_path, id],
        )?;
        debug!(shortcut = name, new_path, "updated shortcut path");
        Ok(())
    }

    fn update_shortcut_name(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let id = self.shortcut_id(old_name)?;
        if old_name == new_name {
            return Ok(());
        }

        self.conn
            .execute(
                "UPDATE shortcuts SET name = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                params![new_name, id],
            )
            .map_err(|e| unique_violation(e, new_name))?;
        debug!(old_name, new_name, "renamed shortcut");
        Ok(())
    }

    fn add_tags(&mut self, name: &str, tags: &[String]) -> Result<()> {
        let shortcut_id = self.shortcut_id(name)?;

        // One transaction per tag: the tag row and its link land together,
        // but earlier tags survive a later failure.
        for tag in tags {
            let tx = self.conn.transaction()?;
            tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", [tag])?;
            let tag_id: i64 =
                tx.query_row("SELECT id FROM tags WHERE name = ?1", [tag], |row| row.get(0))?;
            tx.execute(
                "INSERT OR IGNORE INTO shortcut_tags (shortcut_id, tag_id) VALUES (?1, ?2)",
                params![shortcut_id, tag_id],
            )?;
            tx.commit()?;
            debug!(shortcut = name, tag = tag.as_str(), "linked tag");
        }
        Ok(())
    }

    fn remove_tags(&mut self, name: &str, tags: &[String]) -> Result<()> {
        let shortcut_id = self.shortcut_id(name)?;

        for tag in tags {
            let removed = self.conn.execute(
                r#"
                DELETE FROM shortcut_tags
                WHERE shortcut_id = ?1
                AND tag_id = (SELECT id FROM tags WHERE name = ?2)
                "#,
                params![shortcut_id, tag],
            )?;
            debug!(shortcut = name, tag = tag.as_str(), removed, "unlinked tag");
        }
        Ok(())
    }

    fn get_shortcut_tags(&self, name: &str) -> Result<Vec<String>> {
        let shortcut_id = self.shortcut_id(name)?;
        self.tags_for_id(shortcut_id)
    }

    fn search_shortcuts(&self, query: &SearchQuery) -> Result<Vec<Shortcut>> {
        let (sql, args) = search_sql(query);
        debug!(sql = sql.as_str(), "searching shortcuts");
        self.query_shortcuts(&sql, &args)
    }

    fn list_tags(&self) -> Result<Vec<TagUsage>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.id, t.name, COUNT(st.shortcut_id)
            FROM tags t
            LEFT JOIN shortcut_tags st ON st.tag_id = t.id
            GROUP BY t.id, t.name
            ORDER BY t.name
            "#,
        )?;

        let tags = stmt
            .query_map([], |row| {
                let count: i64 = row.get(2)?;
                Ok(TagUsage {
                    tag: Tag {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    },
                    shortcuts: count as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::from(e))
    }
}

/// Compile a search query to SQL plus positional arguments.
///
/// Tag filters become a sub-select on `shortcut_tags`, so a shortcut linked
/// to several filter tags still appears once.
fn search_sql(query: &SearchQuery) -> (String, Vec<String>) {
    let mut sql = format!("SELECT {SHORTCUT_COLUMNS} FROM shortcuts s");
    let mut conditions: Vec<String> = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if query.has_tags() {
        let tags = query.distinct_tags();
        let placeholders = vec!["?"; tags.len()].join(", ");
        let having = match query.mode {
            TagMatch::Any => String::new(),
            TagMatch::All => format!(
                " GROUP BY st.shortcut_id HAVING COUNT(DISTINCT st.tag_id) = {}",
                tags.len()
            ),
        };
        conditions.push(format!(
            "s.id IN (SELECT st.shortcut_id FROM shortcut_tags st \
             JOIN tags t ON t.id = st.tag_id \
             WHERE t.name IN ({placeholders}){having})"
        ));
        args.extend(tags.into_iter().map(str::to_string));
    }

    if query.has_text() {
        conditions.push(r"(s.name LIKE ? ESCAPE '\' OR s.path LIKE ? ESCAPE '\')".to_string());
        let pattern = query.like_pattern();
        args.push(pattern.clone());
        args.push(pattern);
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY s.name");

    (sql, args)
}

/// Map a uniqueness violation on `name` to `DuplicateName`
fn unique_violation(err: rusqlite::Error, name: &str) -> Error {
    if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        Error::DuplicateName(name.to_string())
    } else {
        err.into()
    }
}

/// Helper to convert a row to a Shortcut (tags are attached separately)
fn row_to_shortcut(row: &rusqlite::Row) -> rusqlite::Result<Shortcut> {
    Ok(Shortcut {
        id: row.get(0)?,
        name: row.get(1)?,
        path: row.get(2)?,
        tags: Vec::new(),
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let mut store = store();
        store.add_shortcut("x", "/tmp").unwrap();

        let sc = store.get_shortcut("x").unwrap();
        assert_eq!(sc.name, "x");
        assert_eq!(sc.path, "/tmp");
        assert!(sc.tags.is_empty());
        assert!(sc.id > 0);
    }

    #[test]
    fn test_duplicate_name_keeps_first_path() {
        let mut store = store();
        store.add_shortcut("n", "/p1").unwrap();

        let err = store.add_shortcut("n", "/p2").unwrap_err();
        assert!(matches!(err, Error::DuplicateName(ref n) if n == "n"));
        assert_eq!(store.get_shortcut("n").unwrap().path, "/p1");
        assert_eq!(store.list_shortcuts().unwrap().len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut store = store();
        store.add_shortcut("Proj", "/a").unwrap();
        store.add_shortcut("proj", "/b").unwrap();

        assert_eq!(store.get_shortcut("Proj").unwrap().path, "/a");
        assert!(matches!(store.get_shortcut("PROJ"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_list_sorted_with_tags() {
        let mut store = store();
        assert!(store.list_shortcuts().unwrap().is_empty());

        store.add_shortcut("zeta", "/z").unwrap();
        store.add_shortcut("alpha", "/a").unwrap();
        store.add_tags("zeta", &tags(&["b", "a"])).unwrap();

        let all = store.list_shortcuts().unwrap();
        let names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(all[1].tags, vec!["a", "b"]);
    }

    #[test]
    fn test_delete_cascades_links() {
        let mut store = store();
        store.add_shortcut("x", "/tmp").unwrap();
        store.add_tags("x", &tags(&["a", "b"])).unwrap();
        store.delete_shortcut("x").unwrap();

        store.add_shortcut("x", "/tmp2").unwrap();
        assert!(store.get_shortcut_tags("x").unwrap().is_empty());

        let links: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM shortcut_tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 0);

        // tags are never garbage-collected
        let usage = store.list_tags().unwrap();
        assert_eq!(usage.len(), 2);
        assert!(usage.iter().all(|u| u.shortcuts == 0));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let mut store = store();
        assert!(matches!(store.delete_shortcut("ghost"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_ids_not_reused() {
        let mut store = store();
        store.add_shortcut("a", "/a").unwrap();
        let first = store.get_shortcut("a").unwrap().id;
        store.delete_shortcut("a").unwrap();
        store.add_shortcut("a", "/a").unwrap();
        assert!(store.get_shortcut("a").unwrap().id > first);
    }

    #[test]
    fn test_tag_idempotence() {
        let mut store = store();
        store.add_shortcut("x", "/tmp").unwrap();
        store.add_tags("x", &tags(&["a"])).unwrap();
        store.add_tags("x", &tags(&["a"])).unwrap();
        assert_eq!(store.get_shortcut_tags("x").unwrap(), vec!["a"]);

        store.remove_tags("x", &tags(&["never-linked", "a"])).unwrap();
        assert!(store.get_shortcut_tags("x").unwrap().is_empty());
    }

    #[test]
    fn test_tag_ops_require_shortcut() {
        let mut store = store();
        assert!(matches!(store.add_tags("ghost", &tags(&["a"])), Err(Error::NotFound(_))));
        assert!(matches!(store.remove_tags("ghost", &tags(&["a"])), Err(Error::NotFound(_))));
        assert!(matches!(store.get_shortcut_tags("ghost"), Err(Error::NotFound(_))));
        assert!(store.list_tags().unwrap().is_empty());
    }

    #[test]
    fn test_tags_shared_across_shortcuts() {
        let mut store = store();
        store.add_shortcut("a", "/a").unwrap();
        store.add_shortcut("b", "/b").unwrap();
        store.add_tags("a", &tags(&["work"])).unwrap();
        store.add_tags("b", &tags(&["work", "home"])).unwrap();

        let usage = store.list_tags().unwrap();
        let summary: Vec<_> = usage.iter().map(|u| (u.tag.name.as_str(), u.shortcuts)).collect();
        assert_eq!(summary, vec![("home", 1), ("work", 2)]);
    }

    #[test]
    fn test_rename_preserves_path_and_tags() {
        let mut store = store();
        store.add_shortcut("a", "/p").unwrap();
        store.add_tags("a", &tags(&["t"])).unwrap();
        store.update_shortcut_name("a", "b").unwrap();

        assert_eq!(store.get_shortcut("b").unwrap().path, "/p");
        assert_eq!(store.get_shortcut_tags("b").unwrap(), vec!["t"]);
        assert!(matches!(store.get_shortcut("a"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_rename_errors() {
        let mut store = store();
        store.add_shortcut("a", "/a").unwrap();
        store.add_shortcut("b", "/b").unwrap();

        assert!(matches!(store.update_shortcut_name("ghost", "c"), Err(Error::NotFound(_))));
        assert!(matches!(
            store.update_shortcut_name("a", "b"),
            Err(Error::DuplicateName(ref n)) if n == "b"
        ));
        store.update_shortcut_name("a", "a").unwrap();
        assert_eq!(store.get_shortcut("a").unwrap().path, "/a");
    }

    #[test]
    fn test_update_path() {
        let mut store = store();
        store.add_shortcut("a", "/old").unwrap();
        store.add_tags("a", &tags(&["t"])).unwrap();
        store.update_shortcut_path("a", "/new").unwrap();

        let sc = store.get_shortcut("a").unwrap();
        assert_eq!(sc.path, "/new");
        assert_eq!(sc.tags, vec!["t"]);
        assert!(matches!(store.update_shortcut_path("ghost", "/x"), Err(Error::NotFound(_))));
    }

    fn backdate(store: &SqliteStore, name: &str) {
        store
            .conn
            .execute(
                "UPDATE shortcuts SET created_at = '2000-01-01 00:00:00', \
                 updated_at = '2000-01-01 00:00:00' WHERE name = ?1",
                [name],
            )
            .unwrap();
    }

    #[test]
    fn test_edits_refresh_updated_at() {
        let mut store = store();
        store.add_shortcut("a", "/old").unwrap();

        backdate(&store, "a");
        store.update_shortcut_path("a", "/new").unwrap();
        let sc = store.get_shortcut("a").unwrap();
        assert!(sc.updated_at > sc.created_at);

        backdate(&store, "a");
        store.update_shortcut_name("a", "b").unwrap();
        let sc = store.get_shortcut("b").unwrap();
        assert!(sc.updated_at > sc.created_at);
        assert_eq!(sc.created_at.format("%Y").to_string(), "2000");
    }

    fn search_fixture() -> SqliteStore {
        let mut store = store();
        store.add_shortcut("home", "/Users/me").unwrap();
        store.add_shortcut("docs", "/Users/me/Documents").unwrap();
        store.add_shortcut("proj", "/src/proj").unwrap();
        store.add_tags("home", &tags(&["home"])).unwrap();
        store.add_tags("docs", &tags(&["work", "home"])).unwrap();
        store.add_tags("proj", &tags(&["work"])).unwrap();
        store
    }

    fn names(results: &[Shortcut]) -> Vec<&str> {
        results.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_search_any_tag_is_union() {
        let store = search_fixture();
        let q = SearchQuery::all().with_tags(["work", "home"]);
        let results = store.search_shortcuts(&q).unwrap();
        // docs carries both tags but appears once
        assert_eq!(names(&results), vec!["docs", "home", "proj"]);
        assert_eq!(results[0].tags, vec!["home", "work"]);
    }

    #[test]
    fn test_search_all_tags_is_intersection() {
        let store = search_fixture();
        let q = SearchQuery::all()
            .with_tags(["work", "home", "work"])
            .with_mode(TagMatch::All);
        assert_eq!(names(&store.search_shortcuts(&q).unwrap()), vec!["docs"]);
    }

    #[test]
    fn test_search_text_case_insensitive() {
        let store = search_fixture();
        let results = store.search_shortcuts(&SearchQuery::new("OME")).unwrap();
        assert_eq!(names(&results), vec!["home"]);

        let results = store.search_shortcuts(&SearchQuery::new("users")).unwrap();
        assert_eq!(names(&results), vec!["docs", "home"]);
    }

    #[test]
    fn test_search_text_and_tags_combined() {
        let store = search_fixture();
        let q = SearchQuery::new("src").with_tags(["work"]);
        assert_eq!(names(&store.search_shortcuts(&q).unwrap()), vec!["proj"]);

        let q = SearchQuery::new("src").with_tags(["home"]);
        assert!(store.search_shortcuts(&q).unwrap().is_empty());
    }

    #[test]
    fn test_search_wildcards_are_literal() {
        let mut store = store();
        store.add_shortcut("a_b", "/x").unwrap();
        store.add_shortcut("axb", "/y").unwrap();
        let results = store.search_shortcuts(&SearchQuery::new("_")).unwrap();
        assert_eq!(names(&results), vec!["a_b"]);
        assert!(store.search_shortcuts(&SearchQuery::new("%")).unwrap().is_empty());
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let store = search_fixture();
        let results = store.search_shortcuts(&SearchQuery::all()).unwrap();
        assert_eq!(names(&results), vec!["docs", "home", "proj"]);
        assert_eq!(results[1].tags, vec!["home"]);
    }

    #[test]
    fn test_open_is_idempotent_and_persistent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("shortcuts.db");

        let mut store = SqliteStore::open(&db).unwrap();
        store.add_shortcut("x", "/tmp").unwrap();
        store.add_tags("x", &tags(&["a"])).unwrap();
        store.close().unwrap();

        let store = SqliteStore::open(&db).unwrap();
        let sc = store.get_shortcut("x").unwrap();
        assert_eq!(sc.path, "/tmp");
        assert_eq!(sc.tags, vec!["a"]);
    }

    #[test]
    fn test_two_handles_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("shortcuts.db");

        let mut first = SqliteStore::open(&db).unwrap();
        let mut second = SqliteStore::open(&db).unwrap();

        first.add_shortcut("a", "/a").unwrap();
        first.add_tags("a", &tags(&["work"])).unwrap();
        second.add_shortcut("b", "/b").unwrap();
        second.add_tags("b", &tags(&["work", "home"])).unwrap();
        second.add_tags("a", &tags(&["home"])).unwrap();

        for store in [&first, &second] {
            let all = store.list_shortcuts().unwrap();
            assert_eq!(names(&all), vec!["a", "b"]);
            assert_eq!(all[0].tags, vec!["home", "work"]);
            assert_eq!(all[1].tags, vec!["home", "work"]);

            let usage = store.list_tags().unwrap();
            let summary: Vec<_> = usage.iter().map(|u| (u.tag.name.as_str(), u.shortcuts)).collect();
            assert_eq!(summary, vec![("home", 2), ("work", 2)]);
        }

        assert!(matches!(
            second.add_shortcut("a", "/other"),
            Err(Error::DuplicateName(_))
        ));
        first.delete_shortcut("b").unwrap();
        assert!(matches!(second.get_shortcut("b"), Err(Error::NotFound(_))));

        let links: i64 = second
            .conn
            .query_row("SELECT COUNT(*) FROM shortcut_tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 2);

        let mode: String = first
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_open_unwritable_location_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let result = SqliteStore::open(&blocker.join("fs").join("shortcuts.db"));
        assert!(matches!(result, Err(Error::StorageUnavailable(_))));
    }
}
