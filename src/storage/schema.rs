//! Database schema definitions

/// SQL to create the shortcuts table
pub const CREATE_SHORTCUTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS shortcuts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    path TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the tags table
pub const CREATE_TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL
)
"#;

/// SQL to create the shortcut_tags link table
/// Links disappear with their shortcut; tags outlive their last link
pub const CREATE_SHORTCUT_TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS shortcut_tags (
    shortcut_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    FOREIGN KEY (shortcut_id) REFERENCES shortcuts(id) ON DELETE CASCADE,
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (shortcut_id, tag_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_shortcut_tags_tag ON shortcut_tags(tag_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_SHORTCUTS_TABLE,
        CREATE_TAGS_TABLE,
        CREATE_SHORTCUT_TAGS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
