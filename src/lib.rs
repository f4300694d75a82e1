//! # fs - Filesystem shortcut toolkit
//!
//! Bind short names to directories, tag them, search them and jump to them
//! from a shell.
//!
//! fs provides:
//! - A shortcut/tag entity model with many-to-many tag links
//! - A storage contract ([`ShortcutStore`]) with SQLite and in-memory engines
//! - Substring + tag-set search shared by both engines
//! - The command layer, interactive picker and shell-integration snippets

pub mod shortcut;
pub mod storage;
pub mod query;
pub mod paths;
pub mod shell;
pub mod commands;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use shortcut::{Shortcut, Tag, TagUsage};
pub use storage::{MemoryStore, ShortcutStore, SqliteStore};
pub use query::{SearchQuery, TagMatch};

/// Result type alias for fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("shortcut '{0}' not found")]
    NotFound(String),

    #[error("shortcut '{0}' already exists")]
    DuplicateName(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("selection cancelled")]
    SelectionCancelled,

    #[error("no shortcuts found")]
    NoMatches,

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::ReadOnly
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::PermissionDenied
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt,
            ) => Error::StorageUnavailable(err.to_string()),
            _ => Error::QueryFailed(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
