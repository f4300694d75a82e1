//! Path resolution for user-supplied shortcut targets

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// The current user's home directory
pub fn home_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| Error::InvalidInput("cannot determine home directory".to_string()))
}

/// Replace a leading `~` with the home directory
pub fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return home_dir();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Expand `~`, make absolute against the working directory and drop
/// `.`/`..` components lexically. Symlinks are left alone.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    if raw.trim().is_empty() {
        return Err(Error::InvalidInput("path is empty".to_string()));
    }

    let path = expand_tilde(raw)?;
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize(&absolute))
}

/// Expand `raw` and require that it exists, returning it as a string
pub fn resolve_existing(raw: &str) -> Result<String> {
    let path = expand_path(raw)?;
    if !path.exists() {
        return Err(Error::InvalidInput(format!(
            "path does not exist: {}",
            path.display()
        )));
    }
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidInput(format!("path is not valid UTF-8: {}", path.display())))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
