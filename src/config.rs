//! Store location and the optional `config.toml`
//!
//! Everything lives under `<config_root>/fs/`, where `config_root` is
//! `$XDG_CONFIG_HOME` when set, else the platform config directory.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::{paths, Error, Result};

/// Overrides the configuration root directory
pub const CONFIG_HOME_ENV: &str = "XDG_CONFIG_HOME";
/// Overrides the store file
pub const DATABASE_ENV: &str = "FS_DB";

const APP_DIR: &str = "fs";
const DATABASE_FILE: &str = "shortcuts.db";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FsConfig {
    /// Store file, `~` allowed
    pub database: Option<String>,
    /// Listing command for `peek`; the shortcut path is appended
    pub peek_command: Option<Vec<String>>,
}

impl FsConfig {
    pub fn peek_argv(&self) -> Vec<String> {
        match &self.peek_command {
            Some(argv) if !argv.is_empty() => argv.clone(),
            _ => vec!["ls".to_string(), "-lah".to_string()],
        }
    }
}

/// `$XDG_CONFIG_HOME` if set and non-empty, else the platform default
pub fn config_root() -> Result<PathBuf> {
    config_root_from(std::env::var_os(CONFIG_HOME_ENV))
}

fn config_root_from(override_dir: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| Error::Config("cannot determine the configuration directory".to_string()))
}

pub fn app_dir_in(root: &Path) -> PathBuf {
    root.join(APP_DIR)
}

pub fn default_database_path_in(root: &Path) -> PathBuf {
    app_dir_in(root).join(DATABASE_FILE)
}

pub fn default_config_path_in(root: &Path) -> PathBuf {
    app_dir_in(root).join(CONFIG_FILE)
}

pub fn load_config(path: &Path) -> Result<Option<FsConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)?;
    let config: FsConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Pick the store file: `--db` flag, then `$FS_DB`, then `database` from
/// the config file, then `<root>/fs/shortcuts.db`.
pub fn resolve_database_path(
    flag: Option<&Path>,
    env: Option<OsString>,
    config: &FsConfig,
    root: &Path,
) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = &config.database {
        return paths::expand_tilde(path);
    }
    Ok(default_database_path_in(root))
}
