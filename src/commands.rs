//! Command layer - one function per subcommand
//!
//! Each command validates its input, calls the store and reports the
//! outcome. Paths meant for a shell function (`go`, `find`) are the only
//! thing written to stdout for those commands.

use anyhow::Context;
use serde_json::json;
use tracing::debug;

use crate::output::{emit_success, OutputMode};
use crate::query::SearchQuery;
use crate::shell::Shell;
use crate::shortcut::Shortcut;
use crate::storage::ShortcutStore;
use crate::ui::{self, Icons};
use crate::{paths, Error, Result};

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("shortcut name is empty".to_string()));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<()> {
    if tags.is_empty() {
        return Err(Error::InvalidInput("at least one tag is required".to_string()));
    }
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err(Error::InvalidInput("tag names cannot be empty".to_string()));
    }
    Ok(())
}

pub fn run_add(
    store: &mut dyn ShortcutStore,
    path: &str,
    name: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    validate_name(name)?;
    let abs_path = paths::resolve_existing(path)?;
    store.add_shortcut(name, &abs_path)?;

    if mode.is_human() {
        ui::success(&format!("Added shortcut: {} -> {}", name, abs_path));
    } else {
        emit_success(mode, "add", store.get_shortcut(name)?)?;
    }
    Ok(())
}

pub fn run_list(store: &dyn ShortcutStore, mode: OutputMode) -> anyhow::Result<()> {
    let shortcuts = store.list_shortcuts()?;

    if !mode.is_human() {
        return emit_success(mode, "list", &shortcuts);
    }
    if shortcuts.is_empty() {
        println!("No shortcuts found. Add one with: fs add <path> <name>");
        return Ok(());
    }
    ui::header("Shortcuts:");
    println!("{}", ui::shortcut_table(&shortcuts));
    Ok(())
}

pub fn run_delete(store: &mut dyn ShortcutStore, name: &str, mode: OutputMode) -> anyhow::Result<()> {
    store.delete_shortcut(name)?;

    if mode.is_human() {
        println!("{} Deleted shortcut: {}", Icons::DEL, name);
    } else {
        emit_success(mode, "delete", json!({ "name": name }))?;
    }
    Ok(())
}

/// Resolve a shortcut to its path; `f()` in the shell `cd`s into the output
pub fn run_go(store: &dyn ShortcutStore, name: &str, mode: OutputMode) -> anyhow::Result<()> {
    let shortcut = store.get_shortcut(name)?;
    if mode.is_human() {
        println!("{}", shortcut.path);
    } else {
        emit_success(mode, "go", json!({ "name": shortcut.name, "path": shortcut.path }))?;
    }
    Ok(())
}

/// List the shortcut's directory with an external command (`ls -lah` by default)
pub fn run_peek(store: &dyn ShortcutStore, name: &str, argv: &[String]) -> anyhow::Result<()> {
    let shortcut = store.get_shortcut(name)?;
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::Config("peek_command is empty".to_string()))?;

    println!("Contents of {} ({}):\n", name, shortcut.path);
    debug!(program = program.as_str(), path = shortcut.path.as_str(), "running listing command");

    let status = std::process::Command::new(program)
        .args(args)
        .arg(&shortcut.path)
        .status()
        .with_context(|| format!("failed to run {}", program))?;

    if !status.success() {
        anyhow::bail!("{} exited with {}", program, status);
    }
    Ok(())
}

pub fn run_tag(
    store: &mut dyn ShortcutStore,
    name: &str,
    tags: &[String],
    mode: OutputMode,
) -> anyhow::Result<()> {
    validate_tags(tags)?;
    store.add_tags(name, tags)?;

    if mode.is_human() {
        println!("{} Added tags to {}: {}", Icons::TAG, name, tags.join(", "));
    } else {
        emit_success(mode, "tag", json!({ "name": name, "tags": store.get_shortcut_tags(name)? }))?;
    }
    Ok(())
}

pub fn run_untag(
    store: &mut dyn ShortcutStore,
    name: &str,
    tags: &[String],
    mode: OutputMode,
) -> anyhow::Result<()> {
    validate_tags(tags)?;
    store.remove_tags(name, tags)?;

    if mode.is_human() {
        println!("{} Removed tags from {}: {}", Icons::TAG, name, tags.join(", "));
    } else {
        emit_success(mode, "untag", json!({ "name": name, "tags": store.get_shortcut_tags(name)? }))?;
    }
    Ok(())
}

/// Narrow search results down to one shortcut.
///
/// Zero matches is `NoMatches`; one match is returned as-is; otherwise
/// `choose` decides (the interactive picker, in the binary).
pub fn select_match<'a, F>(matches: &'a [Shortcut], choose: F) -> Result<&'a Shortcut>
where
    F: FnOnce(&'a [Shortcut]) -> Result<&'a Shortcut>,
{
    match matches {
        [] => Err(Error::NoMatches),
        [only] => Ok(only),
        many => choose(many),
    }
}

pub fn run_find<F>(
    store: &dyn ShortcutStore,
    query: &SearchQuery,
    mode: OutputMode,
    choose: F,
) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(&'a [Shortcut]) -> Result<&'a Shortcut>,
{
    let matches = store.search_shortcuts(query)?;
    debug!(query = query.text.as_str(), tags = ?query.tags, mode = ?query.mode, found = matches.len(), "search finished");

    if !mode.is_human() {
        if matches.is_empty() {
            return Err(Error::NoMatches.into());
        }
        return emit_success(mode, "find", &matches);
    }

    let chosen = select_match(&matches, choose)?;
    println!("{}", chosen.path);
    Ok(())
}

pub fn run_edit_path(
    store: &mut dyn ShortcutStore,
    name: &str,
    new_path: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let abs_path = paths::resolve_existing(new_path)?;
    store.update_shortcut_path(name, &abs_path)?;

    if mode.is_human() {
        ui::success(&format!("Updated path: {} -> {}", name, abs_path));
    } else {
        emit_success(mode, "edit-path", store.get_shortcut(name)?)?;
    }
    Ok(())
}

pub fn run_edit_name(
    store: &mut dyn ShortcutStore,
    old_name: &str,
    new_name: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    validate_name(new_name)?;
    store.update_shortcut_name(old_name, new_name)?;

    if mode.is_human() {
        ui::success(&format!("Renamed shortcut: {} -> {}", old_name, new_name));
    } else {
        emit_success(mode, "edit-name", store.get_shortcut(new_name)?)?;
    }
    Ok(())
}

pub fn run_tags(store: &dyn ShortcutStore, mode: OutputMode) -> anyhow::Result<()> {
    let tags = store.list_tags()?;

    if !mode.is_human() {
        return emit_success(mode, "tags", &tags);
    }
    if tags.is_empty() {
        println!("No tags yet. Add some with: fs tag <name> <tags...>");
        return Ok(());
    }
    println!("{}", ui::tag_table(&tags));
    Ok(())
}

pub fn run_show(store: &dyn ShortcutStore, name: &str, mode: OutputMode) -> anyhow::Result<()> {
    let shortcut = store.get_shortcut(name)?;

    if !mode.is_human() {
        return emit_success(mode, "show", &shortcut);
    }
    ui::header(&shortcut.name);
    ui::info("id", &shortcut.id.to_string());
    ui::info("path", &shortcut.path);
    let tags = if shortcut.tags.is_empty() {
        ui::muted("(none)")
    } else {
        shortcut.tags.join(", ")
    };
    ui::info("tags", &tags);
    ui::info("created", &shortcut.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    ui::info("updated", &shortcut.updated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    Ok(())
}

/// Print shell-integration setup; never touches the store
pub fn run_init(shell: Shell) -> anyhow::Result<()> {
    print!("{}", shell.snippet());
    Ok(())
}
