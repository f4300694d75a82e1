//! fs CLI - Filesystem shortcut toolkit

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fs_shortcuts::config::{self, FsConfig};
use fs_shortcuts::output::OutputMode;
use fs_shortcuts::shell::Shell;
use fs_shortcuts::storage::{ShortcutStore, SqliteStore};
use fs_shortcuts::{commands, ui, SearchQuery, TagMatch};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "fs")]
#[command(version)]
#[command(about = "Filesystem shortcut toolkit")]
#[command(long_about = r#"
A CLI tool for managing filesystem shortcuts, tags, and quick navigation.

Example usage:
  fs add ~/code/project proj
  fs tag proj work rust
  fs find -t work
  fs init
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file (defaults to $XDG_CONFIG_HOME/fs/shortcuts.db)
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show setup instructions for shell integration
    Init,

    /// Add a new shortcut
    Add {
        /// Directory the shortcut points to (~ and relative paths allowed)
        path: String,
        /// Name of the shortcut
        name: String,
    },

    /// List all shortcuts
    List,

    /// Delete a shortcut
    #[command(visible_aliases = ["remove", "rm"])]
    Delete {
        name: String,
    },

    /// Get path for a shortcut
    Go {
        name: String,
    },

    /// Preview the contents of a shortcut location
    #[command(visible_alias = "ls")]
    Peek {
        name: String,
    },

    /// Add tags to a shortcut
    Tag {
        name: String,
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Remove tags from a shortcut
    Untag {
        name: String,
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Interactively search and select shortcuts
    #[command(visible_alias = "search")]
    Find {
        /// Case-insensitive text matched against names and paths
        query: Option<String>,

        /// Filter by tag (repeatable or comma-separated)
        #[arg(short = 't', long = "tag", value_name = "TAG", value_delimiter = ',')]
        tags: Vec<String>,

        /// Require every --tag instead of any of them
        #[arg(long)]
        all_tags: bool,
    },

    /// Change the path of a shortcut
    EditPath {
        name: String,
        new_path: String,
    },

    /// Rename a shortcut
    EditName {
        old_name: String,
        new_name: String,
    },

    /// List all tags and how many shortcuts use them
    Tags,

    /// Show everything stored for a shortcut
    Show {
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr: stdout carries paths for the shell functions.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("Error: {err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mode = OutputMode::from_json_flag(cli.json);

    if let Commands::Init = cli.command {
        return commands::run_init(Shell::from_env());
    }

    let root = config::config_root()?;
    let settings = config::load_config(&config::default_config_path_in(&root))?.unwrap_or_default();
    let db_path = config::resolve_database_path(
        cli.db.as_deref(),
        std::env::var_os(config::DATABASE_ENV),
        &settings,
        &root,
    )?;

    let mut store = SqliteStore::open(&db_path)?;
    let result = dispatch(cli.command, &mut store, mode, &settings);
    let closed = store.close();

    result?;
    closed?;
    Ok(())
}

fn dispatch(
    command: Commands,
    store: &mut dyn ShortcutStore,
    mode: OutputMode,
    settings: &FsConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Init => commands::run_init(Shell::from_env()),
        Commands::Add { path, name } => commands::run_add(store, &path, &name, mode),
        Commands::List => commands::run_list(store, mode),
        Commands::Delete { name } => commands::run_delete(store, &name, mode),
        Commands::Go { name } => commands::run_go(store, &name, mode),
        Commands::Peek { name } => commands::run_peek(store, &name, &settings.peek_argv()),
        Commands::Tag { name, tags } => commands::run_tag(store, &name, &tags, mode),
        Commands::Untag { name, tags } => commands::run_untag(store, &name, &tags, mode),
        Commands::Find { query, tags, all_tags } => {
            let tag_match = if all_tags { TagMatch::All } else { TagMatch::Any };
            let search = SearchQuery::new(query.unwrap_or_default())
                .with_tags(tags)
                .with_mode(tag_match);
            commands::run_find(store, &search, mode, ui::pick)
        }
        Commands::EditPath { name, new_path } => commands::run_edit_path(store, &name, &new_path, mode),
        Commands::EditName { old_name, new_name } => {
            commands::run_edit_name(store, &old_name, &new_name, mode)
        }
        Commands::Tags => commands::run_tags(store, mode),
        Commands::Show { name } => commands::run_show(store, &name, mode),
    }
}
