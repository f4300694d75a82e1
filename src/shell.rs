//! Shell-integration snippets printed by `fs init`
//!
//! `f <name>` jumps straight to a shortcut; `ff [query] [-t tag]` searches,
//! lets the user pick, and jumps. Both rely on `fs` printing only the path
//! on stdout.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    /// Detect from a `$SHELL` value; anything unrecognised is treated as bash
    pub fn detect(shell_env: Option<&str>) -> Self {
        let shell = shell_env.unwrap_or_default();
        if shell.contains("zsh") {
            Shell::Zsh
        } else if shell.contains("fish") {
            Shell::Fish
        } else {
            Shell::Bash
        }
    }

    pub fn from_env() -> Self {
        Self::detect(std::env::var("SHELL").ok().as_deref())
    }

    /// Startup file, relative to the home directory
    pub fn rc_file(&self) -> &'static str {
        match self {
            Shell::Bash => ".bashrc",
            Shell::Zsh => ".zshrc",
            Shell::Fish => ".config/fish/config.fish",
        }
    }

    fn functions(&self) -> [(&'static str, &'static str); 2] {
        match self {
            Shell::Bash | Shell::Zsh => [
                ("Quick jump to shortcut", r#"f() { cd "$(fs go "$1")"; }"#),
                (
                    "Interactive find and jump",
                    r#"ff() { local p; p=$(fs find "$@" </dev/tty) && [ -n "$p" ] && cd "$p"; }"#,
                ),
            ],
            Shell::Fish => [
                ("Quick jump to shortcut", r#"function f; cd (fs go $argv[1]); end"#),
                (
                    "Interactive find and jump",
                    r#"function ff; set -l p (fs find $argv </dev/tty); and test -n "$p"; and cd $p; end"#,
                ),
            ],
        }
    }

    /// Full setup instructions for this shell
    pub fn snippet(&self) -> String {
        let rc = self.rc_file();
        let functions = self.functions();
        let mut out = String::new();

        let _ = writeln!(out, "Add these functions to your ~/{rc}:\n");
        for (comment, body) in &functions {
            let _ = writeln!(out, "# {comment}");
            let _ = writeln!(out, "{body}\n");
        }

        let _ = writeln!(out, "Or run these commands:");
        let _ = writeln!(out, "    echo '# enable fs interactive find and jump' >> ~/{rc}");
        for (_, body) in &functions {
            let _ = writeln!(out, "    echo '{body}' >> ~/{rc}");
        }

        let _ = writeln!(out, "\nThen reload your shell:");
        let _ = writeln!(out, "    source ~/{rc}");
        out
    }
}
