use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();
static STDERR_THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub info: Style,
    pub dim: Style,
    pub muted: Style,
    /// Highlighted row in the picker
    pub selected: Style,
}

impl Theme {
    /// Colored when `term` is a terminal and `NO_COLOR` is unset
    pub fn detect(term: &console::Term) -> Self {
        if !term.is_term() || std::env::var_os("NO_COLOR").is_some() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
            selected: Style::new().cyan().bold(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            muted: Style::new(),
            selected: Style::new(),
        }
    }
}

/// Theme for text written to stdout
pub fn theme() -> &'static Theme {
    THEME.get_or_init(|| Theme::detect(&console::Term::stdout()))
}

/// Theme for diagnostics and the picker, which write to stderr
pub fn stderr_theme() -> &'static Theme {
    STDERR_THEME.get_or_init(|| Theme::detect(&console::Term::stderr()))
}
