//! Operator-facing console output: styled status lines, headers and the banner.

pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

const RULE: &str = "====================================================";

/// Console state for one invocation: stylesheet, TTY detection and quiet mode.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only on a TTY, without `--no-color` and without `NO_COLOR`.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Download progress bars are drawn only on an interactive, non-quiet run.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print `msg` behind a styled marker unless `quiet`.
    fn marked(&self, marker: &str, style: owo_colors::Style, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", marker.style(style));
        }
    }

    /// `✓ msg`
    pub fn success(&self, msg: &str) {
        self.marked("✓", self.styles.success, msg);
    }

    /// `⚠ msg`
    pub fn warn(&self, msg: &str) {
        self.marked("⚠", self.styles.warning, msg);
    }

    /// `ℹ msg`
    pub fn info(&self, msg: &str) {
        self.marked("ℹ", self.styles.info, msg);
    }

    /// `→ msg`, an in-progress step.
    pub fn step(&self, msg: &str) {
        self.marked("→", self.styles.step, msg);
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }

    /// Print the startup banner framed by rules. Suppressed when `quiet`.
    pub fn banner(&self, title: &str) {
        if !self.quiet {
            println!("{}", RULE.style(self.styles.dim));
            println!("  {}", title.style(self.styles.header));
            println!("{}", RULE.style(self.styles.dim));
        }
    }
}
