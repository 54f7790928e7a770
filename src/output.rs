//! Terminal output formatting for the converter.
//!
//! Provides Cargo-style status output with right-aligned coloured verbs, plus
//! a single overwritten progress line for the per-file walk.
//! All status output goes to stderr.

use std::cell::Cell;
use std::io::{self, IsTerminal, Write};

/// ANSI escape codes.
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Width for right-aligned verb column.
const VERB_WIDTH: usize = 12;

/// Terminal-aware status printer.
///
/// Prints Cargo-style status lines to stderr with optional ANSI colours.
/// Colour is enabled when stderr is a terminal.
pub struct Printer {
    color: bool,
    quiet: bool,
    /// Width of the progress line currently on screen, 0 if none.
    progress_width: Cell<usize>,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
            quiet: false,
            progress_width: Cell::new(0),
        }
    }

    /// A printer that discards everything. Used by library callers and benches.
    pub fn quiet() -> Self {
        Self {
            color: false,
            quiet: true,
            progress_width: Cell::new(0),
        }
    }

    /// Print a status line with a green bold verb.
    /// e.g. "  Processing diabdat.mpq"
    pub fn status(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    /// Print a warning line with a yellow bold verb.
    pub fn warning(&self, verb: &str, message: &str) {
        self.print_line(YELLOW, verb, message);
    }

    /// Print an error line with a red bold verb.
    pub fn error(&self, verb: &str, message: &str) {
        self.print_line(RED, verb, message);
    }

    /// Replace the progress line with `[i/n] status`.
    pub fn progress(&self, i: usize, n: usize, status: &str) {
        if self.quiet {
            return;
        }
        let counter = format!("[{}/{}]", i, n);
        let width = counter.len() + 1 + status.len();
        let counter = self.dim(&counter);
        let previous = self.progress_width.replace(width);

        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r{:previous$}\r{counter} {status}", "");
        let _ = stderr.flush();
    }

    /// End the progress line so later output starts on a fresh line.
    pub fn finish_progress(&self) {
        if self.progress_width.replace(0) > 0 {
            let _ = writeln!(io::stderr().lock());
        }
    }

    /// Format a string as dim/grey.
    pub fn dim(&self, text: &str) -> String {
        if self.color {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Format a string as cyan (for paths, info).
    pub fn cyan(&self, text: &str) -> String {
        if self.color {
            format!("{CYAN}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn print_line(&self, color: &str, verb: &str, message: &str) {
        if self.quiet {
            return;
        }
        self.finish_progress();
        let mut stderr = io::stderr().lock();
        if self.color {
            let _ = writeln!(
                stderr,
                "{BOLD}{color}{verb:>VERB_WIDTH$}{RESET} {message}"
            );
        } else {
            let _ = writeln!(stderr, "{verb:>VERB_WIDTH$} {message}");
        }
    }
}

/// Pluralize a count: `plural(1, "file", "files")` → "1 file".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

/// Return a relative display path when possible, absolute otherwise.
pub fn display_path(path: &std::path::Path) -> String {
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = path.strip_prefix(&cwd) {
            let s = relative.display().to_string();
            if s.is_empty() {
                return ".".to_string();
            }
            return s;
        }
    }
    path.display().to_string()
}
