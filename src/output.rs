//! Terminal output formatting for the spriterig CLI.
//!
//! Provides Cargo-style status output with right-aligned coloured verbs.
//! All status output goes to stderr; stdout is reserved for machine-readable output.

use std::io::{self, IsTerminal, Write};

use crate::job::{JobProgressState, JobStatus, ProgressSink, ReportBlock};

/// ANSI escape codes.
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Move the cursor up `n` lines and clear to the end of the screen.
fn erase_lines(n: usize) -> String {
    format!("\x1b[{}A\x1b[J", n)
}

/// Width for right-aligned verb column.
const VERB_WIDTH: usize = 12;

/// Terminal-aware status printer.
///
/// Prints Cargo-style status lines to stderr with optional ANSI colours.
/// Colour is enabled when stderr is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Printer {
    /// Create a printer, enabling colour only on a terminal.
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// A printer that never emits escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Print a status line with a green bold verb.
    /// e.g. "   Rendering knight (15 frames)"
    pub fn status(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    /// Print a success/completion line with a green bold verb.
    pub fn success(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    /// Print an informational line with a cyan bold verb.
    pub fn info(&self, verb: &str, message: &str) {
        self.print_line(CYAN, verb, message);
    }

    /// Print a warning line with a yellow bold verb.
    pub fn warning(&self, verb: &str, message: &str) {
        self.print_line(YELLOW, verb, message);
    }

    /// Print an error line with a red bold verb.
    pub fn error(&self, verb: &str, message: &str) {
        self.print_line(RED, verb, message);
    }

    /// Format a string as dim/grey.
    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    /// Format a string as bold.
    pub fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    /// Format a string as cyan (for paths, info).
    pub fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    /// Format a diagnostic severity label with colour.
    pub fn severity(&self, label: &str, is_error: bool) -> String {
        let color = if is_error { RED } else { YELLOW };
        if self.color {
            format!("{BOLD}{color}{label}{RESET}")
        } else {
            label.to_string()
        }
    }

    /// Format a job report line, coloured by its status.
    pub fn report_line(&self, status: JobStatus, line: &str) -> String {
        let color = match status {
            JobStatus::Active => DIM,
            JobStatus::Complete => GREEN,
            JobStatus::Skipped => YELLOW,
            JobStatus::Error => RED,
        };
        self.paint(color, line)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn print_line(&self, color: &str, verb: &str, message: &str) {
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

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

/// Job progress on stderr.
///
/// Persisted report lines are printed as they arrive. On a terminal the
/// active line and progress block are redrawn in place below them.
pub struct TerminalProgress {
    printer: Printer,
    live: bool,
    drawn: usize,
}

impl TerminalProgress {
    /// Progress sink drawing through `printer`.
    pub fn new(printer: Printer) -> Self {
        Self {
            printer,
            live: io::stderr().is_terminal(),
            drawn: 0,
        }
    }

    /// Render one update. Split out so it can be checked without a terminal.
    fn render(&mut self, block: &ReportBlock) -> String {
        let mut out = String::new();
        if self.drawn > 0 {
            out.push_str(&erase_lines(self.drawn));
            self.drawn = 0;
        }

        if block.status.is_persisted() {
            out.push_str(&self.printer.report_line(block.status, &block.line));
            out.push('\n');
        }

        if self.live {
            let mut transient = String::new();
            if !block.status.is_persisted() {
                transient.push_str(&block.line);
                transient.push('\n');
            }
            transient.push_str(&block.progress);
            transient.push('\n');
            self.drawn = transient.lines().count();
            out.push_str(&self.printer.dim(&transient));
        }
        out
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&mut self, block: &ReportBlock, _state: &JobProgressState) {
        let text = self.render(block);
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(text.as_bytes());
        let _ = stderr.flush();
    }
}

/// Pluralize a count: `plural(1, "frame", "frames")` → "1 frame".
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

#[cfg(test)]
mod tests {
    use super::*;

    fn block(status: JobStatus, line: &str) -> ReportBlock {
        ReportBlock {
            status,
            line: line.to_string(),
            progress: "[---] 0/1 frames (0%)\nElapsed: 0.0s | Remaining: calculating"
                .to_string(),
        }
    }

    #[test]
    fn test_plural_singular() {
        assert_eq!(plural(1, "frame", "frames"), "1 frame");
    }

    #[test]
    fn test_plural_zero() {
        assert_eq!(plural(0, "frame", "frames"), "0 frames");
    }

    #[test]
    fn test_plural_many() {
        assert_eq!(plural(5, "spritesheet", "spritesheets"), "5 spritesheets");
    }

    #[test]
    fn test_display_path_absolute() {
        use std::path::Path;
        // An absolute path outside cwd should stay absolute
        let p = Path::new("/nonexistent/path/to/file");
        assert_eq!(display_path(p), "/nonexistent/path/to/file");
    }

    #[test]
    fn test_piped_progress_prints_only_persisted_lines() {
        let mut progress = TerminalProgress {
            printer: Printer::plain(),
            live: false,
            drawn: 0,
        };
        assert_eq!(progress.render(&block(JobStatus::Active, "frame 1")), "");
        assert_eq!(
            progress.render(&block(JobStatus::Complete, "sheet done")),
            "sheet done\n"
        );
    }

    #[test]
    fn test_live_progress_redraws_transient_block() {
        let mut progress = TerminalProgress {
            printer: Printer::plain(),
            live: true,
            drawn: 0,
        };

        let first = progress.render(&block(JobStatus::Active, "frame 1"));
        assert!(first.starts_with("frame 1\n[---]"));
        assert_eq!(progress.drawn, 3);

        let second = progress.render(&block(JobStatus::Complete, "sheet done"));
        assert!(second.starts_with(&erase_lines(3)));
        assert!(second.contains("sheet done\n[---]"));
        assert_eq!(progress.drawn, 2);
    }
}
