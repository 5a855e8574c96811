//! Terminal coloring for diagnostics. A thin wrapper over the `colored`
//! crate; terminal-capability detection (whether to color at all) is left
//! to `colored` itself, which already checks `NO_COLOR`/tty-ness.
//!
//! Grounded in `examples/original_source/filecheck/colors.py`'s `FMT`/`ERR`/
//! `WARN`, generalized with a "gray" helper for highlighting the holes of a
//! discontiguous `CHECK-DAG` region in diagnostics.

use colored::Colorize;

pub fn error_prefix() -> String {
    "error:".red().bold().to_string()
}

pub fn warn_prefix() -> String {
    "warning:".yellow().underline().to_string()
}

/// Dims text already claimed by an earlier `CHECK-DAG` match, so the
/// unmatched remainder of a discontiguous range stands out.
pub fn dim(text: &str) -> String {
    text.bright_black().to_string()
}

pub fn caret(col: usize) -> String {
    format!("{}{}", " ".repeat(col), "^".green().bold())
}
