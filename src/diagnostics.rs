//! Renders the three failure kinds (`ParseError`, `CheckError`,
//! `ErrorOnMatch`) the way a person debugging a failing check file expects:
//! the offending check-line location, the current position in the input
//! under test, and — for a discontiguous `CHECK-DAG` region — which parts
//! of it are already spoken for.
//!
//! Grounded in `examples/original_source/filecheck/matcher.py`'s `run()`,
//! which does this formatting inline around the dispatch loop.

use crate::colors::{self, dim};
use crate::config::Options;
use crate::cursor::FileInput;
use crate::error::{CheckError, ErrorOnMatch, ParseError};

fn line_bounds(content: &str, pos: usize) -> (usize, usize) {
    let start = content[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = content[pos..].find('\n').map(|i| pos + i).unwrap_or(content.len());
    (start, end)
}

/// One source line with a caret under `pos`.
fn line_with_caret(content: &str, pos: usize) -> String {
    let (start, end) = line_bounds(content, pos);
    let line = &content[start..end];
    format!("{}\n{}", line, colors::caret(pos - start))
}

pub fn format_parse_error(opts: &Options, e: &ParseError) -> String {
    format!(
        "{}:{}:{} {} {}\n{}\n{}",
        opts.match_filename,
        e.line_no,
        e.column,
        colors::error_prefix(),
        e.message,
        e.offending_line.trim_end_matches('\n'),
        colors::caret(e.column),
    )
}

pub fn format_check_error(opts: &Options, file: &FileInput, e: &CheckError) -> String {
    let mut out = format!(
        "{}:{}: {} {}\nCurrent position at {}",
        opts.match_filename,
        e.op.source_line,
        colors::error_prefix(),
        e.message,
        line_with_caret(&file.content, file.range.start),
    );
    if file.is_discontiguous() {
        out.push_str("\n\nCurrently matching in range (already-matched parts are dimmed):\n");
        out.push_str(&current_range_display(file));
    }
    out
}

pub fn format_error_on_match(opts: &Options, file: &FileInput, e: &ErrorOnMatch) -> String {
    let mut out = format!(
        "{}:{}: {} {}\nMatching at: {}",
        opts.match_filename,
        e.op.source_line,
        colors::error_prefix(),
        e.message,
        line_with_caret(&file.content, e.match_start),
    );
    if file.is_discontiguous() {
        out.push_str("\n\nCurrently matching in range (already-matched parts are dimmed):\n");
        out.push_str(&current_range_display(file));
    }
    out
}

fn current_range_display(file: &FileInput) -> String {
    let mut out = String::new();
    let mut cursor = file.range.start;
    for (s, e) in file.range.ranges() {
        if s > cursor {
            out.push_str(&dim(&file.content[cursor..s]));
        }
        out.push_str(&file.content[s..e]);
        cursor = e;
    }
    if cursor < file.range.end {
        out.push_str(&dim(&file.content[cursor..file.range.end]));
    }
    out
}

pub fn format_possible_intended_match(content: &str, pos: usize) -> String {
    format!("Possible intended match at:\n{}", line_with_caret(content, pos))
}
