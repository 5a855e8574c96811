//! Structured error types for the three failure kinds spec.md names: a
//! malformed directive, a directive that couldn't match, and a `NOT`
//! directive whose excluded pattern was found.
//!
//! The teacher crate propagates plain `String`s; this crate needs typed
//! context (line/column, the offending op, a match span) to drive
//! diagnostics, so it reaches for `thiserror` instead, the way
//! `PatternError` does in the pattern-matcher reference file this is
//! grounded on.

use crate::ops::CheckOp;
use thiserror::Error;

/// A malformed directive: empty argument, `COUNT-0`, an unterminated
/// `[[...]]`/`{{...}}` block, or an unrecognized substitution form.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    /// 1-indexed line number in the check file.
    pub line_no: usize,
    /// 0-indexed column offset into the offending line.
    pub column: usize,
    pub offending_line: String,
}

/// A directive failed to match, or raised a semantic violation (undefined
/// variable, empty capture under reject mode, label not found, whole-line
/// mismatch).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CheckError {
    pub message: String,
    pub op: CheckOp,
}

impl CheckError {
    pub fn new(message: impl Into<String>, op: CheckOp) -> Self {
        CheckError {
            message: message.into(),
            op,
        }
    }
}

/// A `CHECK-NOT` pattern was found inside the region it was supposed to be
/// absent from.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ErrorOnMatch {
    pub message: String,
    pub op: CheckOp,
    pub match_start: usize,
    pub match_end: usize,
}

/// Any of the three failure kinds, as returned by the top-level matching run.
#[derive(Debug, Error)]
pub enum FileCheckError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Check(#[from] CheckError),
    #[error(transparent)]
    Negative(#[from] ErrorOnMatch),
}

/// Raised by the regex translator for a POSIX class name it recognizes
/// syntactically but has no replacement for.
#[derive(Debug, Error)]
#[error("unknown POSIX character class: [:{0}:]")]
pub struct UnknownPosixClass(pub String);
