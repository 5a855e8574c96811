//! The micro-op model: the atomic pieces a directive argument lowers into,
//! and the directive (`CheckOp`) that groups them.
//!
//! Kept as a tagged sum rather than a class hierarchy, so the compiler
//! (`crate::compiler`) can dispatch over it with a single flat `match`.

use std::fmt;

/// One atomic unit lowered from a directive's argument text.
#[derive(Debug, Clone, PartialEq)]
pub enum UOp {
    /// Match `text` verbatim (whitespace-collapsing unless strict-whitespace).
    Literal(String),
    /// Inline regex fragment, already translated to the target dialect.
    Regex(String),
    /// Named capture: match `pattern`, store the result under `name` via `mapper`.
    Capture {
        name: String,
        pattern: String,
        mapper: ValueMapper,
    },
    /// Substitute the current value of variable `name` as an escaped literal
    /// (or a backreference, if `name` was captured earlier on the same line).
    Subst(String),
    /// Numeric substitution with a derived expression. Only the trivial
    /// (empty) expression is supported; anything else fails at compile time.
    NumSubst { name: String, expr: String },
    /// `@LINE ± k`, rendered as the decimal `source_line + offset`.
    PseudoVar(i64),
}

/// Converts a matched capture string into a stored variable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMapper {
    Str,
    UnsignedInt,
    SignedInt,
    Hex,
}

/// A value held in the variable environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
}

impl ValueMapper {
    /// Apply this mapper to a matched substring.
    pub fn map(self, text: &str) -> Value {
        match self {
            ValueMapper::Str => Value::Str(text.to_string()),
            ValueMapper::UnsignedInt => Value::Int(text.parse::<i64>().unwrap_or(0)),
            ValueMapper::SignedInt => Value::Int(text.parse::<i64>().unwrap_or(0)),
            ValueMapper::Hex => Value::Int(i64::from_str_radix(text, 16).unwrap_or(0)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
        }
    }
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Str(s) if s.is_empty())
    }
}

/// The kind of directive, i.e. which suffix (if any) followed the check prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckKind {
    Check,
    Next,
    Same,
    Dag,
    Not,
    Empty,
    Label,
    /// `COUNT-N`, N >= 1.
    Count(u32),
    /// Synthetic marker used only for the final post-check flush; never
    /// produced by the parser.
    Nop,
}

impl CheckKind {
    /// The name used in diagnostics and in the check-line suffix.
    pub fn name(&self) -> String {
        match self {
            CheckKind::Check => "CHECK".to_string(),
            CheckKind::Next => "NEXT".to_string(),
            CheckKind::Same => "SAME".to_string(),
            CheckKind::Dag => "DAG".to_string(),
            CheckKind::Not => "NOT".to_string(),
            CheckKind::Empty => "EMPTY".to_string(),
            CheckKind::Label => "LABEL".to_string(),
            CheckKind::Count(n) => format!("COUNT-{n}"),
            CheckKind::Nop => "NOP".to_string(),
        }
    }
}

/// A single parsed directive, e.g. one `CHECK-NEXT:` line.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOp {
    /// The check-prefix that was recognized, e.g. "CHECK".
    pub prefix: String,
    pub kind: CheckKind,
    /// Raw argument text, kept for diagnostics.
    pub arg: String,
    /// 1-indexed line number in the check file.
    pub source_line: usize,
    pub uops: Vec<UOp>,
    /// Whether `{LITERAL}` was present, bypassing micro-op substitution syntax.
    pub is_literal: bool,
}

impl CheckOp {
    pub fn check_line_repr(&self) -> String {
        let suffix = if self.is_literal { "{LITERAL}" } else { "" };
        match self.kind {
            CheckKind::Check => format!("{}{}: {}", self.prefix, suffix, self.arg),
            _ => format!(
                "{}-{}{}: {}",
                self.prefix,
                self.kind.name(),
                suffix,
                self.arg
            ),
        }
    }

    /// Build a synthetic op used for the final post-check flush, which has
    /// no real source line and doesn't correspond to any directive kind.
    pub fn synthetic_tail() -> CheckOp {
        CheckOp {
            prefix: "SYNTH".to_string(),
            kind: CheckKind::Nop,
            arg: String::new(),
            source_line: 0,
            uops: Vec::new(),
            is_literal: false,
        }
    }
}
