//! Scans a check-specification file for directive lines and lowers each
//! one's argument text into a `Vec<UOp>`.
//!
//! Grounded in `examples/original_source/filecheck/parser.py`. The upstream
//! parser tokenizes arguments by splitting on a regex that matches `{{`,
//! `[[` (glued to a valid identifier-start char), and bare `]`/`}`, then
//! walks the resulting token list counting bracket depth. This port instead
//! scans characters directly and tracks the same depth count, which reads
//! more naturally in Rust and produces identical blocks.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::Options;
use crate::error::ParseError;
use crate::ops::{CheckKind, CheckOp, UOp, ValueMapper};
use crate::regex_translator;

fn var_capture_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[\[(\$?[a-zA-Z_][a-zA-Z0-9_]*):([^\n]*)\]\]$").expect("static pattern")
    })
}

fn var_subst_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\[(\$?[a-zA-Z_][a-zA-Z0-9_]*)\]\]$").expect("static pattern"))
}

fn numeric_subst_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[\[#(\$?[a-zA-Z_][a-zA-Z0-9_]*)([a-z0-9 +\-()]*)\]\]$").expect("static pattern")
    })
}

fn numeric_capture_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\[\[#(%(\.[0-9]+)?([udxX])?,)?((\$?[a-zA-Z_][a-zA-Z0-9_]+):(\d+)?)?\]\]$",
        )
        .expect("static pattern")
    })
}

fn pseudo_numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\[# @LINE ?(([+-]) (\d+))?\]\]$").expect("static pattern"))
}

/// The directive-line recognizer and the comment-line filter, built fresh
/// per run from the configured check/comment prefixes.
pub struct LinePatterns {
    check_line: Regex,
    comment_line: Regex,
}

impl LinePatterns {
    pub fn new(opts: &Options) -> Self {
        let prefixes = opts
            .check_prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let check_line = Regex::new(&format!(
            r"(?:^|[^a-zA-Z0-9_-])({prefixes})(?:-(DAG|COUNT-[0-9]+|NOT|EMPTY|NEXT|SAME|LABEL))?(\{{LITERAL\}})?:[ \t]?(.*)$"
        ))
        .expect("prefixes are regex-escaped");

        let comments = opts
            .comment_prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let comment_line = Regex::new(&format!(r"(?:{comments}).*(?:{prefixes})"))
            .expect("prefixes are regex-escaped");

        LinePatterns { check_line, comment_line }
    }
}

/// Iterates check directives out of a check-specification file's text.
pub struct Parser<'a> {
    opts: &'a Options,
    patterns: LinePatterns,
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, opts: &'a Options) -> Self {
        Parser {
            opts,
            patterns: LinePatterns::new(opts),
            lines: source.lines(),
            line_no: 0,
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<CheckOp, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;

            if self.patterns.comment_line.is_match(line) {
                continue;
            }
            let Some(caps) = self.patterns.check_line.captures(line) else {
                continue;
            };

            let prefix = caps.get(1).unwrap().as_str().to_string();
            let kind_suffix = caps.get(2).map(|m| m.as_str());
            let is_literal = caps.get(3).is_some();
            let mut arg = caps.get(4).map(|m| m.as_str()).unwrap_or("").to_string();

            let kind = match parse_kind(kind_suffix, &prefix, self.line_no, line) {
                Ok(k) => k,
                Err(e) => return Some(Err(e)),
            };

            if kind != CheckKind::Empty && arg.is_empty() {
                return Some(Err(ParseError {
                    message: format!(
                        "found empty check string with prefix '{}:'",
                        kind.name()
                    ),
                    line_no: self.line_no,
                    column: caps.get(4).map(|m| m.start()).unwrap_or(0),
                    offending_line: line.to_string(),
                }));
            }

            if !self.opts.strict_whitespace {
                arg = arg.trim().to_string();
            }

            let uops = if is_literal {
                vec![UOp::Literal(arg.clone())]
            } else {
                match parse_args(&arg, self.opts, self.line_no, line) {
                    Ok(u) => u,
                    Err(e) => return Some(Err(e)),
                }
            };

            return Some(Ok(CheckOp {
                prefix,
                kind,
                arg,
                source_line: self.line_no,
                uops,
                is_literal,
            }));
        }
    }
}

fn parse_kind(suffix: Option<&str>, prefix: &str, line_no: usize, line: &str) -> Result<CheckKind, ParseError> {
    let Some(s) = suffix else {
        return Ok(CheckKind::Check);
    };
    Ok(match s {
        "DAG" => CheckKind::Dag,
        "NOT" => CheckKind::Not,
        "EMPTY" => CheckKind::Empty,
        "NEXT" => CheckKind::Next,
        "SAME" => CheckKind::Same,
        "LABEL" => CheckKind::Label,
        _ if s.starts_with("COUNT-") => {
            let n: u32 = s[6..].parse().unwrap_or(0);
            if n == 0 {
                return Err(ParseError {
                    message: format!(
                        "invalid count in -COUNT specification on prefix '{prefix}' (count can't be 0)"
                    ),
                    line_no,
                    column: 0,
                    offending_line: line.to_string(),
                });
            }
            CheckKind::Count(n)
        }
        _ => unreachable!("check_line regex only admits known suffixes"),
    })
}

fn is_escaped(chars: &[char], i: usize) -> bool {
    i > 0 && chars[i - 1] == '\\'
}

/// Lower a directive's trimmed argument text into micro-ops.
fn parse_args(arg: &str, opts: &Options, line_no: usize, raw_line: &str) -> Result<Vec<UOp>, ParseError> {
    let chars: Vec<char> = arg.chars().collect();
    let mut i = 0;
    let mut uops = Vec::new();
    let mut literal = String::new();

    while i < chars.len() {
        if chars[i] == '{' && chars.get(i + 1) == Some(&'{') {
            flush_literal(&mut literal, &mut uops);
            let start = i;
            i += 2;
            let content_start = i;
            loop {
                if i + 1 < chars.len() && chars[i] == '}' && chars[i + 1] == '}' {
                    break;
                }
                if i >= chars.len() {
                    return Err(ParseError {
                        message: "Invalid regex block, no }}".to_string(),
                        line_no,
                        column: start,
                        offending_line: raw_line.to_string(),
                    });
                }
                i += 1;
            }
            let frag: String = chars[content_start..i].iter().collect();
            i += 2;
            let translated = regex_translator::posix_to_target_regex(&frag, opts.mlir_regex_cls)
                .map_err(|e| ParseError {
                    message: e.to_string(),
                    line_no,
                    column: start,
                    offending_line: raw_line.to_string(),
                })?;
            uops.push(UOp::Regex(translated));
        } else if chars[i] == '[' && chars.get(i + 1) == Some(&'[') {
            flush_literal(&mut literal, &mut uops);
            let start = i;
            let mut depth = 2i32;
            i += 2;
            while depth > 0 {
                if i >= chars.len() {
                    return Err(ParseError {
                        message: "Invalid substitution block, no ]]".to_string(),
                        line_no,
                        column: start,
                        offending_line: raw_line.to_string(),
                    });
                }
                match chars[i] {
                    '[' if !is_escaped(&chars, i) => depth += 1,
                    ']' if !is_escaped(&chars, i) => depth -= 1,
                    _ => {}
                }
                i += 1;
            }
            let block: String = chars[start..i].iter().collect();
            let uop = lower_substitution_block(&block, opts, line_no, start, raw_line)?;
            uops.push(uop);
        } else {
            literal.push(chars[i]);
            i += 1;
        }
    }
    flush_literal(&mut literal, &mut uops);
    Ok(uops)
}

fn flush_literal(buf: &mut String, uops: &mut Vec<UOp>) {
    if !buf.is_empty() {
        uops.push(UOp::Literal(std::mem::take(buf)));
    }
}

fn lower_substitution_block(
    block: &str,
    opts: &Options,
    line_no: usize,
    column: usize,
    raw_line: &str,
) -> Result<UOp, ParseError> {
    if let Some(caps) = var_capture_re().captures(block) {
        let name = caps.get(1).unwrap().as_str().to_string();
        let pattern = regex_translator::posix_to_target_regex(caps.get(2).unwrap().as_str(), opts.mlir_regex_cls)
            .map_err(|e| parse_error_here(e.to_string(), line_no, column, raw_line))?;
        return Ok(UOp::Capture { name, pattern, mapper: ValueMapper::Str });
    }
    if let Some(caps) = var_subst_re().captures(block) {
        return Ok(UOp::Subst(caps.get(1).unwrap().as_str().to_string()));
    }
    if let Some(caps) = numeric_subst_re().captures(block) {
        let name = caps.get(1).unwrap().as_str().to_string();
        let expr = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        return Ok(if expr.is_empty() {
            UOp::Subst(name)
        } else {
            UOp::NumSubst { name, expr: expr.to_string() }
        });
    }
    if let Some(caps) = numeric_capture_re().captures(block) {
        let digits = caps.get(2).map(|m| m.as_str());
        let encoding = caps.get(3).and_then(|m| m.as_str().chars().next());
        let name = caps
            .get(5)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let (pattern, mapper) = regex_translator::pattern_from_num_subst_spec(digits, encoding);
        return Ok(UOp::Capture { name, pattern, mapper });
    }
    if let Some(caps) = pseudo_numeric_re().captures(block) {
        let offset = match caps.get(1) {
            Some(_) => {
                let sign = caps.get(2).unwrap().as_str();
                let magnitude: i64 = caps.get(3).unwrap().as_str().parse().unwrap_or(0);
                if sign == "-" { -magnitude } else { magnitude }
            }
            None => 0,
        };
        return Ok(UOp::PseudoVar(offset));
    }
    Err(parse_error_here(
        format!("Invalid substitution block, unknown format: {block}"),
        line_no,
        column,
        raw_line,
    ))
}

fn parse_error_here(message: String, line_no: usize, column: usize, raw_line: &str) -> ParseError {
    ParseError { message, line_no, column, offending_line: raw_line.to_string() }
}
