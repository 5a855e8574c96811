//! Lowers a directive's micro-ops into a matchable pattern: either the
//! whitespace-insensitive literal fast path (no regex involved at all) or a
//! compiled `regex::Regex`, plus the map of named captures it produces.
//!
//! Grounded in `examples/original_source/filecheck/compiler.py`.

use std::collections::HashMap;

use regex::{Captures, Regex};

use crate::config::Options;
use crate::cursor::MatchResult;
use crate::error::CheckError;
use crate::literal::LiteralMatcher;
use crate::ops::{CheckKind, CheckOp, UOp, Value, ValueMapper};

/// Where in the compiled regex a named capture landed, and how to interpret
/// its matched text.
#[derive(Debug, Clone, Copy)]
pub struct CaptureInfo {
    pub group: usize,
    pub mapper: ValueMapper,
}

/// Either path a directive can compile to.
pub enum CompiledPattern {
    Literal(LiteralMatcher),
    /// `backrefs` holds `(later_group, earlier_group)` pairs: pairs of groups
    /// that must hold textually identical matches. The `regex` crate has no
    /// backreference support, so same-line reuse of a variable just
    /// captured is compiled as an independent group using the earlier
    /// capture's own pattern, and verified against its text after the fact.
    Regex {
        regex: Regex,
        backrefs: Vec<(usize, usize)>,
    },
}

impl CompiledPattern {
    /// Anchored match at `pos`, bounded by `endpos`.
    pub fn match_at(&self, text: &str, pos: usize, endpos: usize) -> Option<MatchResult> {
        match self {
            CompiledPattern::Literal(lm) => lm
                .match_at(text, pos, endpos)
                .map(|m| MatchResult::whole(m.start, m.end)),
            CompiledPattern::Regex { regex, backrefs } => {
                let end = endpos.min(text.len());
                if pos > end {
                    return None;
                }
                let hay = &text[..end];
                let caps = regex.captures_at(hay, pos)?;
                if caps.get(0)?.start() != pos {
                    return None;
                }
                if !backrefs_match(&caps, backrefs) {
                    return None;
                }
                Some(captures_to_match_result(&caps))
            }
        }
    }

    /// Unanchored search in `[pos, endpos)`, skipping candidate starts whose
    /// backreference constraints fail until one satisfies them or the range
    /// is exhausted.
    pub fn find_at(&self, text: &str, pos: usize, endpos: usize) -> Option<MatchResult> {
        match self {
            CompiledPattern::Literal(lm) => lm
                .search(text, pos, endpos)
                .map(|m| MatchResult::whole(m.start, m.end)),
            CompiledPattern::Regex { regex, backrefs } => {
                let end = endpos.min(text.len());
                if pos > end {
                    return None;
                }
                let hay = &text[..end];
                let mut start = pos;
                loop {
                    let caps = regex.captures_at(hay, start)?;
                    let whole = caps.get(0)?;
                    if backrefs_match(&caps, backrefs) {
                        return Some(captures_to_match_result(&caps));
                    }
                    start = whole.start() + 1;
                    if start > end {
                        return None;
                    }
                }
            }
        }
    }
}

fn backrefs_match(caps: &Captures, backrefs: &[(usize, usize)]) -> bool {
    backrefs.iter().all(|&(a, b)| match (caps.get(a), caps.get(b)) {
        (Some(x), Some(y)) => x.as_str() == y.as_str(),
        _ => false,
    })
}

fn captures_to_match_result(caps: &Captures) -> MatchResult {
    let whole = caps.get(0).expect("group 0 always present on a match");
    let groups = (1..caps.len())
        .map(|i| caps.get(i).map(|m| (m.start(), m.end())))
        .collect();
    MatchResult::with_groups(whole.start(), whole.end(), groups)
}

/// Compile a directive's micro-ops against the currently-bound variables.
pub fn compile_uops(
    op: &CheckOp,
    vars: &HashMap<String, Value>,
    opts: &Options,
) -> Result<(CompiledPattern, HashMap<String, CaptureInfo>), CheckError> {
    let match_on_next_line = matches!(op.kind, CheckKind::Next | CheckKind::Empty);

    if op.kind == CheckKind::Empty {
        let regex = Regex::new(r"[^\n]*\n\n").expect("static pattern");
        return Ok((CompiledPattern::Regex { regex, backrefs: Vec::new() }, HashMap::new()));
    }

    if !opts.match_full_lines {
        if let Some(text) = fold_literal(op, vars) {
            return Ok((
                CompiledPattern::Literal(LiteralMatcher::new(
                    text,
                    opts.strict_whitespace,
                    match_on_next_line,
                )),
                HashMap::new(),
            ));
        }
    }

    let mut pattern = String::from("(?m)");
    if opts.match_full_lines {
        pattern.push_str("^[ \t]*");
    }
    if op.kind == CheckKind::Next {
        // the rest of the current line (and its terminator, if any) is free
        // ground for NEXT to skip before its own content must match.
        pattern.push_str(r"\n?[^\n]*");
    }

    let mut group_counter = 1usize;
    let mut captures = HashMap::new();
    let mut local_groups: HashMap<&str, usize> = HashMap::new();
    let mut local_patterns: HashMap<&str, &str> = HashMap::new();
    let mut backrefs: Vec<(usize, usize)> = Vec::new();

    for uop in &op.uops {
        match uop {
            UOp::Literal(text) => pattern.push_str(&regex::escape(text)),
            UOp::Regex(frag) => {
                // translated to the target regex dialect already, by the parser.
                group_counter += count_unescaped_parens(frag);
                if frag.contains('|') {
                    // disambiguate alternation precedence against whatever
                    // comes next in the overall expression.
                    pattern.push('(');
                    pattern.push_str(frag);
                    pattern.push(')');
                    group_counter += 1;
                } else {
                    pattern.push_str(frag);
                }
            }
            UOp::Capture { name, pattern: pat, mapper } => {
                pattern.push('(');
                pattern.push_str(pat);
                pattern.push(')');
                captures.insert(name.clone(), CaptureInfo { group: group_counter, mapper: *mapper });
                local_groups.insert(name.as_str(), group_counter);
                local_patterns.insert(name.as_str(), pat.as_str());
                group_counter += 1 + count_unescaped_parens(pat);
            }
            UOp::Subst(name) => {
                if let (Some(&earlier), Some(&earlier_pat)) =
                    (local_groups.get(name.as_str()), local_patterns.get(name.as_str()))
                {
                    // the `regex` crate has no backreferences, so reuse the
                    // earlier capture's own pattern rather than an
                    // unconstrained `(.*?)`: a non-greedy group with nothing
                    // anchoring it would always settle for an empty match,
                    // never actually enforcing equality via backrefs_match.
                    pattern.push('(');
                    pattern.push_str(earlier_pat);
                    pattern.push(')');
                    backrefs.push((group_counter, earlier));
                    group_counter += 1 + count_unescaped_parens(earlier_pat);
                } else if let Some(val) = vars.get(name) {
                    pattern.push_str(&regex::escape(&val.to_string()));
                } else {
                    return Err(CheckError::new(
                        format!("using undefined variable \"{name}\""),
                        op.clone(),
                    ));
                }
            }
            UOp::NumSubst { name, expr } => {
                if !expr.is_empty() {
                    return Err(CheckError::new(
                        format!("unsupported numeric expression \"{expr}\""),
                        op.clone(),
                    ));
                }
                match vars.get(name) {
                    Some(val) => pattern.push_str(&regex::escape(&val.to_string())),
                    None => {
                        return Err(CheckError::new(
                            format!("using undefined variable \"{name}\""),
                            op.clone(),
                        ));
                    }
                }
            }
            UOp::PseudoVar(offset) => {
                let line = op.source_line as i64 + offset;
                pattern.push_str(&regex::escape(&line.to_string()));
            }
        }
    }

    if opts.match_full_lines {
        pattern.push_str("[ \t]*$");
    }

    let regex = Regex::new(&pattern)
        .map_err(|e| CheckError::new(format!("invalid pattern: {e}"), op.clone()))?;
    Ok((CompiledPattern::Regex { regex, backrefs }, captures))
}

/// Whether `op`'s micro-ops are all literal text and already-bound
/// substitutions, i.e. contain no new capture and no regex fragment — in
/// which case no regex compilation is needed at all.
fn fold_literal(op: &CheckOp, vars: &HashMap<String, Value>) -> Option<String> {
    let mut out = String::new();
    for uop in &op.uops {
        match uop {
            UOp::Literal(text) => out.push_str(text),
            UOp::Subst(name) => out.push_str(&vars.get(name)?.to_string()),
            UOp::NumSubst { name, expr } if expr.is_empty() => out.push_str(&vars.get(name)?.to_string()),
            UOp::PseudoVar(offset) => out.push_str(&(op.source_line as i64 + offset).to_string()),
            _ => return None,
        }
    }
    Some(out)
}

/// Count opening parens not immediately preceded by a backslash. This is
/// deliberately naive about `(?:...)` non-capturing groups, matching the
/// reference implementation's own counting rule rather than a fully correct
/// regex-group accounting.
fn count_unescaped_parens(s: &str) -> usize {
    let chars: Vec<char> = s.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| c == '(' && (i == 0 || chars[i - 1] != '\\'))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{CheckKind, CheckOp};

    fn op(kind: CheckKind, uops: Vec<UOp>) -> CheckOp {
        CheckOp {
            prefix: "CHECK".to_string(),
            kind,
            arg: String::new(),
            source_line: 10,
            uops,
            is_literal: false,
        }
    }

    #[test]
    fn pure_literal_folds_without_regex() {
        let o = op(CheckKind::Check, vec![UOp::Literal("hello world".to_string())]);
        let opts = Options::default();
        let (compiled, caps) = compile_uops(&o, &HashMap::new(), &opts).unwrap();
        assert!(matches!(compiled, CompiledPattern::Literal(_)));
        assert!(caps.is_empty());
    }

    #[test]
    fn capture_then_same_line_subst_uses_backreference_check() {
        let o = op(
            CheckKind::Check,
            vec![
                UOp::Capture {
                    name: "X".to_string(),
                    pattern: r"\d+".to_string(),
                    mapper: ValueMapper::UnsignedInt,
                },
                UOp::Literal(" == ".to_string()),
                UOp::Subst("X".to_string()),
            ],
        );
        let opts = Options::default();
        let (compiled, caps) = compile_uops(&o, &HashMap::new(), &opts).unwrap();
        assert_eq!(caps["X"].group, 1);
        let CompiledPattern::Regex { regex, backrefs } = compiled else {
            panic!("expected regex path");
        };
        assert_eq!(backrefs, vec![(2, 1)]);
        let m = regex.captures("42 == 42").unwrap();
        assert!(backrefs_match(&m, &backrefs));
        let m2 = regex.captures("42 == 43");
        if let Some(m2) = m2 {
            assert!(!backrefs_match(&m2, &backrefs));
        }
    }

    #[test]
    fn undefined_variable_substitution_is_an_error() {
        let o = op(CheckKind::Check, vec![UOp::Subst("UNBOUND".to_string())]);
        let opts = Options::default();
        assert!(compile_uops(&o, &HashMap::new(), &opts).is_err());
    }

    #[test]
    fn pseudo_var_folds_to_source_line_text() {
        let o = op(CheckKind::Check, vec![UOp::PseudoVar(1)]);
        let opts = Options::default();
        let (compiled, _) = compile_uops(&o, &HashMap::new(), &opts).unwrap();
        let CompiledPattern::Literal(lm) = compiled else {
            panic!("expected literal fold");
        };
        assert!(lm.match_at("11", 0, 2).is_some());
    }

    #[test]
    fn empty_check_is_anchored_to_next_blank_line() {
        let o = op(CheckKind::Empty, vec![]);
        let opts = Options::default();
        let (compiled, _) = compile_uops(&o, &HashMap::new(), &opts).unwrap();
        let CompiledPattern::Regex { regex, .. } = compiled else {
            panic!("expected regex path");
        };
        assert!(regex.is_match("foo\n\nbar"));
    }
}
