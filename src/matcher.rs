//! The matching engine: dispatches each directive by kind, advances the
//! input cursor, records captured variables, and defers `CHECK-NOT`
//! directives until the region they must be absent from is fully known.
//!
//! Grounded in `examples/original_source/filecheck/matcher.py`'s `Matcher`.

use std::collections::HashMap;

use crate::colors;
use crate::compiler::{compile_uops, CaptureInfo};
use crate::config::{DumpInputKind, FileCheckExit, Options};
use crate::cursor::{FileInput, InputRange, MatchResult};
use crate::diagnostics;
use crate::error::{CheckError, ErrorOnMatch, FileCheckError, ParseError};
use crate::ops::{CheckKind, CheckOp, UOp, Value};
use crate::parser::Parser;
use crate::preprocess;

/// Live substitution variables, plus the queue of deferred `CHECK-NOT`
/// directives and the position they started waiting at.
#[derive(Default)]
pub struct Context {
    pub live_variables: HashMap<String, Value>,
    negative_matches_stack: Vec<CheckOp>,
    negative_matches_start: Option<usize>,
}

pub struct Matcher<'a> {
    opts: &'a Options,
    file: FileInput,
    ctx: Context,
}

/// Parse `check_source` and run it against `input_source`, printing any
/// failure to stderr (unless `--dump-input=never` silences it) and
/// returning the process exit status.
pub fn run_filecheck(opts: &Options, check_source: &str, input_source: &str) -> FileCheckExit {
    let file = FileInput::new(input_source);
    if !opts.allow_empty && (file.content.is_empty() || file.content == "\n") {
        eprint_diag(opts, format!("{} '{}' is empty.", colors::error_prefix(), opts.readable_input_file()));
        return FileCheckExit::CheckFailure;
    }

    let parser = Parser::new(check_source, opts);
    let mut ops = Vec::new();
    for item in parser {
        match item {
            Ok(op) => ops.push(op),
            Err(e) => {
                eprint_diag(opts, format_parse_error_line(opts, &e));
                return FileCheckExit::CheckFailure;
            }
        }
    }
    if ops.is_empty() {
        let pref = if opts.check_prefixes.len() == 1 {
            format!("prefix {}", opts.check_prefixes[0])
        } else {
            format!("prefixes {}", opts.check_prefixes.join(", "))
        };
        eprint_diag(opts, format!("{} No check strings found with {pref}:", colors::error_prefix()));
        return FileCheckExit::NoCheckStrings;
    }

    let mut matcher = Matcher::new(opts, file);
    matcher.run(&ops)
}

fn format_parse_error_line(opts: &Options, e: &ParseError) -> String {
    diagnostics::format_parse_error(opts, e)
}

fn eprint_diag(opts: &Options, msg: impl AsRef<str>) {
    if opts.dump_input != DumpInputKind::Never {
        eprintln!("{}", msg.as_ref());
    }
}

impl<'a> Matcher<'a> {
    pub fn new(opts: &'a Options, file: FileInput) -> Self {
        let mut ctx = Context::default();
        ctx.live_variables = opts.variables.clone();
        Matcher { opts, file, ctx }
    }

    pub fn run(&mut self, ops: &[CheckOp]) -> FileCheckExit {
        if let Err(e) = preprocess::run(&mut self.file, ops, self.opts) {
            self.report_check_error(&e);
            return FileCheckExit::CheckFailure;
        }

        match self.dispatch_all(ops) {
            Ok(()) => FileCheckExit::Success,
            Err(FileCheckError::Check(e)) => {
                self.report_check_error(&e);
                FileCheckExit::CheckFailure
            }
            Err(FileCheckError::Negative(e)) => {
                self.report_error_on_match(&e);
                FileCheckExit::CheckFailure
            }
            Err(FileCheckError::Parse(_)) => unreachable!("parse errors are resolved before matching begins"),
        }
    }

    fn dispatch_all(&mut self, ops: &[CheckOp]) -> Result<(), FileCheckError> {
        for op in ops {
            self.pre_check(op)?;
            self.dispatch(op)?;
            self.post_check(op)?;
        }
        self.file.range.start = self.file.content.len().saturating_sub(1);
        self.post_check(&CheckOp::synthetic_tail())?;
        Ok(())
    }

    fn dispatch(&mut self, op: &CheckOp) -> Result<(), FileCheckError> {
        match &op.kind {
            CheckKind::Dag => self.check_dag(op)?,
            &CheckKind::Count(n) => self.check_count(op, n)?,
            CheckKind::Not => self.enqueue_not(op),
            CheckKind::Empty => self.check_empty(op)?,
            CheckKind::Next => self.match_immediately(op)?,
            CheckKind::Same => self.match_eventually(op, true)?,
            CheckKind::Check => self.match_eventually(op, false)?,
            CheckKind::Label => self.check_label(op),
            CheckKind::Nop => {}
        }
        Ok(())
    }

    fn pre_check(&mut self, op: &CheckOp) -> Result<(), FileCheckError> {
        if self.file.is_discontiguous() && op.kind != CheckKind::Dag {
            self.file.advance_to_last_hole();
        }
        if op.kind == CheckKind::Next {
            self.file.skip_to_end_of_line();
        } else if op.kind == CheckKind::Label {
            if let Some(start) = self.ctx.negative_matches_start.take() {
                let search_range = InputRange::new(start, self.file.range.end);
                let pending = std::mem::take(&mut self.ctx.negative_matches_stack);
                for check in &pending {
                    self.check_not(check, &search_range)?;
                }
            }
        }
        Ok(())
    }

    fn post_check(&mut self, op: &CheckOp) -> Result<(), FileCheckError> {
        if op.kind != CheckKind::Not {
            if let Some(start) = self.ctx.negative_matches_start.take() {
                let end = if self.file.is_discontiguous() {
                    self.file.range.start_of_first_hole().unwrap_or(self.file.range.start)
                } else {
                    self.file.range.start
                };
                let search_range = InputRange::new(start, end);
                let pending = std::mem::take(&mut self.ctx.negative_matches_stack);
                for check in &pending {
                    self.check_not(check, &search_range)?;
                }
            }
        }
        if self.opts.match_full_lines && !self.file.is_end_of_line() {
            return Err(CheckError::new("Didn't match whole line", op.clone()).into());
        }
        Ok(())
    }

    fn check_dag(&mut self, op: &CheckOp) -> Result<(), FileCheckError> {
        if !self.file.is_discontiguous() {
            self.file.start_discontiguous_region();
        }
        let (pattern, captures) = compile_uops(op, &self.ctx.live_variables, self.opts)?;
        let Some(m) = self.file.match_and_add_hole(&pattern) else {
            return Err(CheckError::new(format!("DAG: Can't find match ('{}')", op.arg), op.clone()).into());
        };
        self.capture_results(&m, &captures, op)?;
        Ok(())
    }

    fn check_count(&mut self, op: &CheckOp, n: u32) -> Result<(), FileCheckError> {
        for _ in 0..n {
            self.match_eventually(op, false)?;
        }
        Ok(())
    }

    fn check_not(&mut self, op: &CheckOp, search_range: &InputRange) -> Result<(), FileCheckError> {
        let (pattern, _) = compile_uops(op, &self.ctx.live_variables, self.opts)?;
        if let Some(m) = self.file.find_between(&pattern, search_range) {
            return Err(ErrorOnMatch {
                message: format!("NOT: excluded string found in input ('{}')", op.arg),
                op: op.clone(),
                match_start: m.start(),
                match_end: m.end(),
            }
            .into());
        }
        Ok(())
    }

    fn enqueue_not(&mut self, op: &CheckOp) {
        if self.ctx.negative_matches_start.is_none() {
            self.ctx.negative_matches_start = Some(self.file.range.start);
        }
        self.ctx.negative_matches_stack.push(op.clone());
    }

    fn check_label(&mut self, op: &CheckOp) {
        let _ = op;
        self.file.advance_range();
        if self.opts.enable_var_scope {
            self.purge_variables();
        }
    }

    fn check_empty(&mut self, op: &CheckOp) -> Result<(), FileCheckError> {
        if !self.opts.match_full_lines {
            self.file.skip_to_end_of_line();
        }
        if !(self.file.starts_with("\n\n") || self.file.is_end_of_file()) {
            return Err(CheckError::new(
                "EMPTY: is not on the line after the previous match",
                op.clone(),
            )
            .into());
        }
        if self.file.range.start < self.file.content.len() {
            self.file.advance_by(1);
        }
        Ok(())
    }

    fn match_immediately(&mut self, op: &CheckOp) -> Result<(), FileCheckError> {
        let (pattern, captures) = compile_uops(op, &self.ctx.live_variables, self.opts)?;
        let Some(m) = self.file.try_match(&pattern) else {
            return Err(CheckError::new(format!("Couldn't match \"{}\".", op.arg), op.clone()).into());
        };
        self.file.move_to(m.end());
        self.capture_results(&m, &captures, op)?;
        Ok(())
    }

    fn match_eventually(&mut self, op: &CheckOp, this_line: bool) -> Result<(), FileCheckError> {
        let (pattern, captures) = compile_uops(op, &self.ctx.live_variables, self.opts)?;
        let Some(m) = self.file.find(&pattern, this_line) else {
            return Err(CheckError::new(format!("Couldn't match \"{}\".", op.arg), op.clone()).into());
        };
        self.file.move_to(m.end());
        self.capture_results(&m, &captures, op)?;
        Ok(())
    }

    fn purge_variables(&mut self) {
        self.ctx.live_variables.retain(|name, _| name.starts_with('$'));
    }

    fn capture_results(
        &mut self,
        m: &MatchResult,
        captures: &HashMap<String, CaptureInfo>,
        op: &CheckOp,
    ) -> Result<(), FileCheckError> {
        for (name, info) in captures {
            let text = m.group(info.group, &self.file.content).unwrap_or("");
            let value = info.mapper.map(text);
            let is_empty = text.is_empty();
            self.ctx.live_variables.insert(name.clone(), value);
            if is_empty {
                eprint_diag(self.opts, format!("{} Empty pattern capture (at {}:{})", colors::warn_prefix(), self.opts.match_filename, op.source_line));
                if self.opts.reject_empty_vars {
                    return Err(CheckError::new(format!("Empty value captured for variable \"{name}\""), op.clone()).into());
                }
            }
        }
        Ok(())
    }

    fn report_check_error(&mut self, e: &CheckError) {
        eprint_diag(self.opts, diagnostics::format_check_error(self.opts, &self.file, e));
        if let Some(m) = self.find_prefix_match_for(&e.op) {
            eprint_diag(self.opts, diagnostics::format_possible_intended_match(&self.file.content, m.start()));
        }
    }

    fn report_error_on_match(&mut self, e: &ErrorOnMatch) {
        eprint_diag(self.opts, diagnostics::format_error_on_match(self.opts, &self.file, e));
    }

    /// Try progressively shorter prefixes of `op`'s micro-ops to find
    /// something that *does* match, as a hint for where the author's intent
    /// diverged from the input.
    fn find_prefix_match_for(&self, op: &CheckOp) -> Option<MatchResult> {
        if op.uops.is_empty() {
            return None;
        }
        let mut prefix = op.uops[..op.uops.len() - 1].to_vec();
        while approximate_uop_length(&prefix, &self.ctx.live_variables) >= 5 {
            let faux = CheckOp {
                prefix: op.prefix.clone(),
                kind: op.kind.clone(),
                arg: op.arg.clone(),
                source_line: op.source_line,
                uops: prefix.clone(),
                is_literal: op.is_literal,
            };
            let Ok((pattern, _)) = compile_uops(&faux, &self.ctx.live_variables, self.opts) else {
                return None;
            };
            if let Some(m) = self.file.find(&pattern, false) {
                return Some(m);
            }
            let Some(last) = prefix.pop() else { break };
            if let UOp::Literal(content) = &last {
                if content.len() > 5 {
                    prefix.push(UOp::Literal(content[..content.len() / 2].to_string()));
                }
            }
        }
        None
    }
}

fn approximate_uop_length(uops: &[UOp], vars: &HashMap<String, Value>) -> usize {
    uops.iter()
        .map(|uop| match uop {
            UOp::Subst(name) => vars.get(name).map(|v| v.to_string().len()).unwrap_or(0),
            UOp::Literal(content) => content.len(),
            UOp::Regex(content) => content.len(),
            UOp::Capture { pattern, .. } => pattern.len(),
            UOp::NumSubst { .. } | UOp::PseudoVar(_) => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> Options {
        Options::default()
    }

    #[test]
    fn simple_check_and_next_pass() {
        let o = opts();
        let result = run_filecheck(&o, "// CHECK: hello\n// CHECK-NEXT: world\n", "hello\nworld\n");
        assert_eq!(result, FileCheckExit::Success);
    }

    #[test]
    fn check_next_fails_when_not_on_following_line() {
        let o = opts();
        let result = run_filecheck(&o, "// CHECK: hello\n// CHECK-NEXT: world\n", "hello\n\nworld\n");
        assert_eq!(result, FileCheckExit::CheckFailure);
    }

    #[test]
    fn dag_matches_out_of_order_lines() {
        let o = opts();
        let result = run_filecheck(
            &o,
            "// CHECK-DAG: bbb\n// CHECK-DAG: aaa\n",
            "aaa\nbbb\nccc\n",
        );
        assert_eq!(result, FileCheckExit::Success);
    }

    #[test]
    fn check_not_between_two_checks_fails_when_present() {
        let o = opts();
        let result = run_filecheck(
            &o,
            "// CHECK: start\n// CHECK-NOT: forbidden\n// CHECK: end\n",
            "start\nforbidden\nend\n",
        );
        assert_eq!(result, FileCheckExit::CheckFailure);
    }

    #[test]
    fn check_not_between_two_checks_passes_when_absent() {
        let o = opts();
        let result = run_filecheck(
            &o,
            "// CHECK: start\n// CHECK-NOT: forbidden\n// CHECK: end\n",
            "start\nmiddle\nend\n",
        );
        assert_eq!(result, FileCheckExit::Success);
    }

    #[test]
    fn variable_capture_and_reuse_mismatch_fails() {
        let o = opts();
        let result = run_filecheck(
            &o,
            "// CHECK: reg [[REG:[a-z]+]], [[REG]]\n",
            "reg abc, xyz\n",
        );
        assert_eq!(result, FileCheckExit::CheckFailure);
    }

    #[test]
    fn variable_capture_and_reuse_match_passes() {
        let o = opts();
        let result = run_filecheck(
            &o,
            "// CHECK: reg [[REG:[a-z]+]], [[REG]]\n",
            "reg abc, abc\n",
        );
        assert_eq!(result, FileCheckExit::Success);
    }

    #[test]
    fn label_reordering_is_rejected() {
        let o = opts();
        let result = run_filecheck(
            &o,
            "// CHECK-LABEL: foo:\n// CHECK: one\n// CHECK-LABEL: bar:\n// CHECK: two\n",
            "bar:\ntwo\nfoo:\none\n",
        );
        assert_eq!(result, FileCheckExit::CheckFailure);
    }

    #[test]
    fn no_check_strings_found_returns_exit_2() {
        let o = opts();
        let result = run_filecheck(&o, "// nothing to see here\n", "anything\n");
        assert_eq!(result, FileCheckExit::NoCheckStrings);
    }

    #[test]
    fn empty_input_without_allow_empty_fails() {
        let o = opts();
        let result = run_filecheck(&o, "// CHECK: x\n", "");
        assert_eq!(result, FileCheckExit::CheckFailure);
    }

    #[test]
    fn empty_input_with_allow_empty_still_requires_checks_to_pass() {
        let mut o = opts();
        o.allow_empty = true;
        let result = run_filecheck(&o, "// CHECK: x\n", "");
        assert_eq!(result, FileCheckExit::CheckFailure);
    }
}
