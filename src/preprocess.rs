//! Locates every `CHECK-LABEL` directive ahead of time, under an empty
//! variable environment, and partitions the input into the ordered
//! sub-ranges each label bounds. Running this before the real match pass is
//! what makes label reordering a hard failure instead of an accidental
//! match against content that belongs to a later label's region.
//!
//! Grounded in `examples/original_source/filecheck/preprocess.py`.

use std::collections::{HashMap, VecDeque};

use crate::compiler::compile_uops;
use crate::config::Options;
use crate::cursor::{FileInput, InputRange};
use crate::error::CheckError;
use crate::ops::{CheckKind, CheckOp};

pub fn run(file: &mut FileInput, ops: &[CheckOp], opts: &Options) -> Result<(), CheckError> {
    let mut current = InputRange::new(file.range.start, file.range.end);
    let mut queue: VecDeque<InputRange> = VecDeque::new();
    let empty_vars = HashMap::new();

    for op in ops.iter().filter(|op| op.kind == CheckKind::Label) {
        let (pattern, _) = compile_uops(op, &empty_vars, opts)?;
        let m = file.find_between(&pattern, &current).ok_or_else(|| {
            CheckError::new(
                format!("LABEL: Could not find label '{}' in input", op.arg),
                op.clone(),
            )
        })?;
        let before = current.split_at(m.start(), m.end());
        queue.push_back(before);
    }
    queue.push_back(current);

    file.range = queue.pop_front().expect("at least one sub-range always queued");
    file.ranges = queue;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::UOp;

    fn label(arg: &str, source_line: usize) -> CheckOp {
        CheckOp {
            prefix: "CHECK".to_string(),
            kind: CheckKind::Label,
            arg: arg.to_string(),
            source_line,
            uops: vec![UOp::Literal(arg.to_string())],
            is_literal: false,
        }
    }

    #[test]
    fn partitions_input_around_each_label() {
        let mut file = FileInput::new("before\nfoo:\nmiddle\nbar:\nafter\n");
        let ops = vec![label("foo:", 2), label("bar:", 4)];
        let opts = Options::default();
        run(&mut file, &ops, &opts).unwrap();

        assert_eq!(file.ranges.len(), 2);
        assert_eq!(&file.content[file.range.start..file.range.end], "before\n");
        let middle = &file.ranges[0];
        assert_eq!(&file.content[middle.start..middle.end], "middle\n");
        let tail = &file.ranges[1];
        assert_eq!(&file.content[tail.start..tail.end], "after\n");
    }

    #[test]
    fn missing_label_is_a_check_error() {
        let mut file = FileInput::new("nothing here\n");
        let ops = vec![label("foo:", 1)];
        let opts = Options::default();
        assert!(run(&mut file, &ops, &opts).is_err());
    }
}
