use checkfile::ops::Value;
use checkfile::{run_filecheck, FileCheckExit, Options};

#[test]
fn check_then_next_passes() {
    let opts = Options::default();
    let status = run_filecheck(&opts, "CHECK: foo\nCHECK-NEXT: bar\n", "foo\nbar\n");
    assert_eq!(status, FileCheckExit::Success);
}

#[test]
fn check_next_wrong_content_fails_and_cites_the_next_line() {
    let opts = Options::default();
    let status = run_filecheck(&opts, "CHECK: foo\nCHECK-NEXT: baz\n", "foo\nbar\n");
    assert_eq!(status, FileCheckExit::CheckFailure);
}

#[test]
fn dag_matches_any_ordering_of_three_items() {
    let opts = Options::default();
    let checks = "CHECK-DAG: c\nCHECK-DAG: a\nCHECK-DAG: b\n";
    let status = run_filecheck(&opts, checks, "a\nb\nc\n");
    assert_eq!(status, FileCheckExit::Success);
}

#[test]
fn variable_capture_then_mismatched_reuse_fails() {
    let opts = Options::default();
    let checks = "CHECK: x=[[V:\\d+]]\nCHECK: y=[[V]]\n";
    let status = run_filecheck(&opts, checks, "x=1\ny=2\n");
    assert_eq!(status, FileCheckExit::CheckFailure);
}

#[test]
fn not_between_two_checks_passes_when_absent_and_fails_when_present() {
    let opts = Options::default();
    let checks_absent = "CHECK: alpha\nCHECK-NOT: gamma\nCHECK: beta\n";
    let status = run_filecheck(&opts, checks_absent, "alpha\nbeta\n");
    assert_eq!(status, FileCheckExit::Success);

    let checks_present = "CHECK: alpha\nCHECK-NOT: beta\nCHECK: beta\n";
    let status = run_filecheck(&opts, checks_present, "alpha\nbeta\n");
    assert_eq!(status, FileCheckExit::CheckFailure);
}

#[test]
fn label_bounded_regions_reject_reordering() {
    let opts = Options::default();
    let checks = "CHECK-LABEL: header\nCHECK: body\nCHECK-LABEL: footer\n";
    let ok = run_filecheck(&opts, checks, "header\nbody\nfooter\n");
    assert_eq!(ok, FileCheckExit::Success);

    let reordered = run_filecheck(&opts, checks, "header\nfooter\nbody\n");
    assert_eq!(reordered, FileCheckExit::CheckFailure);
}

#[test]
fn count_n_against_n_and_n_minus_one_occurrences() {
    let opts = Options::default();
    let checks = "CHECK-COUNT-3: line\n";
    let exact = run_filecheck(&opts, checks, "line\nline\nline\n");
    assert_eq!(exact, FileCheckExit::Success);

    let short = run_filecheck(&opts, checks, "line\nline\n");
    assert_eq!(short, FileCheckExit::CheckFailure);
}

#[test]
fn no_check_strings_in_empty_check_file_returns_exit_two() {
    let opts = Options::default();
    let status = run_filecheck(&opts, "", "anything\n");
    assert_eq!(status, FileCheckExit::NoCheckStrings);
}

#[test]
fn empty_input_fails_without_allow_empty() {
    let opts = Options::default();
    let status = run_filecheck(&opts, "CHECK: foo\n", "");
    assert_eq!(status, FileCheckExit::CheckFailure);
}

#[test]
fn empty_input_with_allow_empty_still_enforces_checks() {
    let mut opts = Options::default();
    opts.allow_empty = true;
    let status = run_filecheck(&opts, "CHECK: foo\n", "");
    assert_eq!(status, FileCheckExit::CheckFailure);
}

#[test]
fn check_empty_requires_a_blank_line_immediately_after_the_previous_match() {
    let opts = Options::default();
    let status = run_filecheck(&opts, "CHECK: foo\nCHECK-EMPTY:\nCHECK: bar\n", "foo\n\nbar\n");
    assert_eq!(status, FileCheckExit::Success);

    let status = run_filecheck(&opts, "CHECK: foo\nCHECK-EMPTY:\nCHECK: bar\n", "foo\nbar\n");
    assert_eq!(status, FileCheckExit::CheckFailure);
}

#[test]
fn same_is_confined_to_the_current_line() {
    let opts = Options::default();
    let status = run_filecheck(&opts, "CHECK: foo\nCHECK-SAME: bar\n", "foo bar\n");
    assert_eq!(status, FileCheckExit::Success);

    let status = run_filecheck(&opts, "CHECK: foo\nCHECK-SAME: bar\n", "foo\nbar\n");
    assert_eq!(status, FileCheckExit::CheckFailure);
}

#[test]
fn predefined_variable_can_be_substituted() {
    let mut opts = Options::default();
    opts.variables.insert("VER".to_string(), Value::Int(3));
    let status = run_filecheck(&opts, "CHECK: version [[VER]]\n", "version 3\n");
    assert_eq!(status, FileCheckExit::Success);
}
