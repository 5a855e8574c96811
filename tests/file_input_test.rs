use checkfile::{io_utils, run_filecheck, FileCheckExit, Options};

#[test]
fn reads_input_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.txt");
    std::fs::write(&input_path, "hello\nworld\n").unwrap();

    let opts = Options::default();
    let input = io_utils::read_to_string(input_path.to_str().unwrap()).unwrap();
    let status = run_filecheck(&opts, "CHECK: hello\nCHECK-NEXT: world\n", &input);
    assert_eq!(status, FileCheckExit::Success);
}

#[test]
fn dash_reads_nothing_without_a_piped_stdin_but_open_input_does_not_panic() {
    // "-" resolves to stdin; we only assert the path doesn't require a real
    // file to exist on disk.
    let opened = io_utils::open_input("-");
    assert!(opened.is_ok());
}

#[test]
fn missing_input_file_is_an_io_error() {
    let result = io_utils::read_to_string("/definitely/not/a/real/path.txt");
    assert!(result.is_err());
}
