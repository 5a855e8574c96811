//! Run configuration, generalized from the teacher's `Config`/`ExitStatus`
//! pair in `config.rs`.

use std::collections::HashMap;

use crate::ops::Value;

/// `--dump-input`'s value. Only `Fail`/`Never` are honoured (spec.md §6);
/// `Help`/`Always` are accepted for CLI compatibility and treated as `Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpInputKind {
    Help,
    Always,
    Never,
    #[default]
    Fail,
}

#[derive(Debug, Clone)]
pub struct Options {
    /// Path to the input file under test; "-" or absent means stdin.
    pub input_file: String,
    /// Path to the check-specification file (for diagnostics).
    pub match_filename: String,
    pub check_prefixes: Vec<String>,
    pub comment_prefixes: Vec<String>,
    pub strict_whitespace: bool,
    pub enable_var_scope: bool,
    pub match_full_lines: bool,
    pub allow_empty: bool,
    pub reject_empty_vars: bool,
    pub dump_input: DumpInputKind,
    pub variables: HashMap<String, Value>,
    /// `FILECHECK_FEATURE_ENABLE=MLIR_REGEX_CLS`.
    pub mlir_regex_cls: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            input_file: "-".to_string(),
            match_filename: "-".to_string(),
            check_prefixes: vec!["CHECK".to_string()],
            comment_prefixes: vec!["COM".to_string(), "RUN".to_string()],
            strict_whitespace: false,
            enable_var_scope: false,
            match_full_lines: false,
            allow_empty: false,
            reject_empty_vars: false,
            dump_input: DumpInputKind::default(),
            variables: HashMap::new(),
            mlir_regex_cls: false,
        }
    }
}

impl Options {
    /// `<stdin>` when reading from standard input, the path otherwise.
    pub fn readable_input_file(&self) -> String {
        if self.input_file == "-" {
            "<stdin>".to_string()
        } else {
            self.input_file.clone()
        }
    }
}

/// Process exit status, matching spec.md §5/§6's 0/1/2 contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCheckExit {
    Success = 0,
    CheckFailure = 1,
    NoCheckStrings = 2,
}
