//! filecheck: a library and CLI for verifying a file against a sequence of
//! check patterns embedded as directives in another file.
//!
//! The public API lets you:
//! - Configure a run via [`Options`] (check prefixes, variables, strictness).
//! - Run a check-spec against an input via [`run_filecheck`].
//!
//! Quick example:
//!
//! ```no_run
//! use checkfile::{Options, run_filecheck, FileCheckExit};
//! let opts = Options::default();
//! let checks = "CHECK: hello\nCHECK-NEXT: world\n";
//! let input = "hello\nworld\n";
//! let status = run_filecheck(&opts, checks, input);
//! assert_eq!(status, FileCheckExit::Success);
//! ```

pub mod cli;
pub mod colors;
pub mod compiler;
pub mod config;
pub mod cursor;
pub mod diagnostics;
pub mod error;
pub mod io_utils;
pub mod literal;
pub mod matcher;
pub mod ops;
pub mod parser;
pub mod preprocess;
pub mod regex_translator;

pub use config::{DumpInputKind, FileCheckExit, Options};
pub use matcher::run_filecheck;
