//! I/O convenience helpers used by the CLI entry point.
//!
//! Thin wrapper around standard I/O to open either a named file or stdin via
//! the conventional "-" path, the same convention the teacher used for its
//! own input files.

use std::fs::File;
use std::io::{self, Read};

/// Open a file path for reading, or stdin when `path` is "-".
///
/// The returned reader is boxed to allow dynamic dispatch across sources.
pub fn open_input(path: &str) -> io::Result<Box<dyn Read>> {
    if path == "-" {
        Ok(Box::new(io::stdin()))
    } else {
        Ok(Box::new(File::open(path)?))
    }
}

/// Read a path (or stdin, for "-") fully into a `String`.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut reader = open_input(path)?;
    let mut out = String::new();
    reader.read_to_string(&mut out)?;
    Ok(out)
}
