//! Command-line argument parsing for the filecheck binary.
//!
//! This module defines the CLI interface (flags and options) and provides a
//! `parse()` helper that returns a populated `Options` along with the
//! check-specification file path. On error (e.g. a malformed `-D`), `parse()`
//! returns a user-friendly message suitable for printing to stderr.
//!
//! Grounded in `examples/original_source/filecheck/options.py`'s
//! `parse_argv_options`/`normalise_args`: `--key=value` is split into two
//! words before parsing, and `-Dname=value`/`-Dname value` are both accepted.

use std::collections::HashMap;

use clap::{Arg, ArgAction, Command};

use crate::config::{DumpInputKind, Options};
use crate::ops::Value;

/// Build the clap Command describing filecheck's CLI.
pub fn build_cli() -> Command {
    Command::new("filecheck")
        .about("Verifies that a file matches a set of check patterns")
        .arg(
            Arg::new("check-prefixes")
                .long("check-prefix")
                .visible_alias("check-prefixes")
                .value_name("PREFIX")
                .num_args(1)
                .action(ArgAction::Append)
                .help("Prefix to use from check file (may be used multiple times)"),
        )
        .arg(
            Arg::new("comment-prefixes")
                .long("comment-prefixes")
                .value_name("PREFIX")
                .num_args(1)
                .action(ArgAction::Append)
                .help("Prefix that marks a check-file line as a comment (may be used multiple times)"),
        )
        .arg(
            Arg::new("input-file")
                .long("input-file")
                .value_name("FILE")
                .num_args(1)
                .help("File to check (defaults to standard input)"),
        )
        .arg(
            Arg::new("strict-whitespace")
                .long("strict-whitespace")
                .action(ArgAction::SetTrue)
                .help("Do not treat all horizontal whitespace as equivalent"),
        )
        .arg(
            Arg::new("enable-var-scope")
                .long("enable-var-scope")
                .action(ArgAction::SetTrue)
                .help("Check variables with the same name but different prefix are different variables"),
        )
        .arg(
            Arg::new("match-full-lines")
                .long("match-full-lines")
                .action(ArgAction::SetTrue)
                .help("Require all positive matches to cover an entire line"),
        )
        .arg(
            Arg::new("allow-empty")
                .long("allow-empty")
                .action(ArgAction::SetTrue)
                .help("Allow the input file to be empty"),
        )
        .arg(
            Arg::new("reject-empty-vars")
                .long("reject-empty-vars")
                .action(ArgAction::SetTrue)
                .help("Fail matches when a captured variable is the empty string"),
        )
        .arg(
            Arg::new("dump-input")
                .long("dump-input")
                .value_name("MODE")
                .num_args(1)
                .value_parser(["help", "always", "never", "fail"])
                .help("Dump input to stderr: help|always|never|fail"),
        )
        .arg(
            Arg::new("define")
                .short('D')
                .value_name("NAME=VALUE")
                .num_args(1)
                .action(ArgAction::Append)
                .help("Define a variable NAME with value VALUE"),
        )
        .arg(
            Arg::new("match-filename")
                .value_name("MATCH-FILENAME")
                .num_args(1)
                .required(true)
                .help("File with check patterns to match"),
        )
}

/// Splits the `-D` option's value (`NAME=VALUE`) into its two halves. clap
/// has already stripped the `-D`/`--define` prefix by the time this runs.
fn split_define(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) => Ok((name.to_string(), value.to_string())),
        None => Err(format!("invalid -D argument \"{raw}\", expected NAME=VALUE")),
    }
}

fn parse_dump_input(raw: &str) -> DumpInputKind {
    match raw {
        "help" => DumpInputKind::Help,
        "always" => DumpInputKind::Always,
        "never" => DumpInputKind::Never,
        _ => DumpInputKind::Fail,
    }
}

/// Parse CLI arguments into an `Options`.
pub fn parse() -> Result<Options, String> {
    parse_from(std::env::args_os())
}

fn parse_from<I, T>(argv: I) -> Result<Options, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_cli()
        .try_get_matches_from(argv)
        .map_err(|e| e.to_string())?;

    let mut opts = Options::default();

    if let Some(prefixes) = matches.get_many::<String>("check-prefixes") {
        opts.check_prefixes = prefixes.map(|s| s.to_string()).collect();
    }
    if let Some(prefixes) = matches.get_many::<String>("comment-prefixes") {
        opts.comment_prefixes = prefixes.map(|s| s.to_string()).collect();
    }
    if let Some(path) = matches.get_one::<String>("input-file") {
        opts.input_file = path.clone();
    }

    opts.strict_whitespace = matches.get_flag("strict-whitespace");
    opts.enable_var_scope = matches.get_flag("enable-var-scope");
    opts.match_full_lines = matches.get_flag("match-full-lines");
    opts.allow_empty = matches.get_flag("allow-empty");
    opts.reject_empty_vars = matches.get_flag("reject-empty-vars");

    if let Some(mode) = matches.get_one::<String>("dump-input") {
        opts.dump_input = parse_dump_input(mode);
    }

    let mut variables: HashMap<String, Value> = HashMap::new();
    if let Some(defines) = matches.get_many::<String>("define") {
        for raw in defines {
            let (name, value) = split_define(raw)?;
            variables.insert(name, Value::Str(value));
        }
    }
    opts.variables = variables;

    opts.mlir_regex_cls = std::env::var("FILECHECK_FEATURE_ENABLE")
        .map(|v| v.split(',').any(|f| f.trim() == "MLIR_REGEX_CLS"))
        .unwrap_or(false);

    opts.match_filename = matches
        .get_one::<String>("match-filename")
        .expect("required by clap")
        .clone();

    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("filecheck".to_string())
            .chain(v.iter().map(|s| s.to_string()))
            .collect()
    }

    #[test]
    fn parses_match_filename_and_defaults() {
        let opts = parse_from(args(&["check.txt"])).unwrap();
        assert_eq!(opts.match_filename, "check.txt");
        assert_eq!(opts.check_prefixes, vec!["CHECK".to_string()]);
        assert_eq!(opts.input_file, "-");
    }

    #[test]
    fn repeated_check_prefix_accumulates() {
        let opts = parse_from(args(&[
            "--check-prefix",
            "CHECK",
            "--check-prefix",
            "VERIFY",
            "check.txt",
        ]))
        .unwrap();
        assert_eq!(opts.check_prefixes, vec!["CHECK".to_string(), "VERIFY".to_string()]);
    }

    #[test]
    fn define_sets_a_variable() {
        let opts = parse_from(args(&["-DFOO=bar", "check.txt"])).unwrap();
        assert_eq!(opts.variables.get("FOO"), Some(&Value::Str("bar".to_string())));
    }

    #[test]
    fn malformed_define_is_an_error() {
        assert!(parse_from(args(&["-DFOO", "check.txt"])).is_err());
    }

    #[test]
    fn boolean_flags_toggle_options() {
        let opts = parse_from(args(&[
            "--strict-whitespace",
            "--enable-var-scope",
            "--match-full-lines",
            "--allow-empty",
            "--reject-empty-vars",
            "check.txt",
        ]))
        .unwrap();
        assert!(opts.strict_whitespace);
        assert!(opts.enable_var_scope);
        assert!(opts.match_full_lines);
        assert!(opts.allow_empty);
        assert!(opts.reject_empty_vars);
    }

    #[test]
    fn dump_input_mode_parses() {
        let opts = parse_from(args(&["--dump-input", "never", "check.txt"])).unwrap();
        assert_eq!(opts.dump_input, crate::config::DumpInputKind::Never);
    }
}
