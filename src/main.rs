use checkfile::{cli, io_utils, run_filecheck, FileCheckExit};
use std::process::ExitCode;

fn main() -> ExitCode {
    let opts = match cli::parse() {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };

    let check_source = match io_utils::read_to_string(&opts.match_filename) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("filecheck: could not open '{}': {e}", opts.match_filename);
            return ExitCode::from(2);
        }
    };

    let input_source = match io_utils::read_to_string(&opts.input_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("filecheck: could not open '{}': {e}", opts.readable_input_file());
            return ExitCode::from(2);
        }
    };

    match run_filecheck(&opts, &check_source, &input_source) {
        FileCheckExit::Success => ExitCode::from(0),
        FileCheckExit::CheckFailure => ExitCode::from(1),
        FileCheckExit::NoCheckStrings => ExitCode::from(2),
    }
}
