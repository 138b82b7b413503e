//! CLI entrypoint for the minerboard dashboard.
//!
//! Delegates to [`minerboard_cli::run`], which loads configuration, talks to
//! the miner, and prints the response envelope.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    minerboard_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
