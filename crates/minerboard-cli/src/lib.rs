//! Command-line runtime for the minerboard dashboard.
//!
//! The runtime splits configuration flags from the request, loads layered
//! configuration, performs the request against the miner, and prints a single
//! JSON envelope on stdout. Miner and request failures are part of the
//! envelope; only usage, configuration and output problems go to stderr.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use minerboard_api::{Connector, MinerClient};
use tracing::warn;

mod cli;
mod config;
mod envelope;
mod errors;
mod handlers;
mod telemetry;
mod views;


use cli::{Cli, CliCommand};
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(&split.command_arguments) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            // --help and --version land here.
            let _ = write!(stdout, "{}", error.render());
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = writeln!(stderr, "{}", AppError::CliUsage(error));
            return ExitCode::FAILURE;
        }
    };

    let outcome = loader.load(&split.config_arguments).and_then(|config| {
        telemetry::initialise(&config)?;
        let client = MinerClient::new(config.endpoint());
        respond(&client, &cli.command, cli.debug || config.debug(), stdout)
    });

    match outcome {
        Ok(exit_code) => exit_code,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn respond<C, W>(
    client: &MinerClient<C>,
    command: &CliCommand,
    debug: bool,
    stdout: &mut W,
) -> Result<ExitCode, AppError>
where
    C: Connector,
    W: Write,
{
    let envelope = match handlers::handle(client, command) {
        Ok(data) => envelope::success(data),
        Err(error) => {
            let Some(code) = error.envelope_code() else {
                return Err(error);
            };
            warn!(endpoint = %client.endpoint(), code, %error, "request failed");
            envelope::failure(code, &error.to_string())
        }
    };

    let rendered = envelope::render(&envelope, debug).map_err(AppError::Render)?;
    writeln!(stdout, "{rendered}").map_err(AppError::WriteOutput)?;

    if envelope::is_success(&envelope) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
