use std::process::ExitCode;

use clap::Parser;
use log::error;

use psi::cli::Cli;
use psi::cmd;

fn main() -> ExitCode {
    // Parse the cli, usage errors exit here
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .init();

    match cmd::run(
        cli.mode(),
        cli.input.as_deref(),
        cli.output.as_deref(),
        &cli.frame_config(),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?} failed: {}", cli.mode(), e);
            ExitCode::FAILURE
        }
    }
}
