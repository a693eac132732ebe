use std::process::ExitCode;

use clap::Parser;
use ra_aid_start_cli::cli_args::Args;
use ra_aid_start_cli::commands;

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    match commands::execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
