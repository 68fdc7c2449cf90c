use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::error;

use sft_convert::{args, commands};

fn main() -> ExitCode {
    let cli = args::Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();

    match commands::run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
