use clap::Parser;
use datesort::cli::{Args, describe_error, init_logging, run};
use datesort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            OutputFormatter::error(&format!("Cannot determine working directory: {}", e));
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &working_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&describe_error(&e));
            ExitCode::FAILURE
        }
    }
}
