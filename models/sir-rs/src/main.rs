use std::process::ExitCode;

use clap::Parser;
use sir::cli::Args;

fn main() -> ExitCode {
    epi_runner::init_logging();
    let args = Args::parse();

    match sir::run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
