use neurun::app;
use neurun::cli::Cli;

use std::process::{ExitCode, exit};

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match app::run(cli).await {
        Ok(code) => match app::portable_exit_code(code) {
            Some(code) => ExitCode::from(code),
            // Wider codes (Windows) or negative ones: hand them to the OS as-is
            None => exit(code),
        },
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
