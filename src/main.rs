use clap::Parser;
use sortera::cli::{Cli, run_cli};
use sortera::logging::init_logging;
use sortera::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.debug) {
        OutputFormatter::warning(&format!("Could not initialize logging: {}", e));
    }

    let summary = match run_cli(&cli) {
        Ok(summary) => summary,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                OutputFormatter::error(&format!("Error: could not serialize summary: {}", e));
                return ExitCode::FAILURE;
            }
        }
    } else {
        OutputFormatter::summary_table(&summary);
    }

    ExitCode::SUCCESS
}
