//! gitstat - print `git status` for the current directory
//!
//! Git's stdout and stderr are passed through unchanged and the process exits
//! with git's own exit code when git reports a failure.

use clap::Parser;
use gitstat::cli::{self, exit_codes, Cli};
use gitstat::config::Config;
use gitstat::logging;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return exit_codes::CONFIG_ERROR;
        }
    };

    // Initialize logging
    if let Err(e) = logging::init(&config.logging, cli.verbose, cli.json_output) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return exit_codes::CONFIG_ERROR;
    }

    // Create tokio runtime for the async runner
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            return exit_codes::UNEXPECTED_FAILURE;
        }
    };

    rt.block_on(cli::run(&cli, &config))
}
