//! Command-line interface for the `gitstat` binary

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::config::Config;
use crate::git::GitStatus;
use crate::host::CommandError;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_FAILURE: i32 = 1;
    pub const GIT_MISSING: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
}

/// Print `git status` for the current directory
#[derive(Parser, Debug)]
#[command(name = "gitstat", version, about)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_output: bool,

    /// Path to a config file
    #[arg(long, env = "GITSTAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

impl Cli {
    /// Build the invocation described by the flags and config
    pub fn status_command(&self, config: &Config) -> GitStatus {
        let status = GitStatus::default().with_program(config.git.program.clone());
        match &self.directory {
            Some(dir) => status.with_working_directory(dir),
            None => status,
        }
    }
}

/// Exit code for a failed status query
pub fn exit_code_for(err: &CommandError) -> i32 {
    match err {
        CommandError::Failed { code: Some(code), .. } if *code != 0 => *code,
        CommandError::BinaryNotFound(_) => exit_codes::GIT_MISSING,
        _ => exit_codes::UNEXPECTED_FAILURE,
    }
}

/// Write the outcome to the given streams and return the exit code.
///
/// Git's own output is passed through byte for byte.
pub fn report(
    result: Result<String, CommandError>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> i32 {
    let written = match &result {
        Ok(text) => out.write_all(text.as_bytes()).and_then(|_| out.flush()),
        Err(CommandError::Failed { stderr, .. }) => {
            err.write_all(stderr.as_bytes()).and_then(|_| err.flush())
        }
        Err(e) => writeln!(err, "Error: {}", e),
    };

    if let Err(e) = written {
        debug!(error = %e, "failed to write output");
        return exit_codes::UNEXPECTED_FAILURE;
    }

    match &result {
        Ok(_) => exit_codes::SUCCESS,
        Err(e) => exit_code_for(e),
    }
}

/// Run the status query and report it on stdout/stderr
pub async fn run(cli: &Cli, config: &Config) -> i32 {
    let status = cli.status_command(config);
    let result = status.run().await;

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    report(result, &mut stdout.lock(), &mut stderr.lock())
}
