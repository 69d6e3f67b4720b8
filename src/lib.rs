//! gitstat - run `git status` asynchronously and capture what it prints
//!
//! ```no_run
//! # async fn demo() -> Result<(), gitstat::CommandError> {
//! let status = gitstat::git_status().await?;
//! print!("{}", status);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod git;
pub mod host;
pub mod logging;

pub use git::{git_status, GitStatus};
pub use host::{CommandError, CommandRunner, ProcessOutput};
