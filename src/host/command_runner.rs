//! Command Runner
//!
//! Executes an external program with stdout and stderr captured.
//! Both pipes are drained concurrently into separate accumulators while the
//! child runs, then the exit status decides between the captured stdout
//! (success) and the captured stderr (failure).

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, instrument, trace};

/// Size of a single read from a child pipe
const CHUNK_SIZE: usize = 8 * 1024;

/// Everything a finished child process left behind
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// All stdout chunks, in arrival order
    pub stdout: Vec<u8>,
    /// All stderr chunks, in arrival order
    pub stderr: Vec<u8>,
    /// How the process terminated
    pub status: ExitStatus,
}

impl ProcessOutput {
    /// Exit code, or `None` if the process was terminated by a signal
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Captured stdout decoded as UTF-8 (lossy)
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured stderr decoded as UTF-8 (lossy)
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Map the process result to its textual outcome.
    ///
    /// Exit code zero yields stdout verbatim. Any other outcome, including
    /// termination by signal, yields [`CommandError::Failed`] carrying stderr
    /// verbatim (which may be empty).
    pub fn into_text(self) -> Result<String, CommandError> {
        match self.exit_code() {
            Some(0) => Ok(self.stdout_text()),
            code => Err(CommandError::Failed {
                code,
                stderr: self.stderr_text(),
            }),
        }
    }
}

/// Command runner errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process ran and exited non-zero (or was killed).
    /// The message is exactly what it wrote to stderr.
    #[error("{stderr}")]
    Failed { code: Option<i32>, stderr: String },

    /// Binary not found in PATH
    #[error("Binary '{0}' not found. Install it or add to PATH.")]
    BinaryNotFound(String),

    /// The process could not be started
    #[error("Failed to launch '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Reading a pipe or waiting on the child failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Runs external programs and captures their output
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    /// Environment variables added on top of the inherited environment
    env_additions: HashMap<String, String>,
    /// Working directory; inherited when `None`
    working_directory: Option<PathBuf>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_additions.insert(key.into(), value.into());
        self
    }

    /// Run in `dir` instead of the current working directory
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Find a binary in PATH
    pub fn which(binary: &str) -> Option<PathBuf> {
        which::which(binary).ok()
    }

    /// Resolve `program` to something spawnable.
    ///
    /// Bare names go through PATH lookup. Anything with a directory
    /// component is taken as given, with relative paths anchored to this
    /// process's current directory rather than the child's working directory.
    fn resolve(program: &str) -> Result<PathBuf, CommandError> {
        let path = Path::new(program);
        let has_dir = path.parent().is_some_and(|p| !p.as_os_str().is_empty());

        if !has_dir {
            return Self::which(program)
                .ok_or_else(|| CommandError::BinaryNotFound(program.to_string()));
        }

        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }

    /// Fail early on a missing working directory; spawn would report it as
    /// `NotFound`, indistinguishable from a missing binary.
    fn check_working_directory(&self, program: &str) -> Result<(), CommandError> {
        match &self.working_directory {
            Some(dir) if !dir.is_dir() => Err(CommandError::LaunchFailed {
                program: program.to_string(),
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("working directory '{}' is not a directory", dir.display()),
                ),
            }),
            _ => Ok(()),
        }
    }

    /// Spawn `program args...`, wait for it to exit, and return both captured
    /// streams together with the exit status.
    #[instrument(skip(self), fields(cwd = ?self.working_directory))]
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<ProcessOutput, CommandError> {
        self.check_working_directory(program)?;
        let binary_path = Self::resolve(program)?;

        let mut cmd = Command::new(&binary_path);
        cmd.args(args);

        if let Some(dir) = &self.working_directory {
            cmd.current_dir(dir);
        }
        cmd.envs(&self.env_additions);

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!(binary = %binary_path.display(), "spawning process");

        let mut child = cmd.spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound && !binary_path.exists() {
                CommandError::BinaryNotFound(program.to_string())
            } else {
                CommandError::LaunchFailed {
                    program: program.to_string(),
                    source,
                }
            }
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("Failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("Failed to capture stderr"))?;

        // Drain both pipes at once so a chatty stream can't block the child.
        let (stdout, stderr) = tokio::join!(drain(stdout, "stdout"), drain(stderr, "stderr"));
        let status = child.wait().await?;

        let output = ProcessOutput {
            stdout: stdout?,
            stderr: stderr?,
            status,
        };

        debug!(
            exit_code = ?output.exit_code(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "process exited"
        );

        Ok(output)
    }

    /// Run a command and return its stdout text, or fail with its stderr text
    pub async fn output_text(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        self.run(program, args).await?.into_text()
    }
}

/// Read `reader` to EOF, appending every chunk to one accumulator
async fn drain<R>(mut reader: R, stream: &'static str) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut accumulated = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        trace!(stream, bytes = n, "received chunk");
        accumulated.extend_from_slice(&chunk[..n]);
    }

    Ok(accumulated)
}
