//! `git status` runner
//!
//! Runs `git status` in the caller's working directory with the caller's
//! environment and hands back whatever git printed.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::host::{CommandError, CommandRunner};

/// Executable invoked by [`git_status`]
pub const GIT_PROGRAM: &str = "git";

/// Arguments passed to [`GIT_PROGRAM`]
pub const STATUS_ARGS: &[&str] = &["status"];

/// Run `git status` and return its stdout verbatim.
///
/// Fails with [`CommandError::Failed`] when git exits non-zero; the error's
/// message is exactly what git wrote to stderr. A missing `git` binary is
/// reported as [`CommandError::BinaryNotFound`] instead.
pub async fn git_status() -> Result<String, CommandError> {
    GitStatus::default().run().await
}

/// A `git status` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitStatus {
    /// Program to execute
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Working directory; inherited when `None`
    pub working_directory: Option<PathBuf>,
}

impl Default for GitStatus {
    fn default() -> Self {
        Self {
            program: GIT_PROGRAM.to_string(),
            args: STATUS_ARGS.iter().map(|s| s.to_string()).collect(),
            working_directory: None,
        }
    }
}

impl GitStatus {
    /// Use a different git executable (a path or a name on PATH)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Query a repository other than the current directory
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    fn runner(&self) -> CommandRunner {
        match &self.working_directory {
            Some(dir) => CommandRunner::new().with_working_directory(dir),
            None => CommandRunner::new(),
        }
    }

    /// Execute the invocation
    pub async fn run(&self) -> Result<String, CommandError> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();

        debug!(program = %self.program, ?args, "running git status");
        let result = self.runner().output_text(&self.program, &args).await;

        if let Err(e) = &result {
            match e {
                CommandError::Failed { code, .. } => warn!(?code, "git status failed"),
                other => warn!(error = %other, "could not run git status"),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_plain_git_status() {
        let status = GitStatus::default();
        assert_eq!(status.program, "git");
        assert_eq!(status.args, vec!["status".to_string()]);
        assert!(status.working_directory.is_none());
    }

    #[test]
    fn test_builders() {
        let status = GitStatus::default()
            .with_program("/usr/local/bin/git")
            .with_working_directory("/tmp/repo");
        assert_eq!(status.program, "/usr/local/bin/git");
        assert_eq!(status.args, vec!["status".to_string()]);
        assert_eq!(status.working_directory, Some(PathBuf::from("/tmp/repo")));
    }

    #[tokio::test]
    async fn test_missing_git_binary() {
        let err = GitStatus::default()
            .with_program("gitstat-missing-git-binary")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::BinaryNotFound(_)));
    }

    #[tokio::test]
    async fn test_git_status_entry_point() {
        let result = git_status().await;

        if CommandRunner::which(GIT_PROGRAM).is_none() {
            assert!(matches!(result, Err(CommandError::BinaryNotFound(_))));
            return;
        }

        // Inside or outside a checkout, git itself must have run.
        match result {
            Ok(_) => {}
            Err(CommandError::Failed { code, stderr }) => {
                assert!(code.is_some_and(|c| c != 0));
                assert!(!stderr.is_empty());
            }
            Err(other) => panic!("git did not run: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_real_git_outside_a_repository() {
        if CommandRunner::which(GIT_PROGRAM).is_none() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        if dir.path().ancestors().skip(1).any(|p| p.join(".git").exists()) {
            return;
        }

        let err = GitStatus::default()
            .with_working_directory(dir.path())
            .run()
            .await
            .unwrap_err();
        match err {
            CommandError::Failed { code, ref stderr } => {
                assert_eq!(code, Some(128));
                assert!(!stderr.is_empty());
                assert_eq!(err.to_string(), *stderr);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_repository_directory() {
        let err = GitStatus::default()
            .with_working_directory("/nonexistent/gitstat-repo")
            .run()
            .await
            .unwrap_err();
        assert!(!matches!(err, CommandError::BinaryNotFound(_)));
    }

    /// Stands in for git with a shell script that receives `status` as `$1`.
    #[cfg(unix)]
    mod mock_git {
        use super::*;
        use std::fs;
        use tempfile::TempDir;

        fn fake_git(script_body: &str) -> (TempDir, GitStatus) {
            let dir = tempfile::tempdir().unwrap();
            let script = dir.path().join("git.sh");
            fs::write(&script, script_body).unwrap();

            let mut status = GitStatus::default().with_program("sh");
            status.args.insert(0, script.to_string_lossy().into_owned());
            (dir, status)
        }

        #[tokio::test]
        async fn test_clean_tree() {
            let (_dir, git) = fake_git(
                "[ \"$1\" = status ] || exit 99\nprintf 'On branch main\\nnothing to commit\\n'",
            );
            let text = git.run().await.unwrap();
            assert_eq!(text, "On branch main\nnothing to commit\n");
        }

        #[tokio::test]
        async fn test_not_a_repository() {
            let (_dir, git) = fake_git("printf 'fatal: not a git repository\\n' >&2\nexit 128");
            let err = git.run().await.unwrap_err();
            assert_eq!(err.to_string(), "fatal: not a git repository\n");
            assert!(matches!(err, CommandError::Failed { code: Some(128), .. }));
        }

        #[tokio::test]
        async fn test_silent_failure() {
            let (_dir, git) = fake_git("exit 1");
            let err = git.run().await.unwrap_err();
            assert_eq!(err.to_string(), "");
        }

        #[tokio::test]
        async fn test_silent_success() {
            let (_dir, git) = fake_git("exit 0");
            assert_eq!(git.run().await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_runs_in_working_directory() {
            let (_dir, git) = fake_git("pwd -P");
            let repo = tempfile::tempdir().unwrap();
            let text = git
                .with_working_directory(repo.path())
                .run()
                .await
                .unwrap();
            assert_eq!(
                PathBuf::from(text.trim_end()),
                repo.path().canonicalize().unwrap()
            );
        }

        #[tokio::test]
        async fn test_concurrent_invocations_are_independent() {
            let (_a, clean) = fake_git("sleep 0.05\nprintf clean");
            let (_b, broken) = fake_git("sleep 0.02\nprintf broken >&2\nexit 2");

            let (ok, err) = tokio::join!(clean.run(), broken.run());

            assert_eq!(ok.unwrap(), "clean");
            assert_eq!(err.unwrap_err().to_string(), "broken");
        }
    }
}
