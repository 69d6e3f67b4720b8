//! Git invocations built on the host command runner

pub mod status;

pub use status::{git_status, GitStatus, GIT_PROGRAM, STATUS_ARGS};
