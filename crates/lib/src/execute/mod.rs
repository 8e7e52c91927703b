//! External command execution.
//!
//! Every toolchain call goes through the [`CommandRunner`] trait. The build
//! orchestrator only ever sees an [`Invocation`] going in and a
//! [`CommandOutput`] coming back, so tests can script the toolchain instead of
//! installing one.

pub mod process;
pub mod types;

pub use process::ProcessRunner;
pub use types::{CommandOutput, CommandRunner, Invocation, RunError};
