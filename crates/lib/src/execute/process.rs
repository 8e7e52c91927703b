//! Runner that spawns real processes.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::execute::types::{CommandOutput, CommandRunner, Invocation, RunError};

/// Spawns each invocation as a child process and waits for it to exit.
///
/// The child inherits the caller's environment and working directory. Stdin
/// is closed so a tool that prompts fails instead of hanging on input.
/// Stdout and stderr are captured in full and decoded lossily.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
  pub fn new() -> Self {
    Self
  }
}

impl CommandRunner for ProcessRunner {
  async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunError> {
    info!(cmd = %invocation, "executing command");

    let output = Command::new(&invocation.program)
      .args(&invocation.args)
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|source| RunError::Spawn {
        program: invocation.program.clone(),
        source,
      })?;

    let result = CommandOutput {
      code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    debug!(code = ?result.code, "command exited");
    if !result.stdout.is_empty() {
      debug!(stdout = %result.stdout.trim_end(), "command stdout");
    }
    if !result.stderr.is_empty() {
      debug!(stderr = %result.stderr.trim_end(), "command stderr");
    }

    Ok(result)
  }
}
