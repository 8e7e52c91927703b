//! Types for running external commands.

use std::fmt;
use std::future::Future;
use std::io;

use thiserror::Error;

/// A single external program call: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }
}

impl fmt::Display for Invocation {
  /// Renders the call the way it would be typed in a POSIX shell.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", quote(&self.program))?;
    for arg in &self.args {
      write!(f, " {}", quote(arg))?;
    }
    Ok(())
  }
}

fn quote(word: &str) -> String {
  let plain = !word.is_empty()
    && word
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || "-_./:=@+,%".contains(c));
  if plain {
    word.to_string()
  } else {
    format!("'{}'", word.replace('\'', r"'\''"))
  }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  /// Exit code, `None` if the process was killed by a signal.
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  /// A process counts as successful only when it exits with code zero.
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Errors raised before a process produced any output.
#[derive(Debug, Error)]
pub enum RunError {
  /// The program could not be started (missing, not executable, ...).
  #[error("failed to start {program}: {source}")]
  Spawn { program: String, source: io::Error },
}

/// Runs invocations to completion, one at a time.
///
/// Implementations must not return until the process has exited. A non-zero
/// exit is not an error at this level; it is reported through
/// [`CommandOutput::success`].
pub trait CommandRunner {
  fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<CommandOutput, RunError>>;
}
