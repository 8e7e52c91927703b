//! Test utilities for inoforge-lib.
//!
//! [`ScriptedRunner`] stands in for arduino-cli: it records every invocation
//! and answers from a small rule table instead of spawning anything.

use std::cell::RefCell;
use std::io;

use crate::execute::{CommandOutput, CommandRunner, Invocation, RunError};

enum Response {
  Exit { code: i32, stdout: String, stderr: String },
  SpawnError,
}

/// A fake runner that succeeds unless a rule says otherwise.
///
/// Rules match on a substring of the rendered command line; the first match
/// wins.
#[derive(Default)]
pub struct ScriptedRunner {
  rules: Vec<(String, Response)>,
  calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Exit with code 1 and an error on stderr when the command contains `pattern`.
  pub fn fail_on(mut self, pattern: &str) -> Self {
    self.rules.push((
      pattern.to_string(),
      Response::Exit {
        code: 1,
        stdout: String::new(),
        stderr: format!("Error: {} failed", pattern),
      },
    ));
    self
  }

  /// Succeed with the given stdout when the command contains `pattern`.
  pub fn stdout_on(mut self, pattern: &str, stdout: &str) -> Self {
    self.rules.push((
      pattern.to_string(),
      Response::Exit {
        code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
      },
    ));
    self
  }

  /// Fail to start the process when the command contains `pattern`.
  pub fn spawn_error_on(mut self, pattern: &str) -> Self {
    self.rules.push((pattern.to_string(), Response::SpawnError));
    self
  }

  /// Every invocation seen so far, rendered as command lines.
  pub fn commands(&self) -> Vec<String> {
    self.calls.borrow().iter().map(ToString::to_string).collect()
  }

  pub fn call_count(&self) -> usize {
    self.calls.borrow().len()
  }
}

impl CommandRunner for ScriptedRunner {
  async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunError> {
    self.calls.borrow_mut().push(invocation.clone());

    let rendered = invocation.to_string();
    let rule = self.rules.iter().find(|(pattern, _)| rendered.contains(pattern.as_str()));

    match rule {
      None => Ok(CommandOutput {
        code: Some(0),
        ..Default::default()
      }),
      Some((_, Response::Exit { code, stdout, stderr })) => Ok(CommandOutput {
        code: Some(*code),
        stdout: stdout.clone(),
        stderr: stderr.clone(),
      }),
      Some((_, Response::SpawnError)) => Err(RunError::Spawn {
        program: invocation.program.clone(),
        source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
      }),
    }
  }
}
