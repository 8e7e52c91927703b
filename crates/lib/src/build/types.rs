//! Types for build orchestration.
//!
//! This module defines the options, progress events, outcome and error types
//! shared by [`super::Builder`] and its callers.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::consts::DIST_DIR;
use crate::execute::{Invocation, RunError};
use crate::reference::VersionedRef;

/// Configuration for a build run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Directory artifacts are written under.
  pub dist_dir: PathBuf,
  /// Treat index update and compile failures as fatal.
  pub strict: bool,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      dist_dir: PathBuf::from(DIST_DIR),
      strict: false,
    }
  }
}

/// One toolchain call in a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  UpdateIndex,
  InstallCore(VersionedRef),
  InstallLibrary(VersionedRef),
  Compile,
}

impl Step {
  /// Whether the step's stdout is shown to the user.
  pub fn echoes_stdout(&self) -> bool {
    matches!(self, Step::Compile)
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Step::UpdateIndex => write!(f, "package index update"),
      Step::InstallCore(core) => write!(f, "core {}", core),
      Step::InstallLibrary(lib) => write!(f, "library {}", lib),
      Step::Compile => write!(f, "compilation"),
    }
  }
}

/// A step paired with the exact command it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
  pub step: Step,
  pub invocation: Invocation,
}

/// Everything a build will do, computed up front from the spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
  /// Steps in execution order.
  pub steps: Vec<PlannedStep>,
  /// File name of the artifact, e.g. `blink_v1_0_20240101_120000Z.bin`.
  pub artifact_name: String,
  /// Directory passed to `--output-dir`.
  pub output_dir: PathBuf,
}

/// Progress notifications emitted while a build runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
  /// The build is about to start.
  Started { sketch: String, board: String },
  /// No core was declared, so none will be installed.
  CoreSkipped,
  StepStarted { step: Step },
  /// Stdout of a step that echoes it. Only sent when non-empty.
  Stdout { step: Step, text: String },
  /// Stderr of any step. Only sent when non-empty.
  Stderr { step: Step, text: String },
  /// The step's process could not be started.
  SpawnFailed { step: Step, message: String },
  StepFinished { step: Step, success: bool },
  /// The artifact location was decided, just before compiling.
  ArtifactPlanned { artifact_name: String, output_dir: PathBuf },
}

/// Receives [`BuildEvent`]s as they happen.
pub trait Reporter {
  fn report(&mut self, event: BuildEvent);
}

impl Reporter for Vec<BuildEvent> {
  fn report(&mut self, event: BuildEvent) {
    self.push(event);
  }
}

/// Summary of a build that ran to the end.
///
/// A build can reach the end without compiling successfully when it is not
/// strict; check [`BuildOutcome::compiled`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
  pub artifact_name: String,
  pub output_dir: PathBuf,
  pub index_updated: bool,
  pub core_installed: bool,
  pub libraries_installed: usize,
  pub compiled: bool,
}

/// Why a single step did not succeed.
#[derive(Debug, Error)]
pub enum StepFailure {
  #[error("{}", describe_exit(.code))]
  Exit { code: Option<i32> },

  #[error(transparent)]
  Spawn(#[from] RunError),
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exited with code {}", code),
    None => "terminated by signal".to_string(),
  }
}

/// Errors that end a build early.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("failed to update package index")]
  IndexUpdate {
    #[source]
    failure: StepFailure,
  },

  #[error("failed to install core {core}")]
  CoreInstall {
    core: VersionedRef,
    #[source]
    failure: StepFailure,
  },

  #[error("failed to install library {library}")]
  LibraryInstall {
    library: VersionedRef,
    #[source]
    failure: StepFailure,
  },

  #[error("failed to create output directory {}: {source}", path.display())]
  CreateOutputDir { path: PathBuf, source: io::Error },

  #[error("failed to compile {sketch}")]
  Compile {
    sketch: String,
    #[source]
    failure: StepFailure,
  },
}
