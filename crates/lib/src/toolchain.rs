//! arduino-cli command lines for each build step.
//!
//! Only builds [`Invocation`]s; running them is the runner's job.

use std::path::Path;

use crate::consts::DEFAULT_TOOL;
use crate::execute::Invocation;
use crate::reference::VersionedRef;

/// Builder for arduino-cli invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArduinoCli {
  program: String,
}

impl Default for ArduinoCli {
  fn default() -> Self {
    Self::new(DEFAULT_TOOL)
  }
}

impl ArduinoCli {
  /// Use `program` (a name resolved through `PATH`, or a path) as the tool.
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  fn command(&self) -> Invocation {
    Invocation::new(&self.program)
  }

  /// `core update-index [--additional-urls <url>]`
  pub fn update_index(&self, url: Option<&str>) -> Invocation {
    with_additional_url(self.command().args(["core", "update-index"]), url)
  }

  /// `core install <name>[@<version>] [--additional-urls <url>]`
  pub fn install_core(&self, core: &VersionedRef, url: Option<&str>) -> Invocation {
    with_additional_url(
      self.command().args(["core", "install"]).arg(core.install_arg()),
      url,
    )
  }

  /// `lib install <name>[@<version>]`
  pub fn install_lib(&self, lib: &VersionedRef) -> Invocation {
    self.command().args(["lib", "install"]).arg(lib.install_arg())
  }

  /// `compile -b <board> --output-dir <dir> <sketch>`
  pub fn compile(&self, board: &str, output_dir: &Path, sketch: &str) -> Invocation {
    self
      .command()
      .args(["compile", "-b", board, "--output-dir"])
      .arg(output_dir.to_string_lossy())
      .arg(sketch)
  }
}

fn with_additional_url(invocation: Invocation, url: Option<&str>) -> Invocation {
  match url {
    Some(url) => invocation.arg("--additional-urls").arg(url),
    None => invocation,
  }
}
