mod build;
mod plan;

use std::path::PathBuf;

use inoforge_lib::build::BuildOptions;
use inoforge_lib::toolchain::ArduinoCli;

pub use build::cmd_build;
pub use plan::cmd_plan;

/// Settings shared by every command, resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
  /// Path to the build specification.
  pub spec: PathBuf,
  /// arduino-cli binary to drive.
  pub tool: String,
  /// Directory compiled artifacts are written under.
  pub dist_dir: PathBuf,
  /// Treat index update and compile failures as fatal.
  pub strict: bool,
}

impl ProjectConfig {
  pub fn toolchain(&self) -> ArduinoCli {
    ArduinoCli::new(&self.tool)
  }

  pub fn build_options(&self) -> BuildOptions {
    BuildOptions {
      dist_dir: self.dist_dir.clone(),
      strict: self.strict,
    }
  }
}
