//! Implementation of the `inoforge build` command.
//!
//! Loads `project.yaml`, provisions the toolchain and compiles the sketch.

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

use inoforge_lib::build::Builder;
use inoforge_lib::execute::ProcessRunner;
use inoforge_lib::spec::load_spec;

use super::ProjectConfig;
use crate::output::{ConsoleReporter, format_duration, print_error, print_stat};

/// Execute the build command.
///
/// Validation and install failures exit with status 1. A failed index update
/// or compilation still exits 0 unless `strict` is set.
///
/// # Errors
///
/// Returns an error only if the async runtime cannot be created. Build
/// failures are reported and turned into an exit code.
pub fn cmd_build(config: &ProjectConfig) -> Result<ExitCode> {
  let start = Instant::now();

  let spec = match load_spec(&config.spec) {
    Ok(spec) => spec,
    Err(e) => {
      print_error(&e.to_string());
      return Ok(ExitCode::FAILURE);
    }
  };
  debug!(?spec, "loaded specification");

  let builder = Builder::new(ProcessRunner::new(), config.toolchain(), config.build_options());
  let mut reporter = ConsoleReporter::new(config.strict);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt.block_on(builder.run(&spec, &Utc::now(), &mut reporter));

  match result {
    Ok(outcome) => {
      println!();
      print_stat("Artifact", &outcome.output_dir.display().to_string());
      print_stat("Libraries installed", &outcome.libraries_installed.to_string());
      print_stat("Duration", &format_duration(start.elapsed()));
      Ok(ExitCode::SUCCESS)
    }
    Err(e) => {
      print_error(&format!("{:#}", anyhow::Error::new(e)));
      Ok(ExitCode::FAILURE)
    }
  }
}
