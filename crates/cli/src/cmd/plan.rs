//! Implementation of the `inoforge plan` command.
//!
//! Shows the toolchain commands a build would run, without running them.

use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;

use inoforge_lib::build::plan_build;
use inoforge_lib::spec::load_spec;

use super::ProjectConfig;
use crate::output::{print_error, symbols};

/// Execute the plan command.
///
/// Validates the spec exactly as `build` does, so a spec that plans cleanly
/// gets past validation when built. Nothing is spawned and no directories are
/// created.
pub fn cmd_plan(config: &ProjectConfig) -> Result<ExitCode> {
  let spec = match load_spec(&config.spec) {
    Ok(spec) => spec,
    Err(e) => {
      print_error(&e.to_string());
      return Ok(ExitCode::FAILURE);
    }
  };

  let plan = plan_build(&spec, &config.toolchain(), &config.build_options(), &Utc::now());

  println!("Plan for {} ({})", spec.sketch.cyan(), spec.target.board);
  for (index, planned) in plan.steps.iter().enumerate() {
    println!(
      "  {}. {} {}",
      index + 1,
      format!("[{}]", planned.step).dimmed(),
      planned.invocation
    );
  }
  println!(
    "  {} Output: {}",
    symbols::ARROW.green(),
    plan.output_dir.display()
  );

  Ok(ExitCode::SUCCESS)
}
