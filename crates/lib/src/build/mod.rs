//! Build orchestration.
//!
//! A [`Builder`] runs a validated [`BuildSpec`] through the toolchain:
//! 1. Update the package index (best-effort)
//! 2. Install the target core, if one is declared
//! 3. Install each library in order
//! 4. Create the output directory and compile
//!
//! Install failures end the build. Index update and compile failures are only
//! reported unless [`BuildOptions::strict`] is set.

mod plan;
mod types;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::execute::CommandRunner;
use crate::spec::BuildSpec;
use crate::toolchain::ArduinoCli;

pub use plan::plan_build;
pub use types::{
  BuildError, BuildEvent, BuildOptions, BuildOutcome, BuildPlan, PlannedStep, Reporter, Step, StepFailure,
};

/// Drives the toolchain for one build at a time.
pub struct Builder<R> {
  runner: R,
  toolchain: ArduinoCli,
  options: BuildOptions,
}

impl<R: CommandRunner> Builder<R> {
  pub fn new(runner: R, toolchain: ArduinoCli, options: BuildOptions) -> Self {
    Self {
      runner,
      toolchain,
      options,
    }
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// Compute what [`Builder::run`] would execute, without running anything.
  pub fn plan(&self, spec: &BuildSpec, at: &DateTime<Utc>) -> BuildPlan {
    plan_build(spec, &self.toolchain, &self.options, at)
  }

  /// Run the build for `spec`, stamping the artifact with `at`.
  ///
  /// Steps run strictly one after another. Progress goes to `reporter`.
  ///
  /// # Errors
  ///
  /// Returns the first fatal failure. Later steps are not attempted.
  pub async fn run<P: Reporter>(
    &self,
    spec: &BuildSpec,
    at: &DateTime<Utc>,
    reporter: &mut P,
  ) -> Result<BuildOutcome, BuildError> {
    let plan = self.plan(spec, at);

    info!(
      sketch = %spec.sketch,
      board = %spec.target.board,
      steps = plan.steps.len(),
      strict = self.options.strict,
      "starting build"
    );
    reporter.report(BuildEvent::Started {
      sketch: spec.sketch.clone(),
      board: spec.target.board.clone(),
    });

    let mut outcome = BuildOutcome {
      artifact_name: plan.artifact_name.clone(),
      output_dir: plan.output_dir.clone(),
      index_updated: false,
      core_installed: false,
      libraries_installed: 0,
      compiled: false,
    };

    for planned in &plan.steps {
      if planned.step == Step::Compile {
        reporter.report(BuildEvent::ArtifactPlanned {
          artifact_name: plan.artifact_name.clone(),
          output_dir: plan.output_dir.clone(),
        });
        tokio::fs::create_dir_all(&plan.output_dir)
          .await
          .map_err(|source| BuildError::CreateOutputDir {
            path: plan.output_dir.clone(),
            source,
          })?;
      }

      let result = self.execute(planned, reporter).await;

      match (&planned.step, result) {
        (Step::UpdateIndex, Ok(())) => outcome.index_updated = true,
        (Step::UpdateIndex, Err(failure)) => {
          if self.options.strict {
            return Err(BuildError::IndexUpdate { failure });
          }
          warn!(error = %failure, "package index update failed, continuing");
        }
        (Step::InstallCore(_), Ok(())) => outcome.core_installed = true,
        (Step::InstallCore(core), Err(failure)) => {
          return Err(BuildError::CoreInstall {
            core: core.clone(),
            failure,
          });
        }
        (Step::InstallLibrary(_), Ok(())) => outcome.libraries_installed += 1,
        (Step::InstallLibrary(library), Err(failure)) => {
          return Err(BuildError::LibraryInstall {
            library: library.clone(),
            failure,
          });
        }
        (Step::Compile, Ok(())) => outcome.compiled = true,
        (Step::Compile, Err(failure)) => {
          if self.options.strict {
            return Err(BuildError::Compile {
              sketch: spec.sketch.clone(),
              failure,
            });
          }
          warn!(error = %failure, "compilation failed");
        }
      }

      if planned.step == Step::UpdateIndex && spec.target.core.is_none() {
        warn!("no target core specified, skipping core installation");
        reporter.report(BuildEvent::CoreSkipped);
      }
    }

    info!(
      artifact = %outcome.artifact_name,
      compiled = outcome.compiled,
      "build finished"
    );

    Ok(outcome)
  }

  async fn execute<P: Reporter>(&self, planned: &PlannedStep, reporter: &mut P) -> Result<(), StepFailure> {
    let step = &planned.step;
    reporter.report(BuildEvent::StepStarted { step: step.clone() });

    let result = match self.runner.run(&planned.invocation).await {
      Ok(output) => {
        if step.echoes_stdout() && !output.stdout.is_empty() {
          reporter.report(BuildEvent::Stdout {
            step: step.clone(),
            text: output.stdout.clone(),
          });
        }
        if !output.stderr.is_empty() {
          reporter.report(BuildEvent::Stderr {
            step: step.clone(),
            text: output.stderr.clone(),
          });
        }
        if output.success() {
          Ok(())
        } else {
          Err(StepFailure::Exit { code: output.code })
        }
      }
      Err(err) => {
        warn!(step = %step, error = %err, "failed to start toolchain");
        reporter.report(BuildEvent::SpawnFailed {
          step: step.clone(),
          message: err.to_string(),
        });
        Err(StepFailure::Spawn(err))
      }
    };

    reporter.report(BuildEvent::StepFinished {
      step: step.clone(),
      success: result.is_ok(),
    });

    result
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use chrono::TimeZone;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  use super::*;
  use crate::reference::VersionedRef;
  use crate::spec::{Target, parse_spec};
  use crate::util::testutil::ScriptedRunner;

  fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
  }

  fn minimal() -> BuildSpec {
    BuildSpec {
      sketch: "foo.ino".to_string(),
      target: Target {
        board: "arduino:avr:uno".to_string(),
        url: None,
        core: None,
      },
      libraries: Vec::new(),
      version: None,
    }
  }

  fn with_libraries(names: &[&str]) -> BuildSpec {
    let mut spec = minimal();
    spec.target.core = Some(VersionedRef::new("arduino:avr", None));
    spec.libraries = names.iter().map(|name| VersionedRef::parse(name)).collect();
    spec
  }

  /// Builder writing into a throwaway dist directory.
  fn builder(runner: ScriptedRunner, temp: &TempDir, strict: bool) -> Builder<ScriptedRunner> {
    let options = BuildOptions {
      dist_dir: temp.path().join("dist"),
      strict,
    };
    Builder::new(runner, ArduinoCli::default(), options)
  }

  #[tokio::test]
  async fn minimal_spec_installs_nothing() {
    let temp = TempDir::new().unwrap();
    let builder = builder(ScriptedRunner::new(), &temp, false);
    let mut events = Vec::new();

    let outcome = builder.run(&minimal(), &at(), &mut events).await.unwrap();

    let commands = builder.runner().commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0], "arduino-cli core update-index");
    assert!(commands[1].starts_with("arduino-cli compile -b arduino:avr:uno --output-dir "));
    assert!(commands[1].ends_with("foo_20240101_120000Z.bin foo.ino"));

    assert!(outcome.compiled);
    assert!(outcome.index_updated);
    assert!(!outcome.core_installed);
    assert_eq!(outcome.libraries_installed, 0);
    assert!(events.contains(&BuildEvent::CoreSkipped));
  }

  #[tokio::test]
  async fn creates_output_directory() {
    let temp = TempDir::new().unwrap();
    let builder = builder(ScriptedRunner::new(), &temp, false);

    let outcome = builder.run(&minimal(), &at(), &mut Vec::new()).await.unwrap();

    assert_eq!(
      outcome.output_dir,
      temp.path().join("dist").join("foo_20240101_120000Z.bin")
    );
    assert!(outcome.output_dir.is_dir());
  }

  #[tokio::test]
  async fn existing_output_directory_is_fine() {
    let temp = TempDir::new().unwrap();
    let existing = temp.path().join("dist").join("foo_20240101_120000Z.bin");
    std::fs::create_dir_all(&existing).unwrap();
    let builder = builder(ScriptedRunner::new(), &temp, false);

    let outcome = builder.run(&minimal(), &at(), &mut Vec::new()).await.unwrap();

    assert!(outcome.compiled);
  }

  #[tokio::test]
  async fn output_directory_failure_is_fatal() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("dist"), "not a directory").unwrap();
    let builder = builder(ScriptedRunner::new(), &temp, false);

    let err = builder.run(&minimal(), &at(), &mut Vec::new()).await.unwrap_err();

    assert!(matches!(err, BuildError::CreateOutputDir { .. }));
    assert!(!builder.runner().commands().iter().any(|c| c.contains("compile")));
  }

  #[tokio::test]
  async fn full_spec_runs_steps_in_order() {
    let spec = parse_spec(
      r#"
sketch: blink.ino
version: "2.1"
target:
  board: esp32:esp32:esp32
  url: https://example.com/index.json
  core: esp32:esp32==2.0.11
libraries:
  - ArduinoJson==6.21.3
  - PubSubClient
"#,
    )
    .unwrap()
    .validate()
    .unwrap();
    let temp = TempDir::new().unwrap();
    let builder = builder(ScriptedRunner::new(), &temp, false);

    let outcome = builder.run(&spec, &at(), &mut Vec::new()).await.unwrap();

    let commands = builder.runner().commands();
    assert_eq!(
      &commands[..4],
      [
        "arduino-cli core update-index --additional-urls https://example.com/index.json",
        "arduino-cli core install esp32:esp32@2.0.11 --additional-urls https://example.com/index.json",
        "arduino-cli lib install ArduinoJson@6.21.3",
        "arduino-cli lib install PubSubClient",
      ]
    );
    assert!(commands[4].contains("blink_v2_1_20240101_120000Z.bin"));
    assert_eq!(outcome.artifact_name, "blink_v2_1_20240101_120000Z.bin");
    assert!(outcome.core_installed);
    assert_eq!(outcome.libraries_installed, 2);
  }

  #[tokio::test]
  async fn library_failure_short_circuits() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new().fail_on("lib install Second");
    let builder = builder(runner, &temp, false);

    let err = builder
      .run(&with_libraries(&["First", "Second", "Third"]), &at(), &mut Vec::new())
      .await
      .unwrap_err();

    match err {
      BuildError::LibraryInstall { library, failure } => {
        assert_eq!(library.name, "Second");
        assert!(matches!(failure, StepFailure::Exit { code: Some(1) }));
      }
      other => panic!("unexpected error: {other}"),
    }

    let commands = builder.runner().commands();
    assert!(commands.iter().any(|c| c == "arduino-cli lib install First"));
    assert!(commands.iter().any(|c| c == "arduino-cli lib install Second"));
    assert!(!commands.iter().any(|c| c.contains("Third")));
    assert!(!commands.iter().any(|c| c.contains("compile")));
  }

  #[tokio::test]
  async fn core_failure_skips_libraries() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new().fail_on("core install");
    let builder = builder(runner, &temp, false);
    let mut events = Vec::new();

    let err = builder
      .run(&with_libraries(&["First"]), &at(), &mut events)
      .await
      .unwrap_err();

    assert!(matches!(err, BuildError::CoreInstall { .. }));
    assert_eq!(builder.runner().call_count(), 2);
    assert!(events.contains(&BuildEvent::StepFinished {
      step: Step::InstallCore(VersionedRef::new("arduino:avr", None)),
      success: false,
    }));
  }

  #[tokio::test]
  async fn install_spawn_error_is_fatal() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new().spawn_error_on("lib install");
    let builder = builder(runner, &temp, false);

    let err = builder
      .run(&with_libraries(&["First"]), &at(), &mut Vec::new())
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      BuildError::LibraryInstall {
        failure: StepFailure::Spawn(_),
        ..
      }
    ));
  }

  #[tokio::test]
  async fn index_failure_is_best_effort() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new().fail_on("update-index");
    let builder = builder(runner, &temp, false);

    let outcome = builder.run(&minimal(), &at(), &mut Vec::new()).await.unwrap();

    assert!(!outcome.index_updated);
    assert!(outcome.compiled);
  }

  #[tokio::test]
  async fn index_failure_is_fatal_when_strict() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new().fail_on("update-index");
    let builder = builder(runner, &temp, true);

    let err = builder.run(&minimal(), &at(), &mut Vec::new()).await.unwrap_err();

    assert!(matches!(err, BuildError::IndexUpdate { .. }));
    assert_eq!(builder.runner().call_count(), 1);
  }

  #[tokio::test]
  async fn compile_failure_is_reported_not_fatal() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new().fail_on("compile");
    let builder = builder(runner, &temp, false);
    let mut events = Vec::new();

    let outcome = builder.run(&minimal(), &at(), &mut events).await.unwrap();

    assert!(!outcome.compiled);
    assert!(events.contains(&BuildEvent::StepFinished {
      step: Step::Compile,
      success: false,
    }));
  }

  #[tokio::test]
  async fn compile_failure_is_fatal_when_strict() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new().fail_on("compile");
    let builder = builder(runner, &temp, true);

    let err = builder.run(&minimal(), &at(), &mut Vec::new()).await.unwrap_err();

    assert!(matches!(err, BuildError::Compile { .. }));
    assert_eq!(err.to_string(), "failed to compile foo.ino");
  }

  #[tokio::test]
  async fn stdout_only_echoed_for_compile() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new()
      .stdout_on("update-index", "Downloading index...")
      .stdout_on("compile", "Sketch uses 924 bytes");
    let builder = builder(runner, &temp, false);
    let mut events = Vec::new();

    builder.run(&minimal(), &at(), &mut events).await.unwrap();

    let stdout: Vec<&BuildEvent> = events
      .iter()
      .filter(|e| matches!(e, BuildEvent::Stdout { .. }))
      .collect();
    assert_eq!(
      stdout,
      [&BuildEvent::Stdout {
        step: Step::Compile,
        text: "Sketch uses 924 bytes".to_string(),
      }]
    );
  }

  #[tokio::test]
  async fn stderr_echoed_for_every_step() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new().fail_on("update-index");
    let builder = builder(runner, &temp, false);
    let mut events = Vec::new();

    builder.run(&minimal(), &at(), &mut events).await.unwrap();

    assert!(events.contains(&BuildEvent::Stderr {
      step: Step::UpdateIndex,
      text: "Error: update-index failed".to_string(),
    }));
  }

  #[tokio::test]
  async fn events_follow_step_order() {
    let temp = TempDir::new().unwrap();
    let builder = builder(ScriptedRunner::new(), &temp, false);
    let mut events = Vec::new();

    builder.run(&minimal(), &at(), &mut events).await.unwrap();

    assert_eq!(
      events[0],
      BuildEvent::Started {
        sketch: "foo.ino".to_string(),
        board: "arduino:avr:uno".to_string(),
      }
    );
    let planned = events
      .iter()
      .position(|e| matches!(e, BuildEvent::ArtifactPlanned { .. }))
      .unwrap();
    let compile_started = events
      .iter()
      .position(|e| *e == BuildEvent::StepStarted { step: Step::Compile })
      .unwrap();
    assert!(planned < compile_started);
    assert_eq!(
      events.last(),
      Some(&BuildEvent::StepFinished {
        step: Step::Compile,
        success: true,
      })
    );
  }

  #[tokio::test]
  async fn core_skipped_after_index_update() {
    let temp = TempDir::new().unwrap();
    let builder = builder(ScriptedRunner::new(), &temp, false);
    let mut events = Vec::new();

    builder.run(&minimal(), &at(), &mut events).await.unwrap();

    let index_finished = events
      .iter()
      .position(|e| matches!(e, BuildEvent::StepFinished { step: Step::UpdateIndex, .. }))
      .unwrap();
    let skipped = events.iter().position(|e| *e == BuildEvent::CoreSkipped).unwrap();
    let compile_planned = events
      .iter()
      .position(|e| matches!(e, BuildEvent::ArtifactPlanned { .. }))
      .unwrap();
    assert_eq!(skipped, index_finished + 1);
    assert!(skipped < compile_planned);
  }

  #[tokio::test]
  async fn core_not_skipped_when_declared() {
    let temp = TempDir::new().unwrap();
    let builder = builder(ScriptedRunner::new(), &temp, false);
    let mut events = Vec::new();

    builder.run(&with_libraries(&[]), &at(), &mut events).await.unwrap();

    assert!(!events.contains(&BuildEvent::CoreSkipped));
  }

  #[tokio::test]
  #[traced_test]
  async fn missing_core_logs_warning() {
    let temp = TempDir::new().unwrap();
    let builder = builder(ScriptedRunner::new(), &temp, false);

    builder.run(&minimal(), &at(), &mut Vec::new()).await.unwrap();

    assert!(logs_contain("skipping core installation"));
  }

  #[test]
  fn plan_matches_run_order() {
    let builder = Builder::new(ScriptedRunner::new(), ArduinoCli::default(), BuildOptions::default());

    let plan = builder.plan(&with_libraries(&["First"]), &at());

    let steps: Vec<Step> = plan.steps.into_iter().map(|s| s.step).collect();
    assert_eq!(
      steps,
      [
        Step::UpdateIndex,
        Step::InstallCore(VersionedRef::new("arduino:avr", None)),
        Step::InstallLibrary(VersionedRef::new("First", None)),
        Step::Compile,
      ]
    );
    assert_eq!(plan.output_dir, PathBuf::from("dist").join("foo_20240101_120000Z.bin"));
  }
}
