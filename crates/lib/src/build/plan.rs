//! Build planning: turn a validated spec into the ordered list of toolchain calls.

use chrono::{DateTime, Utc};

use crate::artifact::{artifact_name, build_stamp, output_dir};
use crate::build::types::{BuildOptions, BuildPlan, PlannedStep, Step};
use crate::spec::BuildSpec;
use crate::toolchain::ArduinoCli;

/// Compute the plan for `spec`, stamping the artifact with `at`.
///
/// Order is fixed: index update, core (if declared), libraries in declaration
/// order, compile.
pub fn plan_build(spec: &BuildSpec, toolchain: &ArduinoCli, options: &BuildOptions, at: &DateTime<Utc>) -> BuildPlan {
  let url = spec.target.url.as_deref();
  let mut steps = Vec::with_capacity(spec.libraries.len() + 3);

  steps.push(PlannedStep {
    step: Step::UpdateIndex,
    invocation: toolchain.update_index(url),
  });

  if let Some(core) = &spec.target.core {
    steps.push(PlannedStep {
      step: Step::InstallCore(core.clone()),
      invocation: toolchain.install_core(core, url),
    });
  }

  for lib in &spec.libraries {
    steps.push(PlannedStep {
      step: Step::InstallLibrary(lib.clone()),
      invocation: toolchain.install_lib(lib),
    });
  }

  let artifact_name = artifact_name(&spec.sketch, spec.version.as_deref(), &build_stamp(at));
  let output_dir = output_dir(&options.dist_dir, &artifact_name);

  steps.push(PlannedStep {
    step: Step::Compile,
    invocation: toolchain.compile(&spec.target.board, &output_dir, &spec.sketch),
  });

  BuildPlan {
    steps,
    artifact_name,
    output_dir,
  }
}
