use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use inoforge_lib::consts::{DEFAULT_TOOL, DIST_DIR, SPEC_FILENAME, TOOL_ENV};

mod cmd;
mod output;

use cmd::{ProjectConfig, cmd_build, cmd_plan};

/// inoforge - Provision an Arduino toolchain and compile a sketch from project.yaml
#[derive(Parser)]
#[command(name = "inoforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(flatten)]
  project: ProjectArgs,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Args)]
struct ProjectArgs {
  /// Path to the build specification
  #[arg(short, long, global = true, default_value = SPEC_FILENAME)]
  spec: PathBuf,

  /// arduino-cli binary to drive
  #[arg(long = "cli", global = true, env = TOOL_ENV, default_value = DEFAULT_TOOL)]
  tool: String,

  /// Directory compiled artifacts are written under
  #[arg(long, global = true, default_value = DIST_DIR)]
  dist_dir: PathBuf,

  /// Fail when the package index update or compilation fails
  #[arg(long, global = true)]
  strict: bool,
}

#[derive(Subcommand)]
enum Commands {
  /// Install the core and libraries, then compile the sketch (default)
  Build,

  /// Show the toolchain commands a build would run
  Plan,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "error" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config = ProjectConfig {
    spec: cli.project.spec,
    tool: cli.project.tool,
    dist_dir: cli.project.dist_dir,
    strict: cli.project.strict,
  };

  let result = match cli.command.unwrap_or(Commands::Build) {
    Commands::Build => cmd_build(&config),
    Commands::Plan => cmd_plan(&config),
  };

  match result {
    Ok(code) => code,
    Err(e) => {
      output::print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
