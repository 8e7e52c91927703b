//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, duration formatting, and the console renderer for build progress.

use std::io::{self, Write};
use std::time::Duration;

use owo_colors::{OwoColorize, Stream};

use inoforge_lib::build::{BuildEvent, Reporter, Step};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Prefix for echoed toolchain stdout.
pub const STDOUT_PREFIX: &str = "> ";

/// Prefix for echoed toolchain stderr.
pub const STDERR_PREFIX: &str = "ERROR > ";

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

/// Prefix every line of `text`, dropping a trailing newline.
pub fn prefix_lines(prefix: &str, text: &str) -> String {
  text
    .trim_end_matches(['\r', '\n'])
    .lines()
    .map(|line| format!("{}{}", prefix, line))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// Renders build progress as human-readable lines.
///
/// Installs print `Installing <ref>... ` and finish the same line with
/// `Done!` or `Failed!`. Stderr received while that line is open is held back
/// and printed after the result.
pub struct ConsoleReporter {
  strict: bool,
  /// Set while an install line is waiting for its result.
  held_stderr: Option<Vec<String>>,
}

impl ConsoleReporter {
  pub fn new(strict: bool) -> Self {
    Self {
      strict,
      held_stderr: None,
    }
  }

  fn stderr_line(&mut self, line: String) {
    match &mut self.held_stderr {
      Some(held) => held.push(line),
      None => eprintln!("{}", line),
    }
  }

  fn finish_install(&mut self, success: bool) {
    if success {
      println!("{}", "Done!".if_supports_color(Stream::Stdout, |s| s.green()));
    } else {
      println!("{}", "Failed!".if_supports_color(Stream::Stdout, |s| s.red()));
    }
    for line in self.held_stderr.take().unwrap_or_default() {
      eprintln!("{}", line);
    }
  }
}

impl Reporter for ConsoleReporter {
  fn report(&mut self, event: BuildEvent) {
    match event {
      BuildEvent::Started { sketch, board } => {
        print_info(&format!("Compiling {} for board type {}", sketch, board));
      }
      BuildEvent::CoreSkipped => {
        print_warning("Target core not specified, skipping core installation");
      }
      BuildEvent::StepStarted { step } => match step {
        Step::UpdateIndex => print_info("Updating package index..."),
        Step::InstallCore(_) | Step::InstallLibrary(_) => {
          print!(
            "{} Installing {}... ",
            symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
            step
          );
          let _ = io::stdout().flush();
          self.held_stderr = Some(Vec::new());
        }
        Step::Compile => {}
      },
      BuildEvent::Stdout { text, .. } => println!("{}", prefix_lines(STDOUT_PREFIX, &text)),
      BuildEvent::Stderr { text, .. } => self.stderr_line(prefix_lines(STDERR_PREFIX, &text)),
      BuildEvent::SpawnFailed { message, .. } => self.stderr_line(format!(
        "{} {}",
        symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
        message.if_supports_color(Stream::Stderr, |s| s.red())
      )),
      BuildEvent::StepFinished { step, success } => match (step, success) {
        (Step::UpdateIndex, true) => print_success("Package index updated"),
        (Step::UpdateIndex, false) if self.strict => print_error("Package index update failed!"),
        (Step::UpdateIndex, false) => print_warning("Package index update failed, continuing"),
        (Step::Compile, true) => print_success("Compilation completed!"),
        (Step::Compile, false) => print_error("Compilation failed!"),
        (Step::InstallCore(_) | Step::InstallLibrary(_), success) => self.finish_install(success),
      },
      BuildEvent::ArtifactPlanned { artifact_name, .. } => {
        print_info(&format!("Sketch will be compiled to {}...", artifact_name));
      }
    }
  }
}
