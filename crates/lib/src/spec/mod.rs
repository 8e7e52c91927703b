//! Build specification loading and validation.
//!
//! A specification is read from `project.yaml`, parsed into a [`RawSpec`] and
//! then validated into a [`BuildSpec`]. Validation happens before any external
//! tool is touched, so a broken spec never leaves a half-provisioned toolchain
//! behind.

mod types;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::reference::VersionedRef;

pub use types::{BuildSpec, RawSpec, RawTarget, Scalar, Target};

/// Errors that can occur while loading or validating a specification.
#[derive(Debug, Error)]
pub enum SpecError {
  #[error("Specification file {} not found", path.display())]
  NotFound { path: PathBuf },

  #[error("failed to read specification file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("Something wrong with the syntax of {}: {source}", path.display())]
  Syntax { path: PathBuf, source: serde_yaml::Error },

  #[error("Sketch file not specified, unable to compile")]
  MissingSketch,

  #[error("Compilation target not specified, unable to compile")]
  MissingTarget,

  #[error("Target board type not specified, unable to compile")]
  MissingBoard,
}

/// Parse specification text.
///
/// An empty document (or one holding only comments) is an empty spec rather
/// than an error; it fails validation on the missing sketch instead.
pub fn parse_spec(contents: &str) -> Result<RawSpec, serde_yaml::Error> {
  let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
  if value.is_null() {
    return Ok(RawSpec::default());
  }
  serde_yaml::from_value(value)
}

/// Read and parse the specification file at `path`.
///
/// # Errors
///
/// Returns [`SpecError::NotFound`] if the file does not exist,
/// [`SpecError::Syntax`] if it is not valid YAML or does not match the
/// expected shape.
pub fn read_spec(path: &Path) -> Result<RawSpec, SpecError> {
  let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
    io::ErrorKind::NotFound => SpecError::NotFound {
      path: path.to_path_buf(),
    },
    _ => SpecError::Read {
      path: path.to_path_buf(),
      source,
    },
  })?;

  debug!(path = %path.display(), bytes = contents.len(), "read specification");

  parse_spec(&contents).map_err(|source| SpecError::Syntax {
    path: path.to_path_buf(),
    source,
  })
}

/// Read, parse and validate the specification file at `path`.
pub fn load_spec(path: &Path) -> Result<BuildSpec, SpecError> {
  read_spec(path)?.validate()
}

impl RawSpec {
  /// Check required fields and convert into a [`BuildSpec`].
  ///
  /// Fields are checked in the order `sketch`, `target`, `target.board`, so
  /// the first missing one is the one reported. Blank strings count as
  /// missing.
  pub fn validate(self) -> Result<BuildSpec, SpecError> {
    let sketch = non_blank(self.sketch).ok_or(SpecError::MissingSketch)?;
    let target = self.target.ok_or(SpecError::MissingTarget)?;
    let board = non_blank(target.board).ok_or(SpecError::MissingBoard)?;

    let core = non_blank(target.core).map(|core| VersionedRef::parse(&core));
    let libraries = self
      .libraries
      .unwrap_or_default()
      .iter()
      .map(|lib| VersionedRef::parse(lib.as_str()))
      .collect();

    Ok(BuildSpec {
      sketch,
      target: Target {
        board,
        url: non_blank(target.url),
        core,
      },
      libraries,
      version: non_blank(self.version),
    })
  }
}

fn non_blank(value: Option<Scalar>) -> Option<String> {
  value.map(Scalar::into_string).filter(|s| !s.trim().is_empty())
}
