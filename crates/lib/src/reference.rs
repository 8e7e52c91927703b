//! Versioned references to cores and libraries.
//!
//! References are written as `name==version` or a bare `name`. A bare name
//! means "whatever the index considers latest".

use std::fmt;

/// Separator between a name and its pinned version.
pub const VERSION_SEPARATOR: &str = "==";

/// A core or library name with an optional pinned version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionedRef {
  pub name: String,
  pub version: Option<String>,
}

impl VersionedRef {
  pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
    Self {
      name: name.into(),
      version: version.map(str::to_string),
    }
  }

  /// Parse a reference string.
  ///
  /// Splits at the first `==`; anything after it (including further `==`) is
  /// the version. Surrounding whitespace is trimmed from both halves.
  pub fn parse(line: &str) -> Self {
    match line.split_once(VERSION_SEPARATOR) {
      Some((name, version)) => Self {
        name: name.trim().to_string(),
        version: Some(version.trim().to_string()),
      },
      None => Self {
        name: line.trim().to_string(),
        version: None,
      },
    }
  }

  /// The `name[@version]` form arduino-cli expects for installs.
  pub fn install_arg(&self) -> String {
    match &self.version {
      Some(version) => format!("{}@{}", self.name, version),
      None => self.name.clone(),
    }
  }
}

impl fmt::Display for VersionedRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.version {
      Some(version) => write!(f, "{} v{}", self.name, version),
      None => write!(f, "{} (latest)", self.name),
    }
  }
}
