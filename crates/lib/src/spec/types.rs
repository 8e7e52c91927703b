//! Raw and validated forms of the build specification.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_yaml::Value;

use crate::reference::VersionedRef;

/// A YAML scalar kept in its textual form.
///
/// `version: 1.2` and `version: "1.2"` both yield `"1.2"`, so authors don't
/// have to quote numeric-looking values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar(pub String);

impl Scalar {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }
}

impl<'de> Deserialize<'de> for Scalar {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    match Value::deserialize(deserializer)? {
      Value::String(s) => Ok(Scalar(s)),
      Value::Number(n) => Ok(Scalar(n.to_string())),
      Value::Bool(b) => Ok(Scalar(b.to_string())),
      Value::Null => Err(de::Error::custom("expected a string, found null")),
      Value::Sequence(_) => Err(de::Error::custom("expected a string, found a sequence")),
      Value::Mapping(_) => Err(de::Error::custom("expected a string, found a mapping")),
      Value::Tagged(tagged) => Err(de::Error::custom(format!(
        "expected a string, found tagged value {}",
        tagged.tag
      ))),
    }
  }
}

/// The `target` block exactly as written in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawTarget {
  #[serde(default)]
  pub board: Option<Scalar>,
  #[serde(default)]
  pub url: Option<Scalar>,
  #[serde(default)]
  pub core: Option<Scalar>,
}

/// The specification exactly as written in the file, before validation.
///
/// Every field is optional here; [`RawSpec::validate`] enforces which ones the
/// build needs. A `null` value counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawSpec {
  #[serde(default)]
  pub sketch: Option<Scalar>,
  #[serde(default)]
  pub target: Option<RawTarget>,
  #[serde(default)]
  pub libraries: Option<Vec<Scalar>>,
  #[serde(default)]
  pub version: Option<Scalar>,
}

/// Validated compilation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
  /// Fully qualified board name passed to `compile -b`.
  pub board: String,
  /// Additional package index URL.
  pub url: Option<String>,
  /// Board core to install. `None` skips core installation.
  pub core: Option<VersionedRef>,
}

/// A validated build specification.
///
/// Guaranteed to carry a sketch path and a target board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
  pub sketch: String,
  pub target: Target,
  /// Libraries to install, in declaration order.
  pub libraries: Vec<VersionedRef>,
  /// Release version stamped into the artifact name.
  pub version: Option<String>,
}
