//! Output artifact naming.
//!
//! Artifacts are named `<sketch>[_v<version>]_<stamp>Z.bin`, where dots in the
//! version become underscores and the stamp is the UTC build time.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

/// `strftime` pattern for the build stamp.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const ARTIFACT_EXTENSION: &str = "bin";

/// Format a build time as `YYYYMMDD_HHMMSS`.
pub fn build_stamp(at: &DateTime<Utc>) -> String {
  at.format(STAMP_FORMAT).to_string()
}

/// Compute the artifact name for a sketch.
///
/// Only the final extension of the sketch's file name is dropped; any
/// directory part is kept, so `sketches/blink.ino` yields
/// `sketches/blink_<stamp>Z.bin`.
pub fn artifact_name(sketch: &str, version: Option<&str>, stamp: &str) -> String {
  let mut name = Path::new(sketch).with_extension("").to_string_lossy().into_owned();
  if let Some(version) = version {
    name.push_str("_v");
    name.push_str(&version.replace('.', "_"));
  }
  format!("{name}_{stamp}Z.{ARTIFACT_EXTENSION}")
}

/// Directory the compiler writes the artifact into.
///
/// Always lands under `dist_dir`: root, drive prefix, `.` and `..` components
/// of the artifact name are dropped, so `/home/me/blink_<stamp>Z.bin` becomes
/// `<dist_dir>/home/me/blink_<stamp>Z.bin`.
pub fn output_dir(dist_dir: &Path, artifact_name: &str) -> PathBuf {
  let mut dir = dist_dir.to_path_buf();
  for component in Path::new(artifact_name).components() {
    if let Component::Normal(part) = component {
      dir.push(part);
    }
  }
  dir
}
