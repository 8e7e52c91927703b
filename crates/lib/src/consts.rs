/// Specification file looked up in the working directory.
pub const SPEC_FILENAME: &str = "project.yaml";

/// Toolchain binary used when none is configured.
pub const DEFAULT_TOOL: &str = "arduino-cli";

/// Environment variable overriding the toolchain binary.
pub const TOOL_ENV: &str = "INOFORGE_CLI";

/// Directory compiled artifacts are written under.
pub const DIST_DIR: &str = "dist";
