//! inoforge-lib: Core types and logic for inoforge
//!
//! This crate provides everything needed to turn a `project.yaml` into a
//! compiled sketch:
//! - `spec`: loading and validating the build specification
//! - `reference`: `name==version` references for cores and libraries
//! - `toolchain`: the arduino-cli invocations for each build step
//! - `execute`: the command-runner seam and the real process runner
//! - `artifact`: output artifact naming
//! - `build`: the orchestrator that sequences the steps

pub mod artifact;
pub mod build;
pub mod consts;
pub mod execute;
pub mod reference;
pub mod spec;
pub mod toolchain;
pub mod util;
