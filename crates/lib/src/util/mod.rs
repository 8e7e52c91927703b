//! Shared utilities.
//!
//! Test helpers for driving the orchestrator without a real toolchain.

#[cfg(test)]
pub mod testutil;
