//! Test harnesses for Tollgate.
//!
//! Provides `TestBundle` for writing throwaway bundles to disk and the CLI
//! regression tests for the `tollgate` binary.

pub mod bundle;
#[cfg(test)]
pub mod cli;

pub use bundle::{TestBundle, TestError, WrittenBundle};
