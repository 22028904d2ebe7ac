//! Shared test utilities for mediafold integration tests.
//!
//! This module provides:
//! - `LibraryHarness` for an isolated SQLite-backed library per test
//! - Builder patterns for rules, conditions and item metadata

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::LibraryHarness;
