//! Deterministic JSON serialization for run reports.
//!
//! Output is stable across runs of the same suites:
//! - Object keys follow declaration order or `BTreeMap` order
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::*;
