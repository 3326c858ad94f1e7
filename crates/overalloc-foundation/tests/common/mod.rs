//! Common test utilities shared across `overalloc-foundation` integration tests.
//!
//! Declared with `mod common;` inside each integration test file that needs it.

pub mod fake_monitor;
