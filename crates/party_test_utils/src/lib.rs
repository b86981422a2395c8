//! # Party Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture builders and deterministic random sources
//! - Determinism test harness
//! - Balance statistics over many battles
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
